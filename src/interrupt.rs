use log::debug;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Debug, Default)]
struct Inner {
    requested: AtomicBool,
    guards: AtomicUsize,
}

/// Ctrl+C as a cancellation token.
///
/// Outside any [`InterruptGuard`] a Ctrl+C ends the program with exit code 0,
/// as the menu has nothing to clean up. While a guard is alive the signal only
/// raises a flag, which loops check at each iteration boundary before returning
/// normally so open files are closed by their owners.
#[derive(Debug, Clone, Default)]
pub struct Interrupt {
    inner: Arc<Inner>,
}

impl Interrupt {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the process-wide Ctrl+C handler. Call once.
    pub fn install(&self) -> anyhow::Result<()> {
        let inner = self.inner.clone();
        ctrlc::set_handler(move || {
            if inner.guards.load(Ordering::SeqCst) > 0 {
                inner.requested.store(true, Ordering::SeqCst);
            } else {
                println!("\nExiting...");
                std::process::exit(0);
            }
        })
        .map_err(|e| anyhow::anyhow!("Failed to set Ctrl+C handler: {}", e))
    }

    pub fn is_requested(&self) -> bool {
        self.inner.requested.load(Ordering::SeqCst)
    }

    pub fn request(&self) {
        self.inner.requested.store(true, Ordering::SeqCst);
    }

    pub fn clear(&self) {
        self.inner.requested.store(false, Ordering::SeqCst);
    }

    /// Defers Ctrl+C to the flag until the guard is dropped. Clears any stale request.
    pub fn guard(&self) -> InterruptGuard {
        self.clear();
        self.inner.guards.fetch_add(1, Ordering::SeqCst);
        debug!("Interrupt guard acquired");
        InterruptGuard {
            inner: self.inner.clone(),
        }
    }

    pub fn is_guarded(&self) -> bool {
        self.inner.guards.load(Ordering::SeqCst) > 0
    }
}

#[derive(Debug)]
pub struct InterruptGuard {
    inner: Arc<Inner>,
}

impl Drop for InterruptGuard {
    fn drop(&mut self) {
        self.inner.guards.fetch_sub(1, Ordering::SeqCst);
        debug!("Interrupt guard released");
    }
}
