use log::debug;
use std::time::Instant;
use sysinfo::System;

use crate::models::memory::{MemoryInfo, SwapMemoryInfo};
use crate::models::percent_of;

/// RAM usage. The percentage counts everything that is not available, which is
/// what the health thresholds expect.
pub async fn collect_ram(sys: &mut System) -> MemoryInfo {
    let start = Instant::now();
    sys.refresh_memory();
    let total = sys.total_memory();
    let available = sys.available_memory();
    let result = MemoryInfo {
        total,
        used: sys.used_memory(),
        available,
        percent: percent_of(total.saturating_sub(available), total),
    };
    debug!("collect_ram took: {} ms", start.elapsed().as_millis());
    result
}

/// Swap usage. Hosts without swap report zero totals and 0%.
pub async fn collect_swap(sys: &System) -> SwapMemoryInfo {
    let start = Instant::now();
    let total = sys.total_swap();
    let used = sys.used_swap();
    let result = SwapMemoryInfo {
        total,
        used,
        percent: percent_of(used, total),
    };
    debug!("collect_swap took: {} ms", start.elapsed().as_millis());
    result
}
