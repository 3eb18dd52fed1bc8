use serde::Serialize;
use std::net::IpAddr;

/// Interface counters summed over the monitored interfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NetworkCounters {
    pub bytes_sent: u64,
    pub bytes_received: u64,
    pub packets_sent: u64,
    pub packets_received: u64,
    pub errors_in: u64,
    pub errors_out: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct InterfaceAddress {
    pub interface: String,
    pub ip: IpAddr,
    pub netmask: Option<IpAddr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Protocol {
    Tcp,
    Udp,
}

impl std::fmt::Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Protocol::Tcp => write!(f, "TCP"),
            Protocol::Udp => write!(f, "UDP"),
        }
    }
}

/// One open internet socket.
#[derive(Debug, Clone, Serialize)]
pub struct Connection {
    pub protocol: Protocol,
    pub local_addr: String,
    pub remote_addr: Option<String>,
    pub status: String,
    pub inode: u64,
    pub pid: Option<u32>,
    pub process_name: Option<String>,
}

impl Default for NetworkCounters {
    fn default() -> Self {
        Self {
            bytes_sent: 0,
            bytes_received: 0,
            packets_sent: 0,
            packets_received: 0,
            errors_in: 0,
            errors_out: 0,
        }
    }
}
