use log::{debug, warn};
use regex::Regex;
use std::collections::HashMap;
use std::fs;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::path::Path;
use std::time::Instant;
use walkdir::WalkDir;

use crate::models::network::{Connection, Protocol};

const PROC_ROOT: &str = "/proc";

const TABLES: [(&str, Protocol); 4] = [
    ("net/tcp", Protocol::Tcp),
    ("net/tcp6", Protocol::Tcp),
    ("net/udp", Protocol::Udp),
    ("net/udp6", Protocol::Udp),
];

/// Open internet sockets, with the owning process where it can be resolved.
///
/// `None` means the host exposes no socket tables (non-Linux, or /proc hidden).
pub async fn collect<F>(process_name: F) -> Option<Vec<Connection>>
where
    F: Fn(u32) -> Option<String>,
{
    let start = Instant::now();
    let root = Path::new(PROC_ROOT);
    let pattern = socket_line_pattern();

    let mut connections = Vec::new();
    let mut readable = false;
    for (table, protocol) in TABLES {
        match fs::read_to_string(root.join(table)) {
            Ok(content) => {
                readable = true;
                connections.extend(parse_table(&pattern, &content, protocol));
            }
            Err(x) => debug!("Socket table {} unavailable: {}", table, x),
        }
    }
    if !readable {
        warn!("No socket tables readable under {}", root.display());
        return None;
    }

    let owners = socket_owners(root);
    for connection in connections.iter_mut() {
        connection.pid = owners.get(&connection.inode).copied();
        connection.process_name = connection.pid.and_then(&process_name);
    }

    debug!(
        "collect connections took: {} ms",
        start.elapsed().as_millis()
    );
    Some(connections)
}

fn socket_line_pattern() -> Regex {
    // sl local_address rem_address st tx:rx tr:when retrnsmt uid timeout inode
    Regex::new(
        r"^\s*\d+:\s+([0-9A-Fa-f]+):([0-9A-Fa-f]{4})\s+([0-9A-Fa-f]+):([0-9A-Fa-f]{4})\s+([0-9A-Fa-f]{2})\s+\S+\s+\S+\s+\S+\s+\d+\s+\d+\s+(\d+)",
    )
    .expect("socket line pattern is valid")
}

pub fn parse_table(pattern: &Regex, content: &str, protocol: Protocol) -> Vec<Connection> {
    content
        .lines()
        .skip(1)
        .filter_map(|line| {
            let captures = pattern.captures(line)?;
            let local_ip = decode_ip(&captures[1])?;
            let local_port = u16::from_str_radix(&captures[2], 16).ok()?;
            let remote_ip = decode_ip(&captures[3])?;
            let remote_port = u16::from_str_radix(&captures[4], 16).ok()?;
            let state = u8::from_str_radix(&captures[5], 16).ok()?;
            let inode = captures[6].parse::<u64>().ok()?;

            let remote_addr = if remote_port == 0 && is_unspecified(&remote_ip) {
                None
            } else {
                Some(format!("{}:{}", remote_ip, remote_port))
            };

            Some(Connection {
                protocol,
                local_addr: format!("{}:{}", local_ip, local_port),
                remote_addr,
                status: state_name(protocol, state).to_string(),
                inode,
                pid: None,
                process_name: None,
            })
        })
        .collect()
}

fn is_unspecified(ip: &str) -> bool {
    ip == "0.0.0.0" || ip == "::"
}

/// Kernel addresses are hex words in host (little-endian) byte order.
fn decode_ip(hex: &str) -> Option<String> {
    match hex.len() {
        8 => {
            let word = u32::from_str_radix(hex, 16).ok()?;
            Some(Ipv4Addr::from(word.to_le_bytes()).to_string())
        }
        32 => {
            let mut bytes = [0u8; 16];
            for (i, chunk) in bytes.chunks_mut(4).enumerate() {
                let word = u32::from_str_radix(&hex[i * 8..i * 8 + 8], 16).ok()?;
                chunk.copy_from_slice(&word.to_le_bytes());
            }
            Some(Ipv6Addr::from(bytes).to_string())
        }
        _ => None,
    }
}

fn state_name(protocol: Protocol, state: u8) -> &'static str {
    if protocol == Protocol::Udp {
        return "NONE";
    }
    match state {
        0x01 => "ESTABLISHED",
        0x02 => "SYN_SENT",
        0x03 => "SYN_RECV",
        0x04 => "FIN_WAIT1",
        0x05 => "FIN_WAIT2",
        0x06 => "TIME_WAIT",
        0x07 => "CLOSE",
        0x08 => "CLOSE_WAIT",
        0x09 => "LAST_ACK",
        0x0A => "LISTEN",
        0x0B => "CLOSING",
        _ => "UNKNOWN",
    }
}

/// Maps socket inodes to the PID holding them, from `/proc/<pid>/fd` links.
///
/// Processes we may not inspect are silently left out.
fn socket_owners(root: &Path) -> HashMap<u64, u32> {
    let mut owners = HashMap::new();
    let Ok(entries) = fs::read_dir(root) else {
        return owners;
    };
    for entry in entries.flatten() {
        let Some(pid) = entry.file_name().to_str().and_then(|s| s.parse::<u32>().ok()) else {
            continue;
        };
        for fd in WalkDir::new(entry.path().join("fd"))
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|fd| fd.ok())
        {
            if let Some(inode) = fs::read_link(fd.path())
                .ok()
                .and_then(|target| socket_inode(&target.to_string_lossy()))
            {
                owners.entry(inode).or_insert(pid);
            }
        }
    }
    owners
}

fn socket_inode(link: &str) -> Option<u64> {
    link.strip_prefix("socket:[")?
        .strip_suffix(']')?
        .parse()
        .ok()
}
