use log::{debug, error};
use std::collections::BTreeMap;
use std::net::IpAddr as StdIpAddr;
use std::time::Instant;
use systemstat::{IpAddr, Network, Platform, System};

use crate::models::network::{InterfaceAddress, NetworkCounters};

/// Counters summed over the allowed interfaces (all of them when the list is empty).
pub async fn collect_io(sys: &System, allowed: &[String]) -> Option<NetworkCounters> {
    let start = Instant::now();
    let result = match sys.networks() {
        Ok(networks) => get_aggregated_stats(sys, &networks, allowed),
        Err(x) => {
            error!("Network statistics error getting stats: {}", x);
            None
        }
    };
    debug!("collect_io took: {} ms", start.elapsed().as_millis());
    result
}

fn get_aggregated_stats(
    sys: &System,
    networks: &BTreeMap<String, Network>,
    allowed: &[String],
) -> Option<NetworkCounters> {
    let start = Instant::now();
    let mut counters = NetworkCounters::default();
    let mut readable = 0usize;

    for net in networks.values() {
        if !allowed.is_empty() && !allowed.contains(&net.name) {
            continue;
        }
        match sys.network_stats(&net.name) {
            Ok(stats) => {
                readable += 1;
                counters.bytes_received =
                    counters.bytes_received.saturating_add(stats.rx_bytes.as_u64());
                counters.bytes_sent = counters.bytes_sent.saturating_add(stats.tx_bytes.as_u64());
                counters.packets_received =
                    counters.packets_received.saturating_add(stats.rx_packets);
                counters.packets_sent = counters.packets_sent.saturating_add(stats.tx_packets);
                counters.errors_in = counters.errors_in.saturating_add(stats.rx_errors);
                counters.errors_out = counters.errors_out.saturating_add(stats.tx_errors);
            }
            Err(x) => debug!("No statistics for interface {}: {}", net.name, x),
        }
    }

    debug!("get_aggregated_stats took: {} ms", start.elapsed().as_millis());
    // No interface could be read at all: the counters are unavailable, not zero
    if readable == 0 && !networks.is_empty() {
        return None;
    }
    Some(counters)
}

/// IPv4 addresses bound to each interface.
pub async fn collect_interfaces(sys: &System) -> Vec<InterfaceAddress> {
    let start = Instant::now();
    let result = match sys.networks() {
        Ok(networks) => networks
            .values()
            .flat_map(|net| {
                net.addrs.iter().filter_map(move |addr| match &addr.addr {
                    IpAddr::V4(ip) => Some(InterfaceAddress {
                        interface: net.name.clone(),
                        ip: StdIpAddr::V4(*ip),
                        netmask: match &addr.netmask {
                            IpAddr::V4(mask) => Some(StdIpAddr::V4(*mask)),
                            _ => None,
                        },
                    }),
                    _ => None,
                })
            })
            .collect(),
        Err(x) => {
            error!("Network interfaces error: {}", x);
            Vec::new()
        }
    };
    debug!(
        "collect_interfaces took: {} ms",
        start.elapsed().as_millis()
    );
    result
}
