use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use aridi_common::config::ScanConfig;
use tokio::net::TcpListener;

pub const LOOPBACK: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

/// A loopback listener; connections complete in the kernel backlog without accepting.
pub async fn open_port() -> (TcpListener, u16) {
    let listener = TcpListener::bind(SocketAddr::new(LOOPBACK, 0)).await.unwrap();
    let port = listener.local_addr().unwrap().port();
    (listener, port)
}

/// A port that was just released, so connecting to it is refused.
pub async fn closed_port() -> u16 {
    let (listener, port) = open_port().await;
    drop(listener);
    port
}

/// Probes exactly `first` then `rest` with short timeouts.
pub fn scan_config(first: u16, rest: &[u16]) -> ScanConfig {
    ScanConfig {
        start_port: first,
        port_count: 1,
        well_known: rest.to_vec(),
        workers: 8,
        probe_timeout: Duration::from_millis(500),
        deadline: Duration::from_secs(5),
    }
}
