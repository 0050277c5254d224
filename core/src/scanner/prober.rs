//! A single bounded-timeout connection attempt.

use std::io::{self, ErrorKind};
use std::net::SocketAddr;
use std::time::Duration;

use async_trait::async_trait;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::trace;

/// Raw outcome of one probe, before it becomes a [`PortResult`](aridi_common::report::PortResult).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Open,
    Closed,
    Filtered,
    Error(String),
}

/// Defines how a single (host, port) pair is probed.
#[async_trait]
pub trait Prober: Send + Sync + 'static {
    async fn probe(&self, addr: SocketAddr) -> ProbeOutcome;
}

/// Full TCP handshake with a per-probe timeout. Needs no privileges.
#[derive(Debug, Clone, Copy)]
pub struct TcpConnectProber {
    timeout: Duration,
}

impl TcpConnectProber {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl Prober for TcpConnectProber {
    async fn probe(&self, addr: SocketAddr) -> ProbeOutcome {
        let outcome: ProbeOutcome = match timeout(self.timeout, TcpStream::connect(addr)).await {
            Ok(Ok(_stream)) => ProbeOutcome::Open,
            Ok(Err(e)) => classify_io_error(&e),
            Err(_elapsed) => ProbeOutcome::Filtered,
        };
        trace!(%addr, ?outcome, "probe resolved");
        outcome
    }
}

pub fn classify_io_error(e: &io::Error) -> ProbeOutcome {
    match e.kind() {
        ErrorKind::ConnectionRefused => ProbeOutcome::Closed,
        ErrorKind::TimedOut | ErrorKind::WouldBlock => ProbeOutcome::Filtered,
        _ => ProbeOutcome::Error(e.to_string()),
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
