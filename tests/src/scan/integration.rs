#![cfg(test)]
use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Duration;

use aridi_common::log::{EventLog, Severity};
use aridi_common::report::{PortResult, PortState, ReportModel};
use aridi_core::scanner::{NetworkScanner, ProbeOutcome, Prober};
use aridi_core::services::PortNameResolver;
use async_trait::async_trait;

use crate::util::{LOOPBACK, closed_port, open_port, scan_config};

fn result_for(model: &ReportModel, port: u16) -> &PortResult {
    model
        .inventory()
        .get(&LOOPBACK)
        .and_then(|host| host.ports().iter().find(|result| result.port == port))
        .unwrap_or_else(|| panic!("no result for port {port}"))
}

/// A listening port is reported open with its service name, a refused one
/// closed and unnamed.
#[tokio::test]
async fn loopback_open_and_closed_ports() -> anyhow::Result<()> {
    let (_listener, open) = open_port().await;
    let closed = closed_port().await;

    let log = EventLog::new();
    let mut resolver = PortNameResolver::new();
    resolver.insert(open, "ssh");
    resolver.insert(closed, "http");

    let mut model = ReportModel::new();
    model.add_host(LOOPBACK);

    let cfg = scan_config(open, &[closed]);
    let summary = NetworkScanner::new(cfg.clone())
        .scan(&mut model, &resolver, &log, cfg.start_port)
        .await?;

    assert_eq!(summary.probed, 2);
    let open_result = result_for(&model, open);
    assert_eq!(open_result.state, PortState::Open);
    assert_eq!(open_result.service.as_deref(), Some("ssh"));

    let closed_result = result_for(&model, closed);
    assert_eq!(closed_result.state, PortState::Closed);
    assert_eq!(closed_result.service, None);
    Ok(())
}

/// A port database that fails to load leaves the scan working, only
/// without service names.
#[tokio::test]
async fn missing_port_database_still_scans() -> anyhow::Result<()> {
    let (_listener, open) = open_port().await;

    let log = EventLog::new();
    let mut resolver = PortNameResolver::new();
    assert!(!resolver.load("nonexistent.csv", &log));

    let mut model = ReportModel::new();
    model.add_host(LOOPBACK);
    let cfg = scan_config(open, &[]);
    let summary = NetworkScanner::new(cfg.clone())
        .scan(&mut model, &resolver, &log, cfg.start_port)
        .await?;

    assert_eq!(summary.open, 1);
    let host = model.inventory().get(&LOOPBACK).unwrap();
    assert!(host.with_state(PortState::Open).all(|result| result.service.is_none()));
    Ok(())
}

struct SlowPortProber {
    delays: HashMap<u16, Duration>,
}

#[async_trait]
impl Prober for SlowPortProber {
    async fn probe(&self, addr: SocketAddr) -> ProbeOutcome {
        match self.delays.get(&addr.port()) {
            Some(delay) => {
                tokio::time::sleep(*delay).await;
                ProbeOutcome::Open
            }
            None => ProbeOutcome::Closed,
        }
    }
}

/// A probe still pending when the deadline expires ends up filtered, and
/// the log says so.
#[tokio::test]
async fn deadline_marks_pending_probes_filtered() -> anyhow::Result<()> {
    let prober = SlowPortProber {
        delays: HashMap::from([(443, Duration::from_secs(10))]),
    };
    let mut cfg = scan_config(22, &[80, 443]);
    cfg.deadline = Duration::from_millis(200);

    let log = EventLog::new();
    let mut model = ReportModel::new();
    model.add_host(LOOPBACK);

    let summary = NetworkScanner::with_prober(cfg, prober)
        .scan(&mut model, &PortNameResolver::new(), &log, 22)
        .await?;

    assert_eq!(summary.timed_out, 1);
    assert_eq!(result_for(&model, 22).state, PortState::Closed);
    assert_eq!(result_for(&model, 443).state, PortState::Filtered);
    assert!(
        log.view(Severity::Warning)
            .iter()
            .any(|entry| entry.message.contains("127.0.0.1:443"))
    );
    Ok(())
}
