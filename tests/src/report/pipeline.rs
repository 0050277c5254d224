#![cfg(test)]
use aridi_common::log::EventLog;
use aridi_common::report::{Category, DetailLevel, ReportModel};
use aridi_core::render::{self, Sections, Snapshot, View};
use aridi_core::scanner::NetworkScanner;
use aridi_core::services::PortNameResolver;

use crate::util::{LOOPBACK, closed_port, open_port, scan_config};

async fn scanned_model(log: &EventLog) -> ReportModel {
    let (_listener, open) = open_port().await;
    let closed = closed_port().await;
    let mut resolver = PortNameResolver::new();
    resolver.insert(open, "ssh");

    let mut model = ReportModel::new();
    model.add_fact(Category::General, DetailLevel::Summary, "Hostname", "pipeline-host");
    model.add_fact(Category::General, DetailLevel::Detailed, "CPUs", "4");
    model.add_host(LOOPBACK);

    let cfg = scan_config(open, &[closed]);
    NetworkScanner::new(cfg.clone())
        .scan(&mut model, &resolver, log, cfg.start_port)
        .await
        .unwrap();
    model
}

#[tokio::test]
async fn every_view_renders_deterministically() {
    let log = EventLog::new();
    log.info("aridi started");
    let model = scanned_model(&log).await;
    let entries = log.rendered_view();
    let snapshot = Snapshot {
        log: &entries,
        model: &model,
    };

    for view in [View::Full, View::Detailed, View::Summarized, View::Infrastructure] {
        let first = render::render(view, &snapshot, &Sections::all());
        let second = render::render(view, &snapshot, &Sections::all());
        assert_eq!(first, second, "{} differs between renders", view.title());
        assert!(first.contains("127.0.0.1"));
    }
}

#[tokio::test]
async fn summarized_without_infrastructure_hides_hosts() {
    let log = EventLog::new();
    let model = scanned_model(&log).await;
    let snapshot = Snapshot {
        log: &[],
        model: &model,
    };
    let sections = Sections {
        general: true,
        ..Sections::default()
    };

    let report = render::summarized(&snapshot, &sections);

    assert!(report.contains("pipeline-host"));
    assert!(!report.contains("127.0.0.1"));
    assert!(!report.contains("ssh"));
}

#[tokio::test]
async fn saved_report_matches_the_console_one() {
    let log = EventLog::new();
    let model = scanned_model(&log).await;
    let snapshot = Snapshot {
        log: &[],
        model: &model,
    };
    let report = render::detailed(&snapshot, &Sections::all());
    let path = std::env::temp_dir().join(format!("aridi-report-{}.txt", std::process::id()));

    render::save(&path, &report).unwrap();

    assert_eq!(std::fs::read_to_string(&path).unwrap(), report);
    let _ = std::fs::remove_file(&path);
}
