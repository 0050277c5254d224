use std::fmt::Write;

use aridi_common::report::{DetailLevel, FactRecord, HostRecord, Inventory, PortResult, PortState};

const TOTAL_WIDTH: usize = 64;
const KEY_WIDTH: usize = 24;

pub fn banner(title: &str) -> String {
    let text: String = format!(" ARIDI v{} | {} ", env!("CARGO_PKG_VERSION"), title.to_uppercase());
    let fill: usize = TOTAL_WIDTH.saturating_sub(text.chars().count());
    let left: usize = fill / 2;
    let right: usize = fill - left;
    format!("{}{}{}\n", "═".repeat(left), text, "═".repeat(right))
}

pub fn section(out: &mut String, title: &str) {
    let formatted: String = format!("⟦ {} ⟧", title.to_uppercase());
    let dash_count: usize = TOTAL_WIDTH.saturating_sub(formatted.chars().count());
    let _ = writeln!(out);
    let _ = writeln!(out, "{}{}", formatted, "─".repeat(dash_count));
}

pub fn fact(out: &mut String, fact: &FactRecord) {
    let mut lines = fact.value.lines();
    let first: &str = lines.next().unwrap_or_default();
    let _ = writeln!(out, "  {:.<width$}: {}", fact.name, first, width = KEY_WIDTH);
    for line in lines {
        let _ = writeln!(out, "  {:width$}  {}", "", line, width = KEY_WIDTH);
    }
}

pub fn hosts(out: &mut String, inventory: &Inventory, ceiling: DetailLevel) {
    if inventory.is_empty() {
        let _ = writeln!(out, "  No hosts discovered");
        return;
    }
    for (idx, host) in inventory.hosts().iter().enumerate() {
        match ceiling {
            DetailLevel::Summary => host_line(out, idx, host),
            DetailLevel::Detailed => host_tree(out, idx, host, false),
            DetailLevel::Full => host_tree(out, idx, host, true),
        }
    }
}

fn host_line(out: &mut String, idx: usize, host: &HostRecord) {
    let open: Vec<String> = host.with_state(PortState::Open).map(short_label).collect();
    let status: String = if host.ports().is_empty() {
        String::from("not scanned")
    } else if open.is_empty() {
        String::from("no open ports")
    } else {
        format!("{} open: {}", open.len(), open.join(", "))
    };
    let _ = writeln!(out, "  [{idx}] {:<18} {status}", host.address().to_string());
}

fn host_tree(out: &mut String, idx: usize, host: &HostRecord, everything: bool) {
    let _ = writeln!(out, "  [{idx}] {}", host.address());
    let shown: Vec<&PortResult> = host
        .ports()
        .iter()
        .filter(|r| everything || matches!(r.state, PortState::Open | PortState::Closed))
        .collect();

    if shown.is_empty() {
        let leaf: &str = if host.ports().is_empty() { "not scanned" } else { "nothing answered" };
        let _ = writeln!(out, "   └─ {leaf}");
        return;
    }

    for (i, result) in shown.iter().enumerate() {
        let branch: &str = if i + 1 == shown.len() { "└─" } else { "├─" };
        let port: String = format!("{}/tcp", result.port);
        let service: &str = result.service.as_deref().unwrap_or("-");
        let mut line: String = format!("   {branch} {port:<11} {:<8} {service:<16}", result.state);
        if everything {
            let _ = write!(line, " {} ms", result.duration.as_millis());
            if let Some(error) = &result.error {
                let _ = write!(line, " ({error})");
            }
        }
        let _ = writeln!(out, "{}", line.trim_end());
    }
}

fn short_label(result: &PortResult) -> String {
    match &result.service {
        Some(service) => format!("{}/{}", result.port, service),
        None => result.port.to_string(),
    }
}
