//! Graphviz export of the host inventory.

use std::fmt::Write;
use std::fs;
use std::path::Path;
use std::process::Command;

use anyhow::Context;
use aridi_common::log::EventLog;
use aridi_common::report::{Category, PortState, ReportModel};

pub const DEFAULT_DOT_PATH: &str = "aridi.dot";

/// DOT source with the local machine at the centre, one edge per known host
/// and one leaf per open port.
pub fn to_dot(model: &ReportModel) -> String {
    let local: &str = model
        .fact_value(Category::General, "Hostname")
        .unwrap_or("localhost");

    let mut out = String::from("graph aridi {\n");
    let _ = writeln!(out, "    node [fontname=\"monospace\"];");
    let _ = writeln!(out, "    \"{}\" [shape=doublecircle];", escape(local));
    for host in model.inventory().hosts() {
        let address: String = host.address().to_string();
        let _ = writeln!(out, "    \"{address}\" [shape=box];");
        let _ = writeln!(out, "    \"{}\" -- \"{address}\";", escape(local));
        for result in host.with_state(PortState::Open) {
            let label: String = match &result.service {
                Some(name) => format!("{}/{}", result.port, escape(name)),
                None => result.port.to_string(),
            };
            let _ = writeln!(
                out,
                "    \"{address}:{port}\" [label=\"{label}\", shape=plaintext];",
                port = result.port
            );
            let _ = writeln!(out, "    \"{address}\" -- \"{address}:{}\";", result.port);
        }
    }
    out.push_str("}\n");
    out
}

/// Writes the DOT file and, when Graphviz is installed, a PNG next to it.
/// Returns `false` when there is nothing to draw.
pub fn make_graph(
    model: &ReportModel,
    dot_path: impl AsRef<Path>,
    log: &EventLog,
) -> anyhow::Result<bool> {
    let dot_path: &Path = dot_path.as_ref();
    if model.inventory().is_empty() {
        log.debug("No hosts in the inventory, skipping the graph");
        return Ok(false);
    }

    fs::write(dot_path, to_dot(model))
        .with_context(|| format!("writing {}", dot_path.display()))?;
    log.info(format!("Graph written to {}", dot_path.display()));

    let png_path = dot_path.with_extension("png");
    match Command::new("dot")
        .arg("-Tpng")
        .arg(dot_path)
        .arg("-o")
        .arg(&png_path)
        .output()
    {
        Ok(output) if output.status.success() => {
            log.info(format!("Graph rendered to {}", png_path.display()));
        }
        Ok(output) => {
            let stderr = String::from_utf8_lossy(&output.stderr);
            log.warning(format!("dot failed: {}", stderr.trim()));
        }
        Err(e) => {
            log.debug(format!("Graphviz not available: {e}"));
        }
    }
    Ok(true)
}

fn escape(label: &str) -> String {
    label.replace('\\', "\\\\").replace('"', "\\\"")
}
