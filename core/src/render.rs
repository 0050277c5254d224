//! # Report Views
//!
//! Four pure functions over a [`Snapshot`] of the event log and the report
//! model. Views differ by their detail ceiling:
//!
//! * [`summarized`]: summary facts, hosts with their open ports.
//! * [`detailed`]: adds detailed facts and closed ports.
//! * [`full`]: everything, every port result and the execution log.
//! * [`infrastructure_only`]: hosts and infrastructure facts, nothing else.
//!
//! Output is plain text and deterministic: the same snapshot with the same
//! [`Sections`] always renders to the same bytes.

use std::collections::BTreeSet;
use std::fmt::Write;
use std::fs;
use std::path::Path;

use aridi_common::error::RenderError;
use aridi_common::log::LogEntry;
use aridi_common::report::{Category, DetailLevel, FactRecord, ReportModel};

mod text;

/// Which gathering categories ran in this invocation. Categories that did
/// not run are absent from every view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sections {
    pub general: bool,
    pub specific: bool,
    pub volatile: bool,
    pub other: bool,
    pub infrastructure: bool,
}

impl Sections {
    pub fn all() -> Self {
        Self {
            general: true,
            specific: true,
            volatile: true,
            other: true,
            infrastructure: true,
        }
    }

    pub fn includes(&self, category: Category) -> bool {
        match category {
            Category::General => self.general,
            Category::Specific => self.specific,
            Category::Volatile => self.volatile,
            Category::Other => self.other,
            Category::Infrastructure => self.infrastructure,
        }
    }

    fn requested(&self) -> BTreeSet<Category> {
        Category::ALL
            .into_iter()
            .filter(|category| self.includes(*category))
            .collect()
    }
}

/// Read-only state a view is rendered from. Taken after every stage joined.
#[derive(Debug, Clone, Copy)]
pub struct Snapshot<'a> {
    pub log: &'a [LogEntry],
    pub model: &'a ReportModel,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum View {
    Full,
    Detailed,
    #[default]
    Summarized,
    Infrastructure,
}

impl View {
    pub fn title(&self) -> &'static str {
        match self {
            View::Full => "full report",
            View::Detailed => "detailed report",
            View::Summarized => "summarized report",
            View::Infrastructure => "infrastructure report",
        }
    }
}

pub fn render(view: View, snapshot: &Snapshot<'_>, sections: &Sections) -> String {
    match view {
        View::Full => full(snapshot, sections),
        View::Detailed => detailed(snapshot, sections),
        View::Summarized => summarized(snapshot, sections),
        View::Infrastructure => infrastructure_only(snapshot),
    }
}

pub fn summarized(snapshot: &Snapshot<'_>, sections: &Sections) -> String {
    categorized(View::Summarized, DetailLevel::Summary, snapshot, sections)
}

pub fn detailed(snapshot: &Snapshot<'_>, sections: &Sections) -> String {
    categorized(View::Detailed, DetailLevel::Detailed, snapshot, sections)
}

pub fn full(snapshot: &Snapshot<'_>, sections: &Sections) -> String {
    let mut out: String = categorized(View::Full, DetailLevel::Full, snapshot, sections);
    if !snapshot.log.is_empty() {
        text::section(&mut out, "execution log");
        for entry in snapshot.log {
            let _ = writeln!(out, "  {entry}");
        }
    }
    out
}

/// Hosts, their port results and infrastructure facts. Ignores the other
/// categories whether or not they ran.
pub fn infrastructure_only(snapshot: &Snapshot<'_>) -> String {
    let mut out: String = text::banner(View::Infrastructure.title());
    infrastructure(&mut out, DetailLevel::Full, snapshot.model);
    out
}

pub fn save(path: impl AsRef<Path>, report: &str) -> Result<(), RenderError> {
    let path: &Path = path.as_ref();
    fs::write(path, report).map_err(|source| RenderError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn categorized(
    view: View,
    ceiling: DetailLevel,
    snapshot: &Snapshot<'_>,
    sections: &Sections,
) -> String {
    let mut out: String = text::banner(view.title());
    for (category, facts) in snapshot.model.categories(&sections.requested()) {
        if category == Category::Infrastructure {
            infrastructure(&mut out, ceiling, snapshot.model);
        } else {
            text::section(&mut out, category.title());
            facts_block(&mut out, facts, ceiling);
        }
    }
    out
}

fn infrastructure(out: &mut String, ceiling: DetailLevel, model: &ReportModel) {
    text::section(out, Category::Infrastructure.title());
    let facts: &[FactRecord] = model.facts(Category::Infrastructure);
    if facts.iter().any(|fact| fact.visible_at(ceiling)) {
        facts_block(out, facts, ceiling);
    }
    text::hosts(out, model.inventory(), ceiling);
}

fn facts_block(out: &mut String, facts: &[FactRecord], ceiling: DetailLevel) {
    let visible: Vec<&FactRecord> = facts.iter().filter(|f| f.visible_at(ceiling)).collect();
    if visible.is_empty() {
        let _ = writeln!(out, "  No information gathered");
        return;
    }
    for fact in visible {
        text::fact(out, fact);
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
