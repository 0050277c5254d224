use std::io;
use std::path::Path;

use colored::*;
use console::Term;
use unicode_width::UnicodeWidthStr;

use super::colors;

pub const TOTAL_WIDTH: usize = 64;

/// Console status lines go to stderr so stdout carries only the report.
pub fn print(msg: &str) {
    eprintln!("{msg}");
}

pub fn banner() {
    let text_content: String = format!("⟦ ARIDI v{} ⟧ ", env!("CARGO_PKG_VERSION"));
    let text_width: usize = UnicodeWidthStr::width(text_content.as_str());
    let text: ColoredString = text_content.bright_green().bold();
    let sep: ColoredString = "═".repeat(TOTAL_WIDTH.saturating_sub(text_width) / 2).bright_black();
    print(&format!("{}{}{}", sep, text, sep));
}

pub fn finished(report_path: Option<&Path>) {
    let output: String = match report_path {
        Some(path) => format!("Aridi has finished. Report saved to {}.", path.display()),
        None => String::from("Aridi has finished."),
    };
    print("");
    print(&format!("{}", output.color(colors::ACCENT).bold()));
    print(&format!("{}", "═".repeat(TOTAL_WIDTH).color(colors::SEPARATOR)));
}

/// Asks whether to carry on without root privileges. Anything but an
/// answer starting with `y` declines.
pub fn confirm_unprivileged() -> io::Result<bool> {
    let term = Term::stderr();
    term.write_line("")?;
    term.write_str(&format!(
        "{} aridi has been invoked with restricted privileges. Some information can't be \
         gathered; run it as root for better results. Continue anyway? (y/N) ",
        "[*]".yellow().bold()
    ))?;
    let answer: String = term.read_line()?;
    Ok(accepts(&answer))
}

fn accepts(answer: &str) -> bool {
    answer.trim_start().to_lowercase().starts_with('y')
}
