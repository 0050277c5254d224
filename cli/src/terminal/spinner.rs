use std::io::Write;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

use super::colors;

static SPINNER: Mutex<Option<ProgressBar>> = Mutex::new(None);

fn current() -> Option<ProgressBar> {
    SPINNER.lock().unwrap_or_else(PoisonError::into_inner).clone()
}

pub fn start(message: &str) {
    let pb: ProgressBar = ProgressBar::new_spinner();
    let style: ProgressStyle = ProgressStyle::with_template("{spinner:.blue} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_strings(&[
            "▁▁▁▁▁",
            "▁▂▂▂▁",
            "▁▄▂▄▁",
            "▂▄▆▄▂",
            "▄▆█▆▄",
            "▂▄▆▄▂",
            "▁▄▂▄▁",
            "▁▂▂▂▁",
        ]);
    pb.set_style(style);
    pb.set_message(message.color(colors::TEXT_DEFAULT).to_string());
    pb.enable_steady_tick(Duration::from_millis(100));

    let previous = SPINNER.lock().unwrap_or_else(PoisonError::into_inner).replace(pb);
    if let Some(previous) = previous {
        previous.finish_and_clear();
    }
}

pub fn report_scan_progress(done: usize, total: usize) {
    if let Some(pb) = current() {
        pb.set_message(
            format!(
                "Probed {} of {} ports...",
                done.to_string().green().bold(),
                total
            )
            .color(colors::TEXT_DEFAULT)
            .to_string(),
        );
    }
}

pub fn stop() {
    let pb = SPINNER.lock().unwrap_or_else(PoisonError::into_inner).take();
    if let Some(pb) = pb {
        pb.finish_and_clear();
    }
}

/// Console sink for log lines. Prints above the spinner while one is running.
pub struct SpinnerWriter;

impl Write for SpinnerWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let msg = String::from_utf8_lossy(buf);
        match current() {
            Some(pb) => pb.println(msg.trim_end()),
            None => std::io::stderr().write_all(buf)?,
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        std::io::stderr().flush()
    }
}
