//! Plain-text sample data: one decimal value per line.
//!
//! Import is forgiving. Lines that do not parse as a finite number are
//! skipped and counted, and an import with no valid lines is still usable
//! (the builder turns it into a silent table).

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};

use tracing::{debug, info};

use crate::dsp::wavetable::Wavetable;
use crate::error::Result;

/// Result of parsing sample text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedSamples {
    pub samples: Vec<f32>,
    /// Non-blank lines that were skipped.
    pub dropped: usize,
}

pub fn parse_samples(text: &str) -> ParsedSamples {
    let mut parsed = ParsedSamples::default();
    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        match line.parse::<f32>() {
            Ok(value) if value.is_finite() => parsed.samples.push(value),
            _ => parsed.dropped += 1,
        }
    }
    parsed
}

pub fn format_samples(table: &Wavetable) -> String {
    let mut out = String::with_capacity(table.len() * 12);
    for sample in table.samples() {
        // Writing into a String cannot fail
        let _ = writeln!(out, "{sample}");
    }
    out
}

pub fn import_file(path: impl AsRef<Path>) -> Result<ParsedSamples> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    let parsed = parse_samples(&text);
    info!(
        path = %path.display(),
        samples = parsed.samples.len(),
        dropped = parsed.dropped,
        "imported sample data"
    );
    Ok(parsed)
}

pub fn export_file(path: impl AsRef<Path>, table: &Wavetable) -> Result<()> {
    let path = path.as_ref();
    fs::write(path, format_samples(table))?;
    info!(path = %path.display(), samples = table.len(), "exported wavetable");
    Ok(())
}

/// Import on a worker thread and hand the result to `on_done`.
///
/// The caller is never blocked; the callback runs on the worker.
pub fn spawn_import<F>(path: impl Into<PathBuf>, on_done: F) -> JoinHandle<()>
where
    F: FnOnce(Result<ParsedSamples>) + Send + 'static,
{
    let path = path.into();
    debug!(path = %path.display(), "starting background import");
    thread::spawn(move || on_done(import_file(&path)))
}
