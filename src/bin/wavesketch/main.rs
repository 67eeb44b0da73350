//! wavesketch - terminal wavetable synthesizer
//!
//! Run with: cargo run --bin wavesketch

mod app;
mod ui;

use std::{fs::File, sync::Mutex};

use color_eyre::eyre::{Result as EyreResult, WrapErr};
use tracing::Level;

const LOG_FILE: &str = "wavesketch.log";

fn main() -> EyreResult<()> {
    color_eyre::install()?;
    init_logging()?;

    let terminal = ratatui::init();
    let res = app::run(terminal);
    ratatui::restore();
    res
}

/// Log to a file; stdout belongs to the terminal UI.
fn init_logging() -> EyreResult<()> {
    let file = File::create(LOG_FILE).wrap_err("failed to create log file")?;
    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_max_level(Level::DEBUG)
        .init();
    Ok(())
}
