//! TUI module for wavesketch
//!
//! Wavetable and output traces on the left; harmonic spectrum and envelope
//! on the right; status bar on top.

mod envelope;
pub mod spectrum;
mod status;
mod waveform;

use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};

use crate::app::App;

use envelope::render_envelope;
use spectrum::render_spectrum;
use status::render_status;
use waveform::render_trace;

const HELP: &str = " [a-;] play  [Space] release  [1-4] preset  [ ] octave  [E] env  [L] LP  [H] HP  \
                    [Up/Down] LP cutoff  [Left/Right] LP slope  [-/=] level  [I] import  [O] export  \
                    [Esc] quit";

pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Status bar
            Constraint::Min(10),   // Panels
            Constraint::Length(1), // Help bar
        ])
        .split(area);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(rows[1]);
    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(columns[0]);
    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(columns[1]);

    render_status(frame, rows[0], app);

    let table_title = format!(
        " Wavetable: {} ({} samples) ",
        app.patch.preset.name(),
        app.table.len()
    );
    render_trace(frame, left[0], &table_title, app.table.samples(), Color::Cyan);
    render_trace(frame, left[1], " Output ", &app.vis_buffer, Color::LightGreen);

    render_spectrum(frame, right[0], &app.harmonics);
    render_envelope(frame, right[1], app);

    let help = Paragraph::new(HELP).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, rows[2]);
}
