//! Envelope phase: current stage gauge plus a short level history

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset, Gauge, GraphType},
    Frame,
};
use wavesketch::dsp::{envelope::EnvelopePhase, EnvelopeState};

use crate::app::App;

fn stage_color(state: EnvelopeState) -> Color {
    match state {
        EnvelopeState::Idle => Color::DarkGray,
        EnvelopeState::Attack => Color::LightRed,
        EnvelopeState::Decay => Color::LightYellow,
        EnvelopeState::Sustain => Color::LightGreen,
        EnvelopeState::Release => Color::LightBlue,
    }
}

pub fn render_envelope(frame: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(3)])
        .split(area);

    let phase = app.snapshot.map_or(EnvelopePhase::IDLE, |s| s.phase);
    let enabled = if app.patch.envelope_enabled { "" } else { " (off)" };

    let gauge = Gauge::default()
        .block(
            Block::default()
                .title(format!(" Envelope{enabled} "))
                .borders(Borders::ALL),
        )
        .gauge_style(Style::default().fg(stage_color(phase.state)))
        .ratio(phase.progress.clamp(0.0, 1.0) as f64)
        .label(format!(
            "{:?} {:>3.0}%  level {:.2}",
            phase.state,
            phase.progress * 100.0,
            phase.level
        ));
    frame.render_widget(gauge, chunks[0]);

    let data: Vec<(f64, f64)> = app
        .env_history
        .iter()
        .enumerate()
        .map(|(i, &level)| (i as f64, level as f64))
        .collect();
    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(stage_color(phase.state)))
        .data(&data);

    let chart = Chart::new(vec![dataset])
        .block(Block::default().title(" Level ").borders(Borders::ALL))
        .x_axis(
            Axis::default()
                .bounds([0.0, app.envelope_history_len() as f64])
                .style(Style::default().fg(Color::DarkGray)),
        )
        .y_axis(
            Axis::default()
                .bounds([0.0, 1.0])
                .style(Style::default().fg(Color::DarkGray)),
        );
    frame.render_widget(chart, chunks[1]);
}
