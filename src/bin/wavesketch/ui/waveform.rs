//! Waveform trace widget

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};

/// Render `samples` as a line, downsampled to the area's width.
pub fn render_trace(frame: &mut Frame, area: Rect, title: &str, samples: &[f32], color: Color) {
    let block = Block::default().title(title.to_string()).borders(Borders::ALL);

    // Braille packs two columns per cell
    let target_w = (area.width.max(1) as usize) * 2;
    let step = samples.len().div_ceil(target_w).max(1);
    let data: Vec<(f64, f64)> = samples
        .iter()
        .enumerate()
        .step_by(step)
        .map(|(i, &sample)| {
            let x = i as f64 / samples.len().max(1) as f64;
            (x, sample as f64)
        })
        .collect();

    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(color))
        .data(&data);

    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .bounds([0.0, 1.0])
                .style(Style::default().fg(Color::DarkGray)),
        )
        .y_axis(
            Axis::default()
                .bounds([-1.0, 1.0])
                .style(Style::default().fg(Color::DarkGray)),
        );

    frame.render_widget(chart, area);
}
