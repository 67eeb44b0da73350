//! Harmonic spectrum of the loaded wavetable
//!
//! The table is exactly one cycle, so FFT bin k of the whole table is the
//! k-th harmonic. No window is needed.

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    widgets::{BarChart, Block, Borders},
    Frame,
};
use rustfft::{num_complex::Complex, FftPlanner};
use wavesketch::dsp::wavetable::Wavetable;

/// Number of harmonics to display
const HARMONICS: usize = 24;

/// Bottom of the display range; quieter harmonics show as empty bars.
const FLOOR_DB: f64 = -60.0;

pub struct HarmonicSpectrum {
    planner: FftPlanner<f32>,
    scratch: Vec<Complex<f32>>,
}

impl HarmonicSpectrum {
    pub fn new() -> Self {
        Self {
            planner: FftPlanner::new(),
            scratch: Vec::new(),
        }
    }

    /// Harmonic labels and bar heights (dB above the floor).
    pub fn analyze(&mut self, table: &Wavetable) -> Vec<(String, u64)> {
        let len = table.len();
        if len < 2 {
            return Vec::new();
        }

        let fft = self.planner.plan_fft_forward(len);
        self.scratch.clear();
        self.scratch
            .extend(table.samples().iter().map(|&s| Complex::new(s, 0.0)));
        fft.process(&mut self.scratch);

        let count = HARMONICS.min(len / 2);
        (1..=count)
            .map(|k| {
                let bin = self.scratch[k];
                // Single-sided amplitude: a full-scale sine reads 0 dB
                let amplitude = (bin.norm() as f64 * 2.0 / len as f64).max(1e-9);
                let db = 20.0 * amplitude.log10();
                let height = (db - FLOOR_DB).max(0.0).round() as u64;
                (k.to_string(), height)
            })
            .collect()
    }
}

/// Render the harmonic bar chart
pub fn render_spectrum(frame: &mut Frame, area: Rect, harmonics: &[(String, u64)]) {
    let block = Block::default()
        .title(format!(" Harmonics ({FLOOR_DB:.0} to 0 dB) "))
        .borders(Borders::ALL);

    let bars: Vec<(&str, u64)> = harmonics.iter().map(|(k, h)| (k.as_str(), *h)).collect();
    let inner_width = area.width.saturating_sub(2) as usize;
    let bar_width = (inner_width / harmonics.len().max(1)).saturating_sub(1).clamp(1, 4) as u16;

    let chart = BarChart::default()
        .block(block)
        .data(bars.as_slice())
        .bar_width(bar_width)
        .bar_gap(1)
        .max((-FLOOR_DB) as u64)
        .bar_style(Style::default().fg(Color::Green))
        .value_style(Style::default().fg(Color::Black).bg(Color::Green));

    frame.render_widget(chart, area);
}
