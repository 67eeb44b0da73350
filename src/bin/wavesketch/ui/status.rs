//! Status bar widget - voice, parameters and audio stats

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use wavesketch::{graph::filter::Band, synth::message::NoteId};

use crate::app::App;

/// Audio statistics for display
pub struct AudioStats {
    pub peak: f32,
    pub rms: f32,
}

impl AudioStats {
    /// Compute audio stats from a buffer
    pub fn from_buffer(buffer: &[f32]) -> Self {
        if buffer.is_empty() {
            return Self { peak: 0.0, rms: 0.0 };
        }
        let peak = buffer.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()));
        let rms = (buffer.iter().map(|&x| x * x).sum::<f32>() / buffer.len() as f32).sqrt();
        Self { peak, rms }
    }
}

fn on_off(enabled: bool) -> Style {
    Style::default().fg(if enabled { Color::Green } else { Color::DarkGray })
}

fn note_label(app: &App, note: Option<NoteId>) -> String {
    match note {
        Some(NoteId::Virtual(index)) => match app.keyboard.pitch(index) {
            Some((name, octave, _)) => format!("{name}{octave}"),
            None => "key".to_string(),
        },
        Some(NoteId::Midi(key)) => format!("MIDI {key}"),
        None => "-".to_string(),
    }
}

/// Render the status bar
pub fn render_status(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default().title(" wavesketch ").borders(Borders::ALL);

    let stats = AudioStats::from_buffer(&app.vis_buffer);
    let (note, pitch) = match app.snapshot {
        Some(s) => (note_label(app, s.note), s.pitch_hz),
        None => ("-".to_string(), 0.0),
    };
    let lp = app.patch.band(Band::LowPass);
    let hp = app.patch.band(Band::HighPass);

    let audio = if app.is_audio_active() {
        Span::styled("▶ audio  ", Style::default().fg(Color::Green))
    } else {
        Span::styled("⏸ press a key  ", Style::default().fg(Color::Yellow))
    };

    let params = Line::from(vec![
        audio,
        Span::styled(
            format!("Oct {}  ", app.keyboard.octave()),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(
            format!("Note {note} {pitch:.1}Hz  "),
            Style::default().fg(Color::White),
        ),
        Span::styled("Env  ", on_off(app.patch.envelope_enabled)),
        Span::styled(
            format!("LP {:.0}Hz {:.0}dB  ", lp.cutoff_hz, lp.slope.db()),
            on_off(lp.enabled),
        ),
        Span::styled(
            format!("HP {:.0}Hz {:.0}dB  ", hp.cutoff_hz, hp.slope.db()),
            on_off(hp.enabled),
        ),
        Span::styled(
            format!("{:+.0}dB  ", app.patch.master_db),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(
            format!("{:.1}kHz  ", app.sample_rate / 1000.0),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(
            format!("Peak: {:.2}  RMS: {:.2}", stats.peak, stats.rms),
            Style::default().fg(Color::Magenta),
        ),
    ]);
    let message = Line::from(Span::styled(
        format!(" {}", app.message),
        Style::default().fg(Color::Gray),
    ));

    let paragraph = Paragraph::new(vec![params, message]).block(block);
    frame.render_widget(paragraph, area);
}
