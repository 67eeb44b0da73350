//! Application state, key handling and the event loop

use std::{
    collections::VecDeque,
    io::stdout,
    sync::{mpsc, Arc},
    time::Duration,
};

use color_eyre::eyre::{Result as EyreResult, WrapErr};
use crossterm::{
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::supports_keyboard_enhancement,
};
use ratatui::DefaultTerminal;
use tracing::{info, warn};

use wavesketch::{
    dsp::{
        filter::clamp_cutoff,
        wavetable::{Preset, WaveSource, Wavetable, WavetableBuilder},
    },
    graph::filter::{Band, Slope},
    io::{
        keyboard::VirtualKeyboard,
        samples::{self, ParsedSamples},
    },
    patch::clamp_master_db,
    runtime::{scope, OutputDevice, RunningOutput, ScopeReceiver},
    synth::{
        controller::{self, Controller},
        mono::VoiceSnapshot,
    },
    EngineConfig, MonoSynth, Patch,
};

use crate::ui::{self, spectrum::HarmonicSpectrum};

/// File used by import and export.
pub const WAVE_FILE: &str = "wave.txt";

const VIS_LEN: usize = 1024;
const SCOPE_RING: usize = VIS_LEN * 16;
const ENVELOPE_HISTORY_LEN: usize = 256;
const MASTER_STEP_DB: f32 = 3.0;
const CUTOFF_STEP: f32 = 1.25;

type ImportResult = wavesketch::Result<ParsedSamples>;

pub fn run(mut terminal: DefaultTerminal) -> EyreResult<()> {
    let device = OutputDevice::open_default().wrap_err("audio output unavailable")?;
    let config = EngineConfig::default().sample_rate(device.sample_rate());
    let patch = Patch::default();

    let builder = WavetableBuilder::new(config.table_len, config.fade_samples);
    let (mut controller, rx) = controller::channel(config.queue_capacity, builder);
    let (tap, scope_rx) = scope(SCOPE_RING);

    let synth = MonoSynth::new(config.clone(), &patch).with_receiver(rx);
    let table = Arc::clone(synth.wavetable());
    // Keep the first table alive on this side too
    controller
        .set_wavetable(Arc::clone(&table))
        .wrap_err("failed to queue initial wavetable")?;

    let output = device
        .start(synth, Some(tap))
        .wrap_err("failed to build output stream")?;

    let release_events = supports_keyboard_enhancement().unwrap_or(false);
    if release_events {
        execute!(
            stdout(),
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
        )?;
    }
    info!(release_events, "terminal keyboard mode");

    let mut app = App::new(
        controller,
        output,
        scope_rx,
        patch,
        table,
        config.sample_rate,
        release_events,
    );
    let res = app.run(&mut terminal);

    if release_events {
        let _ = execute!(stdout(), PopKeyboardEnhancementFlags);
    }
    res
}

pub struct App {
    controller: Controller,
    output: RunningOutput,
    scope: ScopeReceiver,
    imports_tx: mpsc::Sender<ImportResult>,
    imports_rx: mpsc::Receiver<ImportResult>,
    spectrum: HarmonicSpectrum,
    /// Terminal reports key releases; otherwise releases are inferred.
    release_events: bool,
    held: Option<char>,
    should_quit: bool,

    pub keyboard: VirtualKeyboard,
    pub patch: Patch,
    pub table: Arc<Wavetable>,
    pub sample_rate: f32,
    pub harmonics: Vec<(String, u64)>,
    pub vis_buffer: Vec<f32>,
    pub env_history: VecDeque<f32>,
    pub snapshot: Option<VoiceSnapshot>,
    pub message: String,
}

impl App {
    fn new(
        controller: Controller,
        output: RunningOutput,
        scope: ScopeReceiver,
        patch: Patch,
        table: Arc<Wavetable>,
        sample_rate: f32,
        release_events: bool,
    ) -> Self {
        let (imports_tx, imports_rx) = mpsc::channel();
        let mut spectrum = HarmonicSpectrum::new();
        let harmonics = spectrum.analyze(&table);
        Self {
            controller,
            output,
            scope,
            imports_tx,
            imports_rx,
            spectrum,
            release_events,
            held: None,
            should_quit: false,
            keyboard: VirtualKeyboard::default(),
            patch,
            table,
            sample_rate,
            harmonics,
            vis_buffer: vec![0.0; VIS_LEN],
            env_history: VecDeque::with_capacity(ENVELOPE_HISTORY_LEN),
            snapshot: None,
            message: "play with a-; keys, any key starts audio".to_string(),
        }
    }

    pub fn is_audio_active(&self) -> bool {
        self.output.is_active()
    }

    pub fn envelope_history_len(&self) -> usize {
        ENVELOPE_HISTORY_LEN
    }

    fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.poll_scope();
            self.poll_imports();

            terminal.draw(|frame| ui::render(frame, self))?;

            // ~60fps
            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    self.handle_key(key);
                }
            }
        }

        let result = self.controller.all_notes_off();
        self.report(result);
        Ok(())
    }

    fn poll_scope(&mut self) {
        let mut new_samples = Vec::new();
        while let Ok(sample) = self.scope.samples.pop() {
            new_samples.push(sample);
        }
        if !new_samples.is_empty() {
            self.vis_buffer.extend(new_samples);
            if self.vis_buffer.len() > VIS_LEN {
                let excess = self.vis_buffer.len() - VIS_LEN;
                self.vis_buffer.drain(0..excess);
            }
        }

        while let Ok(snapshot) = self.scope.snapshots.pop() {
            self.snapshot = Some(snapshot);
            if self.env_history.len() == ENVELOPE_HISTORY_LEN {
                self.env_history.pop_front();
            }
            self.env_history.push_back(snapshot.phase.level);
        }
    }

    fn poll_imports(&mut self) {
        while let Ok(result) = self.imports_rx.try_recv() {
            match result {
                Ok(parsed) => {
                    self.load(WaveSource::Samples(&parsed.samples));
                    self.message = format!(
                        "imported {} samples from {WAVE_FILE} ({} lines skipped)",
                        parsed.samples.len(),
                        parsed.dropped
                    );
                }
                Err(err) => {
                    warn!("import failed: {err}");
                    self.message = format!("import failed: {err}");
                }
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        match key.kind {
            KeyEventKind::Release => {
                if let KeyCode::Char(c) = key.code {
                    self.release(c);
                }
                return;
            }
            KeyEventKind::Repeat => return,
            KeyEventKind::Press => {}
        }

        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true
            }
            KeyCode::Char(' ') => self.release_held(),
            KeyCode::Char(c @ '1'..='4') => {
                let preset = Preset::ALL[(c as u8 - b'1') as usize];
                self.select_preset(preset);
            }
            KeyCode::Char('[') => self.keyboard.octave_down(),
            KeyCode::Char(']') => self.keyboard.octave_up(),
            KeyCode::Char('E') => self.toggle_envelope(),
            KeyCode::Char('L') => self.toggle_band(Band::LowPass),
            KeyCode::Char('H') => self.toggle_band(Band::HighPass),
            KeyCode::Char('I') => self.start_import(),
            KeyCode::Char('O') => self.export(),
            KeyCode::Char('-') => self.nudge_master(-MASTER_STEP_DB),
            KeyCode::Char('=') => self.nudge_master(MASTER_STEP_DB),
            KeyCode::Up => self.scale_cutoff(Band::LowPass, CUTOFF_STEP),
            KeyCode::Down => self.scale_cutoff(Band::LowPass, 1.0 / CUTOFF_STEP),
            KeyCode::Right => self.step_slope(Band::LowPass, 1),
            KeyCode::Left => self.step_slope(Band::LowPass, -1),
            KeyCode::Char(c) => self.press(c),
            _ => {}
        }
    }

    fn press(&mut self, key: char) {
        // Without release events, a held key arrives as repeated presses
        if !self.release_events && self.held == Some(key) {
            return;
        }
        let Some(msg) = self.keyboard.note_on(key) else {
            return;
        };
        self.resume_audio();

        if !self.release_events {
            if let Some(previous) = self.held.take() {
                self.release(previous);
            }
        }
        self.held = Some(key);
        let result = self.controller.send(msg);
        self.report(result);
    }

    fn release(&mut self, key: char) {
        if let Some(msg) = self.keyboard.note_off(key) {
            if self.held == Some(key) {
                self.held = None;
            }
            let result = self.controller.send(msg);
            self.report(result);
        }
    }

    fn release_held(&mut self) {
        if let Some(key) = self.held {
            self.release(key);
        }
    }

    fn resume_audio(&mut self) {
        if self.output.is_active() {
            return;
        }
        if let Err(err) = self.output.resume() {
            warn!("failed to start audio: {err}");
            self.message = format!("audio: {err}");
        }
    }

    fn load(&mut self, source: WaveSource<'_>) {
        match self.controller.load(source) {
            Ok(table) => {
                self.harmonics = self.spectrum.analyze(&table);
                self.table = table;
            }
            Err(err) => self.report_error(err),
        }
    }

    fn select_preset(&mut self, preset: Preset) {
        self.patch.preset = preset;
        self.load(WaveSource::Preset(preset));
        self.message = format!("preset: {}", preset.name());
    }

    fn toggle_envelope(&mut self) {
        self.patch.envelope_enabled = !self.patch.envelope_enabled;
        let enabled = self.patch.envelope_enabled;
        let result = self.controller.set_envelope_enabled(enabled);
        self.report(result);
    }

    fn toggle_band(&mut self, band: Band) {
        let settings = self.patch.band_mut(band);
        settings.enabled = !settings.enabled;
        let enabled = settings.enabled;
        let result = self.controller.set_band_enabled(band, enabled);
        self.report(result);
    }

    fn scale_cutoff(&mut self, band: Band, factor: f32) {
        let settings = self.patch.band_mut(band);
        settings.cutoff_hz = clamp_cutoff(settings.cutoff_hz * factor);
        let (cutoff_hz, q) = (settings.cutoff_hz, settings.q);
        let result = self.controller.set_filter(band, cutoff_hz, q);
        self.report(result);
    }

    fn step_slope(&mut self, band: Band, step: isize) {
        let settings = self.patch.band_mut(band);
        let current = Slope::ALL
            .iter()
            .position(|s| *s == settings.slope)
            .unwrap_or(0) as isize;
        let next = (current + step).clamp(0, Slope::ALL.len() as isize - 1) as usize;
        settings.slope = Slope::ALL[next];
        let slope = settings.slope;
        let result = self.controller.set_slope(band, slope);
        self.report(result);
    }

    fn nudge_master(&mut self, delta_db: f32) {
        self.patch.master_db = clamp_master_db(self.patch.master_db + delta_db);
        let db = self.patch.master_db;
        let result = self.controller.set_master_db(db);
        self.report(result);
    }

    fn start_import(&mut self) {
        let tx = self.imports_tx.clone();
        samples::spawn_import(WAVE_FILE, move |result| {
            let _ = tx.send(result);
        });
        self.message = format!("importing {WAVE_FILE}...");
    }

    fn export(&mut self) {
        match samples::export_file(WAVE_FILE, &self.table) {
            Ok(()) => self.message = format!("exported {} samples to {WAVE_FILE}", self.table.len()),
            Err(err) => self.report_error(err),
        }
    }

    fn report(&mut self, result: wavesketch::Result<()>) {
        if let Err(err) = result {
            self.report_error(err);
        }
    }

    fn report_error(&mut self, err: wavesketch::Error) {
        warn!("{err}");
        self.message = err.to_string();
    }
}
