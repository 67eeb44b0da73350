use std::sync::Arc;

use tracing::{debug, trace};

use crate::{
    config::EngineConfig,
    dsp::{
        db_to_gain,
        envelope::{EnvelopeParams, EnvelopePhase},
        wavetable::{WaveSource, Wavetable, WavetableBuilder},
    },
    engine::{clock::AudioClock, scheduler::EnvelopeScheduler},
    graph::{
        filter::{Band, FilterChain, Slope},
        node::{GraphNode, RenderCtx},
    },
    patch::{clamp_master_db, Patch},
    synth::{
        message::{MessageReceiver, NoteId, SynthMessage},
        voice::Voice,
    },
    MAX_BLOCK_SIZE,
};

/// What a display needs to know about the voice at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoiceSnapshot {
    pub time: f64,
    pub note: Option<NoteId>,
    pub pitch_hz: f32,
    pub phase: EnvelopePhase,
}

/// Monophonic engine: one voice, last note wins.
///
/// Signal path per block:
///
///   table osc → envelope gain → low-pass band → high-pass band → master
///
/// All state lives here and is only touched from the thread that renders.
/// Other threads talk to it through [`SynthMessage`]s, drained at the top
/// of every block.
pub struct MonoSynth {
    config: EngineConfig,
    clock: AudioClock,
    voice: Voice,
    scheduler: EnvelopeScheduler,
    filters: FilterChain,
    master_db: f32,
    master_gain: f32,
    rx: Option<Box<dyn MessageReceiver + Send>>,
}

impl MonoSynth {
    /// Engine with the patch's preset loaded and every setting applied.
    pub fn new(config: EngineConfig, patch: &Patch) -> Self {
        let builder = WavetableBuilder::new(config.table_len, config.fade_samples);
        let table = Arc::new(builder.build(WaveSource::Preset(patch.preset)));
        let mut synth = Self::with_table(config, table);
        synth.apply_patch(patch);
        synth
    }

    pub fn with_table(config: EngineConfig, table: Arc<Wavetable>) -> Self {
        let scheduler = EnvelopeScheduler::new(config.sustain_level)
            .with_min_stage_time(config.min_stage_time);
        Self {
            clock: AudioClock::new(config.sample_rate),
            voice: Voice::new(table),
            scheduler,
            filters: FilterChain::new(),
            master_db: 0.0,
            master_gain: 1.0,
            rx: None,
            config,
        }
    }

    /// Drain `rx` at the start of every rendered block.
    pub fn with_receiver(mut self, rx: impl MessageReceiver + Send + 'static) -> Self {
        self.rx = Some(Box::new(rx));
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn sample_rate(&self) -> f32 {
        self.config.sample_rate
    }

    /// Audio clock time of the next frame to be rendered.
    pub fn now(&self) -> f64 {
        self.clock.now()
    }

    /// Start `id` at `pitch_hz`, replacing any sounding note.
    pub fn note_on(&mut self, id: NoteId, pitch_hz: f32) {
        let now = self.clock.now();
        if let Some(previous) = self.voice.note() {
            trace!(?previous, ?id, "stealing voice");
            self.voice.stop();
        }
        self.voice.start(id, pitch_hz, self.config.sample_rate);
        self.scheduler.start(now, self.voice.gain_mut());
    }

    /// Stop the voice if `id` is the sounding note. Returns whether it was.
    pub fn note_off(&mut self, id: NoteId) -> bool {
        if self.voice.note() != Some(id) {
            debug!(?id, sounding = ?self.voice.note(), "ignoring note-off for a note not sounding");
            return false;
        }
        self.silence();
        true
    }

    pub fn all_notes_off(&mut self) {
        self.silence();
    }

    fn silence(&mut self) {
        let now = self.clock.now();
        self.voice.stop();
        self.scheduler.stop(now, self.voice.gain_mut());
    }

    /// Swap in a new table; a sounding note keeps its pitch and phase.
    pub fn set_wavetable(&mut self, table: Arc<Wavetable>) -> Arc<Wavetable> {
        self.voice.set_table(table, self.config.sample_rate)
    }

    pub fn wavetable(&self) -> &Arc<Wavetable> {
        self.voice.table()
    }

    pub fn set_envelope(&mut self, params: EnvelopeParams) {
        self.scheduler.set_params(params);
    }

    pub fn set_envelope_enabled(&mut self, enabled: bool) {
        let now = self.clock.now();
        self.scheduler.set_enabled(enabled, now, self.voice.gain_mut());
    }

    pub fn set_filter(&mut self, band: Band, cutoff_hz: f32, q: f32) {
        self.filters.set_params(band, cutoff_hz, q);
    }

    pub fn set_slope(&mut self, band: Band, slope: Slope) {
        if self.filters.band(band).slope() != slope {
            self.filters.rebuild_band(band, slope.db());
        }
    }

    pub fn set_band_enabled(&mut self, band: Band, enabled: bool) {
        self.filters.set_enabled(band, enabled);
    }

    pub fn set_master_db(&mut self, db: f32) {
        self.master_db = clamp_master_db(db);
        self.master_gain = db_to_gain(self.master_db);
    }

    pub fn master_db(&self) -> f32 {
        self.master_db
    }

    /// Commit every setting in `patch` except the wavetable source.
    pub fn apply_patch(&mut self, patch: &Patch) {
        self.set_envelope(patch.envelope);
        self.set_envelope_enabled(patch.envelope_enabled);
        for band in [Band::LowPass, Band::HighPass] {
            let settings = patch.band(band);
            self.set_slope(band, settings.slope);
            self.set_filter(band, settings.cutoff_hz, settings.q);
            self.set_band_enabled(band, settings.enabled);
        }
        self.set_master_db(patch.master_db);
    }

    pub fn handle(&mut self, msg: SynthMessage) {
        match msg {
            SynthMessage::NoteOn { id, pitch_hz } => self.note_on(id, pitch_hz),
            SynthMessage::NoteOff { id } => {
                self.note_off(id);
            }
            SynthMessage::AllNotesOff => self.all_notes_off(),
            SynthMessage::SetWavetable(table) => {
                self.set_wavetable(table);
            }
            SynthMessage::SetEnvelope(params) => self.set_envelope(params),
            SynthMessage::SetEnvelopeEnabled(enabled) => self.set_envelope_enabled(enabled),
            SynthMessage::SetFilter {
                band,
                cutoff_hz,
                q,
            } => self.set_filter(band, cutoff_hz, q),
            SynthMessage::SetSlope { band, slope } => self.set_slope(band, slope),
            SynthMessage::SetBandEnabled { band, enabled } => {
                self.set_band_enabled(band, enabled)
            }
            SynthMessage::SetMasterDb(db) => self.set_master_db(db),
        }
    }

    fn drain_messages(&mut self) {
        let Some(mut rx) = self.rx.take() else {
            return;
        };
        while let Some(msg) = rx.pop() {
            self.handle(msg);
        }
        self.rx = Some(rx);
    }

    pub fn render_block(&mut self, out: &mut [f32]) {
        self.drain_messages();

        for chunk in out.chunks_mut(MAX_BLOCK_SIZE) {
            let mut start = 0;
            while start < chunk.len() {
                let remaining = chunk.len() - start;
                let now = self.clock.now();
                let horizon = self.clock.time_after(remaining);
                self.scheduler.poll(now, horizon, self.voice.gain_mut());

                // More cycles end inside this chunk than one poll writes
                let len = match self.scheduler.next_due() {
                    Some(due) if due < horizon => self.clock.frames_until(due).clamp(1, remaining),
                    _ => remaining,
                };
                let span = &mut chunk[start..start + len];
                self.render_span(span, now);

                self.clock.advance(len);
                start += len;
            }
        }
    }

    fn render_span(&mut self, span: &mut [f32], now: f64) {
        let ctx = RenderCtx::from_freq(self.config.sample_rate, self.voice.pitch_hz()).at(now);
        self.voice.render(span, &ctx);
        self.filters.render_block(span, &ctx);
        for sample in span.iter_mut() {
            *sample *= self.master_gain;
        }
    }

    /// Where the envelope is right now. Does not change any state.
    pub fn phase(&self) -> EnvelopePhase {
        self.scheduler.phase(self.clock.now())
    }

    pub fn snapshot(&self) -> VoiceSnapshot {
        VoiceSnapshot {
            time: self.clock.now(),
            note: self.voice.note(),
            pitch_hz: self.voice.pitch_hz(),
            phase: self.phase(),
        }
    }

    pub fn voice(&self) -> &Voice {
        &self.voice
    }

    pub fn scheduler(&self) -> &EnvelopeScheduler {
        &self.scheduler
    }

    pub fn filters(&self) -> &FilterChain {
        &self.filters
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::envelope::EnvelopeState;
    use approx::assert_relative_eq;

    fn synth() -> MonoSynth {
        let config = EngineConfig::default().sample_rate(44_100.0);
        MonoSynth::new(config, &Patch::default())
    }

    #[test]
    fn rate_tracks_table_length() {
        let mut synth = synth();
        synth.note_on(NoteId::Midi(69), 440.0);
        assert_relative_eq!(synth.voice().playback_rate(), 81.73, max_relative = 1e-3);
    }

    #[test]
    fn new_note_steals_voice() {
        let mut synth = synth();
        synth.note_on(NoteId::Virtual(0), 261.63);
        synth.note_on(NoteId::Virtual(4), 329.63);

        assert_eq!(synth.voice().note(), Some(NoteId::Virtual(4)));
        assert_eq!(synth.voice().pitch_hz(), 329.63);
    }

    #[test]
    fn stale_note_off_is_ignored() {
        let mut synth = synth();
        synth.note_on(NoteId::Virtual(0), 261.63);
        synth.note_on(NoteId::Virtual(4), 329.63);

        assert!(!synth.note_off(NoteId::Virtual(0)));
        assert!(synth.voice().is_sounding());

        assert!(synth.note_off(NoteId::Virtual(4)));
        assert!(!synth.voice().is_sounding());
        assert!(!synth.note_off(NoteId::Virtual(4)));
    }

    #[test]
    fn same_pitch_from_other_source_does_not_release() {
        let mut synth = synth();
        synth.note_on(NoteId::Virtual(9), 440.0);
        assert!(!synth.note_off(NoteId::Midi(69)));
        assert!(synth.voice().is_sounding());
    }

    #[test]
    fn silent_without_note() {
        let mut synth = synth();
        let mut out = vec![1.0; 512];
        synth.render_block(&mut out);
        assert!(out.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn note_sounds_then_stops() {
        let mut synth = synth();
        synth.set_envelope_enabled(false);
        synth.note_on(NoteId::Midi(69), 440.0);

        let mut out = vec![0.0; 1024];
        synth.render_block(&mut out);
        assert!(out.iter().any(|s| s.abs() > 0.5));

        synth.note_off(NoteId::Midi(69));
        synth.render_block(&mut out);
        assert!(out.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn master_level_scales_output() {
        let mut loud = synth();
        let mut quiet = synth();
        quiet.set_master_db(-20.0);
        for synth in [&mut loud, &mut quiet] {
            synth.set_envelope_enabled(false);
            synth.note_on(NoteId::Midi(69), 440.0);
        }

        let mut a = vec![0.0; 256];
        let mut b = vec![0.0; 256];
        loud.render_block(&mut a);
        quiet.render_block(&mut b);
        for (a, b) in a.iter().zip(&b) {
            assert!((a * 0.1 - b).abs() < 1e-5);
        }
    }

    #[test]
    fn phase_follows_clock() {
        let mut synth = synth();
        synth.set_envelope(EnvelopeParams::new(0.1, 0.2, 0.1, 0.3));
        synth.note_on(NoteId::Midi(60), 261.63);
        assert_eq!(synth.phase().state, EnvelopeState::Attack);

        // 0.35 s in: inside the sustain hold
        let mut out = vec![0.0; 15_435];
        synth.render_block(&mut out);
        let phase = synth.phase();
        assert_eq!(phase.state, EnvelopeState::Sustain);
        assert_relative_eq!(phase.level, 0.5, max_relative = 1e-4);
    }

    #[test]
    fn slope_change_rebuilds_only_on_change() {
        let mut synth = synth();
        synth.set_slope(Band::LowPass, Slope::Db36);
        assert_eq!(synth.filters().band(Band::LowPass).stages().len(), 3);
        synth.set_filter(Band::LowPass, 800.0, 4.0);
        synth.set_slope(Band::LowPass, Slope::Db36);
        assert_eq!(synth.filters().band(Band::LowPass).stages()[0].q, 4.0);
    }

    #[test]
    fn long_block_of_short_cycles_stays_in_capacity() {
        use crate::dsp::automation::EVENT_CAPACITY;

        let mut synth = MonoSynth::new(EngineConfig::default(), &Patch::default());
        synth.set_envelope(EnvelopeParams::new(0.001, 0.001, 0.001, 0.001));
        synth.note_on(NoteId::Midi(60), 261.63);

        // 2048 frames at 48 kHz is ~42.7 ms, eleven 4 ms cycles
        let mut out = vec![0.0; MAX_BLOCK_SIZE];
        synth.render_block(&mut out);

        assert_eq!(synth.now(), MAX_BLOCK_SIZE as f64 / 48_000.0);
        assert!(synth.voice().gain().events().len() <= EVENT_CAPACITY);
        let cycle = synth.scheduler().current_cycle().expect("cycle running");
        assert!((cycle.start - 0.040).abs() < 1e-6, "start {}", cycle.start);
        assert!(out.iter().any(|&s| s.abs() > 0.1));
    }
}
