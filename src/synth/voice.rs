use std::sync::Arc;

use crate::dsp::automation::ParamAutomation;
use crate::dsp::wavetable::Wavetable;
use crate::graph::envelope::EnvNode;
use crate::graph::node::{GraphNode, RenderCtx};
use crate::graph::oscillator::TableOscNode;
use crate::synth::message::NoteId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceState {
    Silent,   // Nothing playing
    Sounding, // Table looping, note recorded
}

/// The single playable voice: looping table into an envelope-driven gain.
pub struct Voice {
    note: Option<NoteId>,
    pitch_hz: f32,
    state: VoiceState,
    osc: TableOscNode,
    env: EnvNode,
}

impl Voice {
    pub fn new(table: Arc<Wavetable>) -> Self {
        Self {
            note: None,
            pitch_hz: 0.0,
            state: VoiceState::Silent,
            osc: TableOscNode::new(table),
            env: EnvNode::new(0.0),
        }
    }

    pub fn start(&mut self, id: NoteId, pitch_hz: f32, sample_rate: f32) {
        self.note = Some(id);
        self.pitch_hz = pitch_hz;
        self.state = VoiceState::Sounding;

        let ctx = RenderCtx::from_freq(sample_rate, pitch_hz);
        self.osc.note_on(&ctx);
    }

    /// Stop playback. Safe to call when already silent.
    pub fn stop(&mut self) {
        self.osc.stop();
        self.state = VoiceState::Silent;
        self.note = None;
    }

    pub fn render(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        if self.state == VoiceState::Silent {
            out.fill(0.0);
            return;
        }
        self.osc.render_block(out, ctx);
        self.env.render_block(out, ctx);
    }

    pub fn set_table(&mut self, table: Arc<Wavetable>, sample_rate: f32) -> Arc<Wavetable> {
        let old = self.osc.set_table(table);
        // A new length changes the rate needed for the same pitch
        if self.state == VoiceState::Sounding {
            self.osc.set_pitch(self.pitch_hz, sample_rate);
        }
        old
    }

    pub fn table(&self) -> &Arc<Wavetable> {
        self.osc.table()
    }

    pub fn gain(&self) -> &ParamAutomation {
        self.env.gain()
    }

    pub fn gain_mut(&mut self) -> &mut ParamAutomation {
        self.env.gain_mut()
    }

    /// Gain applied to the last rendered frame.
    pub fn level(&self) -> f32 {
        self.env.level()
    }

    pub fn note(&self) -> Option<NoteId> {
        self.note
    }

    pub fn pitch_hz(&self) -> f32 {
        self.pitch_hz
    }

    pub fn playback_rate(&self) -> f64 {
        self.osc.rate()
    }

    pub fn state(&self) -> VoiceState {
        self.state
    }

    pub fn is_sounding(&self) -> bool {
        self.state == VoiceState::Sounding
    }
}
