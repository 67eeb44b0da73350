use std::sync::Arc;

use crate::dsp::oscillator::{playback_rate, TablePlayer};
use crate::dsp::wavetable::Wavetable;
use crate::graph::node::{GraphNode, RenderCtx};

/*
Wavetable Oscillator
====================

The voice's only sound source: one user-drawn cycle, looped.

Pitch comes from playback RATE, not from the table. A table of L samples
played one sample per frame repeats sample_rate / L times a second:

    8192 samples at 44.1 kHz  →  44100 / 8192 ≈ 5.38 Hz

To sound at 440 Hz we step through it 440 / 5.38 ≈ 81.7 samples per frame.
Changing the table length changes the rate, never the pitch.

Swapping Tables
---------------

The table is shared behind an `Arc`. When the user redraws the shape the
node's pointer is replaced in one step. The read position is rescaled to the
new length, so a sounding note keeps its phase and picks up the new timbre on
the next frame.

Example usage:
  let mut osc = TableOscNode::new(Arc::new(table));
  osc.set_pitch(440.0, 44_100.0);
  osc.render_block(&mut buffer, &ctx);
*/

pub struct TableOscNode {
    table: Arc<Wavetable>,
    player: TablePlayer,
    playing: bool,
}

impl TableOscNode {
    pub fn new(table: Arc<Wavetable>) -> Self {
        Self {
            table,
            player: TablePlayer::new(),
            playing: false,
        }
    }

    pub fn table(&self) -> &Arc<Wavetable> {
        &self.table
    }

    /// Replace the table at the same cycle phase; returns the previous one.
    ///
    /// The rate is not touched. Call [`Self::set_pitch`] afterwards if the
    /// length changed.
    pub fn set_table(&mut self, table: Arc<Wavetable>) -> Arc<Wavetable> {
        self.player.rescale(self.table.len(), table.len());
        std::mem::replace(&mut self.table, table)
    }

    /// Position within the cycle, 0.0 to 1.0.
    pub fn phase(&self) -> f64 {
        match self.table.len() {
            0 => 0.0,
            len => self.player.position() / len as f64,
        }
    }

    pub fn set_pitch(&mut self, pitch_hz: f32, sample_rate: f32) {
        let rate = playback_rate(pitch_hz, sample_rate, self.table.len());
        self.player.set_rate(rate);
    }

    pub fn rate(&self) -> f64 {
        self.player.rate()
    }

    /// Start looping from the top of the table.
    pub fn start(&mut self) {
        self.player.reset();
        self.playing = true;
    }

    /// Halt playback. Safe to call when already stopped.
    pub fn stop(&mut self) {
        self.playing = false;
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }
}

impl GraphNode for TableOscNode {
    fn render_block(&mut self, out: &mut [f32], _ctx: &RenderCtx) {
        if self.playing {
            self.player.render(out, &self.table);
        } else {
            out.fill(0.0);
        }
    }

    fn note_on(&mut self, ctx: &RenderCtx) {
        self.set_pitch(ctx.frequency, ctx.sample_rate);
        self.start();
    }

    fn note_off(&mut self, _ctx: &RenderCtx) {
        self.stop();
    }

    fn is_active(&self) -> bool {
        self.playing
    }
}
