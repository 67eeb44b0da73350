#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dsp::automation::ParamAutomation;
use crate::MIN_STAGE_TIME;

/*
Scheduled ADSR Envelope
=======================

Unlike a per-sample envelope that walks a state machine one step at a time,
this envelope is planned up front: when a cycle starts we already know the
absolute clock time of every breakpoint, and we write the whole shape into a
gain automation curve in one go.

Vocabulary
----------

  t0        Absolute time (seconds on the audio clock) the cycle starts.

  tA        t0 + attack    peak (1.0) reached
  tD        tA + decay     sustain level reached
  tS        tD + sustain   sustain hold ends (here "sustain" is a DURATION)
  tR        tS + release   back at 0.0, the cycle is over

  sustain   Two things: the sustain DURATION (how long the hold lasts) is a
  level     user parameter, the sustain LEVEL is fixed by the engine config.


The Shape
---------

  Level
    1.0 ┤     ╱╲
        │    ╱  ╲
    S   ┤   ╱    ╲__________
        │  ╱                ╲
    0.0 ┼─╱──────────────────╲──→ Time
        t0   tA   tD        tS   tR

The gain program issued for a cycle is:

    set 0.0       at t0
    ramp to 1.0   by tA
    ramp to S     by tD
    set S         at tS     (holds S from tD, anchors the release)
    ramp to 0.0   by tR

A held note re-issues the same program at tR, so pads and drones pulse
instead of sitting on one level. The loop itself lives in the engine's
scheduler; this module only computes breakpoints and writes curves.


Why a Floor?
------------

A zero-length ramp on the automation curve is an instantaneous step: the
click we were trying to avoid. Every duration is floored to a minimum stage
time (1 ms by default) before breakpoints are computed.
*/

/// The stage of an envelope cycle at a given moment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeState {
    Idle,    // No cycle running, gain is 0
    Attack,  // t0 → tA, ramping 0 → 1
    Decay,   // tA → tD, ramping 1 → sustain level
    Sustain, // tD → tS, holding the sustain level
    Release, // tS → tR, ramping sustain level → 0
}

/// Four stage durations in seconds.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopeParams {
    pub attack: f32,
    pub decay: f32,
    pub sustain: f32,
    pub release: f32,
}

impl Default for EnvelopeParams {
    fn default() -> Self {
        Self {
            attack: 0.05,
            decay: 0.1,
            sustain: 0.3,
            release: 0.2,
        }
    }
}

impl EnvelopeParams {
    pub fn new(attack: f32, decay: f32, sustain: f32, release: f32) -> Self {
        Self {
            attack,
            decay,
            sustain,
            release,
        }
        .clamped(MIN_STAGE_TIME)
    }

    /// Floor every duration at `min`. Negative or NaN durations become `min`.
    pub fn clamped(self, min: f32) -> Self {
        let floor = |d: f32| if d.is_nan() { min } else { d.max(min) };
        Self {
            attack: floor(self.attack),
            decay: floor(self.decay),
            sustain: floor(self.sustain),
            release: floor(self.release),
        }
    }

    pub fn total(&self) -> f32 {
        self.attack + self.decay + self.sustain + self.release
    }
}

/// Breakpoints of one scheduled cycle, in absolute clock seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopeCycle {
    pub start: f64,
    pub attack_end: f64,
    pub decay_end: f64,
    pub sustain_end: f64,
    pub release_end: f64,
    pub sustain_level: f32,
}

/// Where a cycle is at some moment, for display.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopePhase {
    pub state: EnvelopeState,
    /// Progress through the current stage, 0.0 to 1.0.
    pub progress: f32,
    pub level: f32,
}

impl EnvelopePhase {
    pub const IDLE: EnvelopePhase = EnvelopePhase {
        state: EnvelopeState::Idle,
        progress: 0.0,
        level: 0.0,
    };
}

impl EnvelopeCycle {
    /// Breakpoints for a cycle starting at `start`. `params` must be clamped.
    pub fn plan(start: f64, params: &EnvelopeParams, sustain_level: f32) -> Self {
        let attack_end = start + params.attack as f64;
        let decay_end = attack_end + params.decay as f64;
        let sustain_end = decay_end + params.sustain as f64;
        let release_end = sustain_end + params.release as f64;
        Self {
            start,
            attack_end,
            decay_end,
            sustain_end,
            release_end,
            sustain_level,
        }
    }

    /// Write this cycle's gain program into `gain`.
    pub fn write(&self, gain: &mut ParamAutomation) {
        gain.set_value_at_time(0.0, self.start);
        gain.linear_ramp_to_value_at_time(1.0, self.attack_end);
        gain.linear_ramp_to_value_at_time(self.sustain_level, self.decay_end);
        gain.set_value_at_time(self.sustain_level, self.sustain_end);
        gain.linear_ramp_to_value_at_time(0.0, self.release_end);
    }

    pub fn state_at(&self, time: f64) -> EnvelopeState {
        if time < self.start || time >= self.release_end {
            EnvelopeState::Idle
        } else if time < self.attack_end {
            EnvelopeState::Attack
        } else if time < self.decay_end {
            EnvelopeState::Decay
        } else if time < self.sustain_end {
            EnvelopeState::Sustain
        } else {
            EnvelopeState::Release
        }
    }

    /// Stage, progress and level at `time`, computed from breakpoints alone.
    pub fn phase_at(&self, time: f64) -> EnvelopePhase {
        let state = self.state_at(time);
        let progress = |from: f64, to: f64| {
            if to > from {
                ((time - from) / (to - from)).clamp(0.0, 1.0) as f32
            } else {
                1.0
            }
        };
        let s = self.sustain_level;
        let (progress, level) = match state {
            EnvelopeState::Idle => return EnvelopePhase::IDLE,
            EnvelopeState::Attack => {
                let p = progress(self.start, self.attack_end);
                (p, p)
            }
            EnvelopeState::Decay => {
                let p = progress(self.attack_end, self.decay_end);
                (p, 1.0 + (s - 1.0) * p)
            }
            EnvelopeState::Sustain => (progress(self.decay_end, self.sustain_end), s),
            EnvelopeState::Release => {
                let p = progress(self.sustain_end, self.release_end);
                (p, s * (1.0 - p))
            }
        };
        EnvelopePhase {
            state,
            progress,
            level,
        }
    }
}
