use tracing::trace;

use crate::dsp::automation::ParamAutomation;
use crate::dsp::envelope::{EnvelopeCycle, EnvelopeParams, EnvelopePhase, EnvelopeState};
use crate::MIN_STAGE_TIME;

/// Cycles one poll may write. Five events each, plus the anchor kept by
/// pruning, stays inside the automation's preallocated capacity.
pub const MAX_CYCLES_PER_POLL: usize = 4;

/// A cycle end the scheduler has promised to act on.
#[derive(Debug, Clone, Copy)]
struct PendingCycle {
    generation: u64,
    due: f64,
}

/// Drives the voice's gain curve through repeating ADSR cycles.
///
/// Each cycle is written into the gain automation in full when it starts.
/// While the note is held, the next cycle is scheduled exactly at the
/// previous cycle's end time, anchored to the audio clock, so repeats never
/// drift. Starting or stopping a note bumps the generation counter, which
/// invalidates any reschedule still pending from an older cycle.
#[derive(Debug, Clone)]
pub struct EnvelopeScheduler {
    params: EnvelopeParams,
    enabled: bool,
    sustain_level: f32,
    min_stage_time: f32,
    generation: u64,
    held: bool,
    pending: Option<PendingCycle>,
    current: Option<EnvelopeCycle>,
}

impl EnvelopeScheduler {
    pub fn new(sustain_level: f32) -> Self {
        Self {
            params: EnvelopeParams::default(),
            enabled: true,
            sustain_level: sustain_level.clamp(0.0, 1.0),
            min_stage_time: MIN_STAGE_TIME,
            generation: 0,
            held: false,
            pending: None,
            current: None,
        }
    }

    pub fn with_min_stage_time(mut self, min_stage_time: f32) -> Self {
        self.min_stage_time = min_stage_time;
        self
    }

    /// New durations take effect at the start of the next cycle.
    pub fn set_params(&mut self, params: EnvelopeParams) {
        self.params = params.clamped(self.min_stage_time);
    }

    pub fn params(&self) -> EnvelopeParams {
        self.params
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Turn the envelope on or off.
    ///
    /// Enabling while a note sounds starts a cycle immediately. Disabling
    /// lets the running cycle finish; the loop then holds full gain.
    pub fn set_enabled(&mut self, enabled: bool, now: f64, gain: &mut ParamAutomation) {
        let was_enabled = self.enabled;
        self.enabled = enabled;
        if enabled && !was_enabled && self.held {
            self.generation = self.generation.wrapping_add(1);
            gain.cancel_scheduled_values(now);
            self.schedule_cycle(now, self.params, gain);
        }
    }

    /// Write one full cycle starting at `start` and return its end time.
    pub fn schedule_cycle(
        &mut self,
        start: f64,
        params: EnvelopeParams,
        gain: &mut ParamAutomation,
    ) -> f64 {
        let params = params.clamped(self.min_stage_time);
        let cycle = EnvelopeCycle::plan(start, &params, self.sustain_level);
        cycle.write(gain);

        self.current = Some(cycle);
        self.pending = Some(PendingCycle {
            generation: self.generation,
            due: cycle.release_end,
        });
        trace!(start, end = cycle.release_end, "scheduled envelope cycle");
        cycle.release_end
    }

    /// Begin a note at `now`, replacing whatever was scheduled.
    pub fn start(&mut self, now: f64, gain: &mut ParamAutomation) {
        self.generation = self.generation.wrapping_add(1);
        self.held = true;
        gain.cancel_scheduled_values(now);
        gain.prune_before(now);

        if self.enabled {
            self.schedule_cycle(now, self.params, gain);
        } else {
            self.pending = None;
            self.current = None;
            gain.set_value_at_time(1.0, now);
        }
    }

    /// End the note at `now`: cancel future automation and silence the gain.
    pub fn stop(&mut self, now: f64, gain: &mut ParamAutomation) {
        self.generation = self.generation.wrapping_add(1);
        self.held = false;
        self.pending = None;
        self.current = None;
        gain.cancel_scheduled_values(now);
        gain.set_value_at_time(0.0, now);
    }

    /// Fire pending cycles due before `horizon`, at most
    /// [`MAX_CYCLES_PER_POLL`] of them.
    ///
    /// Called with the start and end time of the span about to be rendered.
    /// If [`Self::next_due`] is still before `horizon` afterwards, render only
    /// up to it and poll again. Returns how many cycles were started.
    pub fn poll(&mut self, now: f64, horizon: f64, gain: &mut ParamAutomation) -> usize {
        gain.prune_before(now);

        let mut fired = 0;
        while fired < MAX_CYCLES_PER_POLL {
            let Some(pending) = self.pending else {
                break;
            };
            if pending.generation != self.generation {
                self.pending = None;
                break;
            }
            if pending.due > horizon {
                break;
            }

            self.pending = None;
            if !self.held {
                break;
            }
            if self.enabled {
                self.schedule_cycle(pending.due, self.params, gain);
            } else {
                self.current = None;
                gain.set_value_at_time(1.0, pending.due);
            }
            fired += 1;
        }
        fired
    }

    /// Read-only view of where the envelope is at `now`.
    pub fn phase(&self, now: f64) -> EnvelopePhase {
        match self.current {
            Some(cycle) => cycle.phase_at(now),
            None if self.held => EnvelopePhase {
                state: EnvelopeState::Sustain,
                progress: 0.0,
                level: 1.0,
            },
            None => EnvelopePhase::IDLE,
        }
    }

    pub fn current_cycle(&self) -> Option<EnvelopeCycle> {
        self.current
    }

    /// Clock time of the next self-reschedule, if one is pending.
    pub fn next_due(&self) -> Option<f64> {
        self.pending
            .filter(|p| p.generation == self.generation)
            .map(|p| p.due)
    }
}
