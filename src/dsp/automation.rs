/*
Parameter Automation
====================

An automation curve is a list of time-stamped events that together describe
a parameter's value at any absolute time on the audio clock. The control side
schedules events ahead of time; the renderer only ever reads `value_at(t)`.

Two kinds of event:

  SetValue { time, value }   jump to `value` at `time`
  Ramp     { time, value }   arrive at `value` at `time`, moving linearly
                             from the previous event's (time, value)

Evaluation at time t:

  value
    1.0 ┤        ●
        │       ╱ ╲
    0.5 ┤      ╱   ●───────●
        │     ╱             ╲
    0.0 ┼────●               ●──────
        │   Set  Ramp  Ramp Ramp  Ramp   (events)
        └──────────────────────────→ t

  - before the first event the default value holds
  - after the last event its value holds
  - between two events the later one decides: a Ramp interpolates, a
    SetValue keeps the earlier value until its own time arrives

Zero-length ramps are instantaneous steps, which is exactly the click the
envelope's minimum stage time exists to prevent.

Events are kept sorted by time. Inserting at an equal time goes after the
existing events so a ramp ending at t followed by a set at t reads as the
set from t onward.
*/

/// Number of events stored without reallocating.
pub const EVENT_CAPACITY: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AutomationEvent {
    SetValue { time: f64, value: f32 },
    Ramp { time: f64, value: f32 },
}

impl AutomationEvent {
    pub fn time(&self) -> f64 {
        match *self {
            AutomationEvent::SetValue { time, .. } | AutomationEvent::Ramp { time, .. } => time,
        }
    }

    pub fn value(&self) -> f32 {
        match *self {
            AutomationEvent::SetValue { value, .. } | AutomationEvent::Ramp { value, .. } => value,
        }
    }
}

/// A scheduled curve for one parameter.
#[derive(Debug, Clone)]
pub struct ParamAutomation {
    default_value: f32,
    events: Vec<AutomationEvent>,
}

impl ParamAutomation {
    pub fn new(default_value: f32) -> Self {
        Self {
            default_value,
            events: Vec::with_capacity(EVENT_CAPACITY),
        }
    }

    pub fn events(&self) -> &[AutomationEvent] {
        &self.events
    }

    pub fn set_value_at_time(&mut self, value: f32, time: f64) {
        self.insert(AutomationEvent::SetValue { time, value });
    }

    pub fn linear_ramp_to_value_at_time(&mut self, value: f32, time: f64) {
        self.insert(AutomationEvent::Ramp { time, value });
    }

    /// Drop every event scheduled at or after `time`.
    pub fn cancel_scheduled_values(&mut self, time: f64) {
        let keep = self.events.partition_point(|e| e.time() < time);
        self.events.truncate(keep);
    }

    /// Freeze the curve at whatever value it has at `time`, dropping the rest.
    pub fn cancel_and_hold(&mut self, time: f64) {
        let held = self.value_at(time);
        self.cancel_scheduled_values(time);
        self.set_value_at_time(held, time);
    }

    /// Forget events that can no longer affect values at or after `time`.
    ///
    /// The last event at or before `time` is kept since it anchors both a
    /// held value and the start of any following ramp.
    pub fn prune_before(&mut self, time: f64) {
        let upto = self.events.partition_point(|e| e.time() <= time);
        if upto > 1 {
            self.events.drain(..upto - 1);
        }
    }

    pub fn value_at(&self, time: f64) -> f32 {
        let next = self.events.partition_point(|e| e.time() <= time);

        let Some(after) = self.events.get(next) else {
            return self
                .events
                .last()
                .map_or(self.default_value, AutomationEvent::value);
        };

        let (start_time, start_value) = match next.checked_sub(1) {
            Some(prev) => (self.events[prev].time(), self.events[prev].value()),
            None => (f64::NEG_INFINITY, self.default_value),
        };

        match *after {
            AutomationEvent::SetValue { .. } => start_value,
            AutomationEvent::Ramp { time: end, value } => {
                if !start_time.is_finite() || end <= start_time {
                    return start_value;
                }
                let t = ((time - start_time) / (end - start_time)) as f32;
                start_value + (value - start_value) * t
            }
        }
    }

    fn insert(&mut self, event: AutomationEvent) {
        let index = self.events.partition_point(|e| e.time() <= event.time());
        self.events.insert(index, event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn default_holds_without_events() {
        let param = ParamAutomation::new(0.25);
        assert_eq!(param.value_at(10.0), 0.25);
    }

    #[test]
    fn ramp_interpolates_from_previous_event() {
        let mut param = ParamAutomation::new(0.0);
        param.set_value_at_time(0.0, 1.0);
        param.linear_ramp_to_value_at_time(1.0, 2.0);

        assert_eq!(param.value_at(0.5), 0.0);
        assert_abs_diff_eq!(param.value_at(1.25), 0.25, epsilon = 1e-6);
        assert_abs_diff_eq!(param.value_at(1.5), 0.5, epsilon = 1e-6);
        assert_eq!(param.value_at(2.0), 1.0);
        assert_eq!(param.value_at(5.0), 1.0);
    }

    #[test]
    fn set_value_steps_at_its_time() {
        let mut param = ParamAutomation::new(0.0);
        param.set_value_at_time(0.5, 1.0);
        param.set_value_at_time(0.8, 2.0);

        assert_eq!(param.value_at(1.9), 0.5);
        assert_eq!(param.value_at(2.0), 0.8);
    }

    #[test]
    fn cancel_drops_future_events() {
        let mut param = ParamAutomation::new(0.0);
        param.set_value_at_time(0.0, 0.0);
        param.linear_ramp_to_value_at_time(1.0, 1.0);
        param.linear_ramp_to_value_at_time(0.0, 2.0);

        param.cancel_scheduled_values(1.0);
        assert_eq!(param.events().len(), 1);
        assert_eq!(param.value_at(1.5), 0.0);
    }

    #[test]
    fn cancel_and_hold_freezes_mid_ramp() {
        let mut param = ParamAutomation::new(0.0);
        param.set_value_at_time(0.0, 0.0);
        param.linear_ramp_to_value_at_time(1.0, 1.0);

        param.cancel_and_hold(0.5);
        assert_abs_diff_eq!(param.value_at(0.5), 0.5, epsilon = 1e-6);
        assert_abs_diff_eq!(param.value_at(3.0), 0.5, epsilon = 1e-6);
    }

    #[test]
    fn prune_keeps_anchor_for_running_ramp() {
        let mut param = ParamAutomation::new(0.0);
        param.set_value_at_time(0.0, 0.0);
        param.linear_ramp_to_value_at_time(1.0, 1.0);
        param.linear_ramp_to_value_at_time(0.0, 3.0);

        let before = param.value_at(2.0);
        param.prune_before(2.0);
        assert_eq!(param.events().len(), 2);
        assert_abs_diff_eq!(param.value_at(2.0), before, epsilon = 1e-6);
    }

    #[test]
    fn set_at_ramp_end_takes_over() {
        let mut param = ParamAutomation::new(0.0);
        param.set_value_at_time(1.0, 0.0);
        param.linear_ramp_to_value_at_time(0.0, 1.0);
        param.set_value_at_time(0.0, 1.0);
        param.linear_ramp_to_value_at_time(1.0, 2.0);

        assert_eq!(param.value_at(1.0), 0.0);
        assert_abs_diff_eq!(param.value_at(1.5), 0.5, epsilon = 1e-6);
    }
}
