use crate::{
    dsp::automation::ParamAutomation,
    graph::node::{GraphNode, RenderCtx},
};

/// Gain stage whose level follows a scheduled automation curve.
///
/// The control side writes envelope programs into [`EnvNode::gain_mut`];
/// rendering multiplies each frame by the curve's value at that frame's
/// clock time, so ramps land on the exact sample they were scheduled for
/// regardless of block boundaries.
pub struct EnvNode {
    gain: ParamAutomation,
    last_level: f32,
}

impl EnvNode {
    pub fn new(initial_gain: f32) -> Self {
        Self {
            gain: ParamAutomation::new(initial_gain),
            last_level: initial_gain,
        }
    }

    pub fn gain(&self) -> &ParamAutomation {
        &self.gain
    }

    pub fn gain_mut(&mut self) -> &mut ParamAutomation {
        &mut self.gain
    }

    /// Level applied to the most recently rendered frame.
    pub fn level(&self) -> f32 {
        self.last_level
    }
}

impl GraphNode for EnvNode {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        for (i, sample) in out.iter_mut().enumerate() {
            let level = self.gain.value_at(ctx.frame_time(i));
            *sample *= level;
            self.last_level = level;
        }
    }

    fn is_active(&self) -> bool {
        self.last_level > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn follows_scheduled_ramp_across_blocks() {
        let mut node = EnvNode::new(0.0);
        node.gain_mut().set_value_at_time(0.0, 0.0);
        node.gain_mut().linear_ramp_to_value_at_time(1.0, 0.1);

        let sample_rate = 1_000.0;
        let mut first = vec![1.0; 50];
        node.render_block(&mut first, &RenderCtx::from_freq(sample_rate, 440.0).at(0.0));
        let mut second = vec![1.0; 50];
        node.render_block(&mut second, &RenderCtx::from_freq(sample_rate, 440.0).at(0.05));

        assert!((first[25] - 0.25).abs() < 1e-4);
        assert!((second[0] - 0.5).abs() < 1e-4);
        assert!((second[49] - 0.99).abs() < 1e-4);
        assert!(node.is_active());
    }

    #[test]
    fn zero_gain_is_inactive() {
        let mut node = EnvNode::new(0.0);
        let mut buffer = vec![1.0; 8];
        node.render_block(&mut buffer, &RenderCtx::from_freq(48_000.0, 440.0));
        assert!(buffer.iter().all(|&s| s == 0.0));
        assert!(!node.is_active());
    }
}
