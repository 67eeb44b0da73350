/// Sample-accurate audio clock.
///
/// Time is derived from the number of frames rendered, never from wall-clock
/// reads, so anything scheduled against it stays locked to the output stream.
#[derive(Debug, Clone)]
pub struct AudioClock {
    frames: u64,
    sample_rate: f64,
}

impl AudioClock {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            frames: 0,
            sample_rate: sample_rate as f64,
        }
    }

    /// Seconds since the clock started.
    pub fn now(&self) -> f64 {
        self.frames as f64 / self.sample_rate
    }

    /// Clock time just after `frames` more frames have been rendered.
    pub fn time_after(&self, frames: usize) -> f64 {
        (self.frames + frames as u64) as f64 / self.sample_rate
    }

    /// Whole frames to render before the clock reaches `time`.
    pub fn frames_until(&self, time: f64) -> usize {
        let frames = ((time - self.now()) * self.sample_rate).ceil();
        if frames > 0.0 {
            frames as usize
        } else {
            0
        }
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn advance(&mut self, frames: usize) {
        self.frames += frames as u64;
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate as f32
    }
}
