use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use rtrb::{Consumer, Producer, RingBuffer};
use tracing::{error, info, warn};

use crate::{
    error::{Error, Result},
    synth::mono::{MonoSynth, VoiceSnapshot},
    MAX_BLOCK_SIZE,
};

/// Snapshots kept for the display between redraws.
const SNAPSHOT_RING: usize = 64;

/// Audio-thread end of the display taps. Pushes never block; anything that
/// does not fit is dropped.
pub struct ScopeTap {
    samples: Producer<f32>,
    snapshots: Producer<VoiceSnapshot>,
}

/// UI-thread end of the display taps.
pub struct ScopeReceiver {
    pub samples: Consumer<f32>,
    pub snapshots: Consumer<VoiceSnapshot>,
}

pub fn scope(sample_capacity: usize) -> (ScopeTap, ScopeReceiver) {
    let (sample_tx, sample_rx) = RingBuffer::new(sample_capacity.max(1));
    let (snapshot_tx, snapshot_rx) = RingBuffer::new(SNAPSHOT_RING);
    (
        ScopeTap {
            samples: sample_tx,
            snapshots: snapshot_tx,
        },
        ScopeReceiver {
            samples: sample_rx,
            snapshots: snapshot_rx,
        },
    )
}

impl ScopeTap {
    fn push_block(&mut self, block: &[f32]) {
        for &s in block {
            if self.samples.push(s).is_err() {
                break;
            }
        }
    }

    fn push_snapshot(&mut self, snapshot: VoiceSnapshot) {
        let _ = self.snapshots.push(snapshot);
    }
}

/// Render one device buffer: mono blocks duplicated to every channel.
pub fn render_interleaved(
    synth: &mut MonoSynth,
    scratch: &mut [f32],
    data: &mut [f32],
    channels: usize,
    mut tap: Option<&mut ScopeTap>,
) {
    if scratch.is_empty() {
        data.fill(0.0);
        return;
    }
    let channels = channels.max(1);
    let total_frames = data.len() / channels;
    let block_len = scratch.len().min(MAX_BLOCK_SIZE);
    let mut frames_written = 0;

    while frames_written < total_frames {
        let frames_to_render = (total_frames - frames_written).min(block_len);
        let block = &mut scratch[..frames_to_render];
        synth.render_block(block);

        let out_off = frames_written * channels;
        for (i, &s) in block.iter().enumerate() {
            for ch in 0..channels {
                data[out_off + i * channels + ch] = s;
            }
        }

        if let Some(tap) = tap.as_deref_mut() {
            tap.push_block(block);
        }
        frames_written += frames_to_render;
    }

    if let Some(tap) = tap {
        tap.push_snapshot(synth.snapshot());
    }
}

/// The platform's default output, with a usable f32 configuration.
pub struct OutputDevice {
    device: cpal::Device,
    config: cpal::SupportedStreamConfig,
}

impl OutputDevice {
    /// Acquire the default device. Fails if there is none, or if it does not
    /// take f32 samples; nothing can be played until that is resolved.
    pub fn open_default() -> Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| Error::UnsupportedOutput("no default output device".into()))?;
        let config = device
            .default_output_config()
            .map_err(|e| Error::UnsupportedOutput(e.to_string()))?;

        if config.sample_format() != cpal::SampleFormat::F32 {
            return Err(Error::UnsupportedOutput(format!(
                "device wants {:?} samples, only f32 is supported",
                config.sample_format()
            )));
        }

        let output = Self { device, config };
        info!(
            device = %output.name(),
            sample_rate = output.sample_rate(),
            channels = output.channels(),
            "opened audio output"
        );
        Ok(output)
    }

    pub fn name(&self) -> String {
        self.device.name().unwrap_or_else(|_| "unknown".to_string())
    }

    pub fn sample_rate(&self) -> f32 {
        self.config.sample_rate().0 as f32
    }

    pub fn channels(&self) -> usize {
        self.config.channels() as usize
    }

    /// Build the stream around `synth`, paused. Call
    /// [`RunningOutput::resume`] to make it audible.
    pub fn start(
        &self,
        mut synth: MonoSynth,
        mut tap: Option<ScopeTap>,
    ) -> Result<RunningOutput> {
        let channels = self.channels();
        let mut render_buf = vec![0.0f32; MAX_BLOCK_SIZE];

        let stream = self
            .device
            .build_output_stream(
                &self.config.config(),
                move |data: &mut [f32], _| {
                    render_interleaved(&mut synth, &mut render_buf, data, channels, tap.as_mut());
                },
                |err| error!("audio stream error: {err}"),
                None,
            )
            .map_err(|e| Error::Stream(e.to_string()))?;

        // Some backends start streams as soon as they are built
        if let Err(err) = stream.pause() {
            warn!("could not pause new stream: {err}");
        }

        Ok(RunningOutput {
            stream,
            active: false,
        })
    }
}

/// A built output stream. Dropping it stops audio.
pub struct RunningOutput {
    stream: cpal::Stream,
    active: bool,
}

impl RunningOutput {
    /// Start audio. Calling it again is a no-op.
    pub fn resume(&mut self) -> Result<()> {
        if self.active {
            return Ok(());
        }
        self.stream.play().map_err(|e| Error::Stream(e.to_string()))?;
        self.active = true;
        info!("audio output resumed");
        Ok(())
    }

    pub fn pause(&mut self) -> Result<()> {
        if !self.active {
            return Ok(());
        }
        self.stream.pause().map_err(|e| Error::Stream(e.to_string()))?;
        self.active = false;
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}
