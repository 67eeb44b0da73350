use std::sync::Arc;

use rtrb::{Consumer, Producer, RingBuffer};
use tracing::{debug, warn};

use crate::{
    dsp::{
        envelope::EnvelopeParams,
        wavetable::{WaveSource, Wavetable, WavetableBuilder},
    },
    error::{Error, Result},
    graph::filter::{Band, Slope},
    patch::Patch,
    synth::message::{NoteId, SynthMessage},
};

/// Control-side handle to a [`crate::MonoSynth`].
///
/// Owns the producer end of the message queue. Every table sent to the
/// renderer is also kept here until the renderer lets go of it, so the last
/// reference to a table is always dropped on the control thread.
pub struct Controller {
    tx: Producer<SynthMessage>,
    builder: WavetableBuilder,
    tables: Vec<Arc<Wavetable>>,
}

/// Create a controller and the consumer to hand to the synth.
pub fn channel(
    capacity: usize,
    builder: WavetableBuilder,
) -> (Controller, Consumer<SynthMessage>) {
    let (tx, rx) = RingBuffer::new(capacity.max(1));
    let controller = Controller {
        tx,
        builder,
        tables: Vec::new(),
    };
    (controller, rx)
}

impl Controller {
    pub fn send(&mut self, msg: SynthMessage) -> Result<()> {
        self.tx.push(msg).map_err(|_| {
            warn!("control queue full, message dropped");
            Error::QueueFull
        })
    }

    pub fn note_on(&mut self, id: NoteId, pitch_hz: f32) -> Result<()> {
        self.send(SynthMessage::NoteOn { id, pitch_hz })
    }

    pub fn note_off(&mut self, id: NoteId) -> Result<()> {
        self.send(SynthMessage::NoteOff { id })
    }

    pub fn all_notes_off(&mut self) -> Result<()> {
        self.send(SynthMessage::AllNotesOff)
    }

    /// Build a table from `source` and send it. Returns the shared table.
    pub fn load(&mut self, source: WaveSource<'_>) -> Result<Arc<Wavetable>> {
        let table = Arc::new(self.builder.build(source));
        debug!(len = table.len(), peak = table.peak(), "built wavetable");
        self.set_wavetable(Arc::clone(&table))?;
        Ok(table)
    }

    pub fn set_wavetable(&mut self, table: Arc<Wavetable>) -> Result<()> {
        self.collect_tables();
        self.tables.push(Arc::clone(&table));
        self.send(SynthMessage::SetWavetable(table))
    }

    pub fn set_envelope(&mut self, params: EnvelopeParams) -> Result<()> {
        self.send(SynthMessage::SetEnvelope(params))
    }

    pub fn set_envelope_enabled(&mut self, enabled: bool) -> Result<()> {
        self.send(SynthMessage::SetEnvelopeEnabled(enabled))
    }

    pub fn set_filter(&mut self, band: Band, cutoff_hz: f32, q: f32) -> Result<()> {
        self.send(SynthMessage::SetFilter {
            band,
            cutoff_hz,
            q,
        })
    }

    pub fn set_slope(&mut self, band: Band, slope: Slope) -> Result<()> {
        self.send(SynthMessage::SetSlope { band, slope })
    }

    pub fn set_band_enabled(&mut self, band: Band, enabled: bool) -> Result<()> {
        self.send(SynthMessage::SetBandEnabled { band, enabled })
    }

    pub fn set_master_db(&mut self, db: f32) -> Result<()> {
        self.send(SynthMessage::SetMasterDb(db))
    }

    /// Send every setting of `patch`, without touching the table.
    pub fn apply_patch(&mut self, patch: &Patch) -> Result<()> {
        self.set_envelope(patch.envelope)?;
        self.set_envelope_enabled(patch.envelope_enabled)?;
        for band in [Band::LowPass, Band::HighPass] {
            let settings = patch.band(band);
            self.set_slope(band, settings.slope)?;
            self.set_filter(band, settings.cutoff_hz, settings.q)?;
            self.set_band_enabled(band, settings.enabled)?;
        }
        self.set_master_db(patch.master_db)
    }

    pub fn builder(&self) -> &WavetableBuilder {
        &self.builder
    }

    /// Tables still referenced by the renderer or by an unread message.
    pub fn live_tables(&self) -> usize {
        self.tables.len()
    }

    /// Drop tables nobody else holds any more.
    pub fn collect_tables(&mut self) {
        self.tables.retain(|t| Arc::strong_count(t) > 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::wavetable::Preset;
    use crate::synth::message::MessageReceiver;

    #[test]
    fn full_queue_reports_error() {
        let (mut controller, _rx) = channel(2, WavetableBuilder::new(64, 4));
        controller.note_on(NoteId::Midi(60), 261.63).unwrap();
        controller.note_off(NoteId::Midi(60)).unwrap();
        assert!(matches!(controller.all_notes_off(), Err(Error::QueueFull)));
    }

    #[test]
    fn messages_arrive_in_order() {
        let (mut controller, mut rx) = channel(8, WavetableBuilder::new(64, 4));
        controller.note_on(NoteId::Virtual(1), 220.0).unwrap();
        controller.note_off(NoteId::Virtual(1)).unwrap();

        assert!(matches!(
            MessageReceiver::pop(&mut rx),
            Some(SynthMessage::NoteOn { id: NoteId::Virtual(1), .. })
        ));
        assert!(matches!(
            MessageReceiver::pop(&mut rx),
            Some(SynthMessage::NoteOff { id: NoteId::Virtual(1) })
        ));
        assert!(MessageReceiver::pop(&mut rx).is_none());
    }

    #[test]
    fn tables_are_released_on_control_side() {
        let (mut controller, mut rx) = channel(8, WavetableBuilder::new(64, 4));
        controller.load(WaveSource::Preset(Preset::Sine)).unwrap();
        assert_eq!(controller.live_tables(), 1);

        // Renderer picks the table up, then replaces it
        let first = match MessageReceiver::pop(&mut rx) {
            Some(SynthMessage::SetWavetable(table)) => table,
            other => panic!("unexpected {other:?}"),
        };
        controller.load(WaveSource::Preset(Preset::Square)).unwrap();
        assert_eq!(controller.live_tables(), 2);

        drop(first);
        controller.collect_tables();
        assert_eq!(controller.live_tables(), 1);
    }
}
