#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dsp::envelope::EnvelopeParams;
use crate::dsp::filter::BUTTERWORTH_Q;
use crate::dsp::wavetable::Preset;
use crate::graph::filter::{Band, Slope};

/// Lowest and highest master level, in dB.
pub const MASTER_DB_RANGE: (f32, f32) = (-60.0, 6.0);

/// Settings for one filter band.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandSettings {
    pub enabled: bool,
    pub cutoff_hz: f32,
    pub q: f32,
    pub slope: Slope,
}

impl BandSettings {
    pub fn lowpass() -> Self {
        Self {
            enabled: false,
            cutoff_hz: 20_000.0,
            q: BUTTERWORTH_Q,
            slope: Slope::Db12,
        }
    }

    pub fn highpass() -> Self {
        Self {
            enabled: false,
            cutoff_hz: 20.0,
            q: BUTTERWORTH_Q,
            slope: Slope::Db12,
        }
    }
}

/// Everything the user can set on the instrument, as one value.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Patch {
    pub name: String,
    pub preset: Preset,
    pub envelope: EnvelopeParams,
    pub envelope_enabled: bool,
    pub lowpass: BandSettings,
    pub highpass: BandSettings,
    pub master_db: f32,
}

impl Default for Patch {
    fn default() -> Self {
        Self {
            name: "init".to_string(),
            preset: Preset::Sine,
            envelope: EnvelopeParams::default(),
            envelope_enabled: true,
            lowpass: BandSettings::lowpass(),
            highpass: BandSettings::highpass(),
            master_db: 0.0,
        }
    }
}

impl Patch {
    pub fn band(&self, band: Band) -> &BandSettings {
        match band {
            Band::LowPass => &self.lowpass,
            Band::HighPass => &self.highpass,
        }
    }

    pub fn band_mut(&mut self, band: Band) -> &mut BandSettings {
        match band {
            Band::LowPass => &mut self.lowpass,
            Band::HighPass => &mut self.highpass,
        }
    }
}

pub fn clamp_master_db(db: f32) -> f32 {
    let (min, max) = MASTER_DB_RANGE;
    if db.is_nan() {
        return 0.0;
    }
    db.clamp(min, max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_patch_is_transparent() {
        let patch = Patch::default();
        assert!(patch.envelope_enabled);
        assert!(!patch.band(Band::LowPass).enabled);
        assert!(!patch.band(Band::HighPass).enabled);
        assert_eq!(patch.master_db, 0.0);
    }

    #[test]
    fn master_level_is_clamped() {
        assert_eq!(clamp_master_db(-100.0), -60.0);
        assert_eq!(clamp_master_db(12.0), 6.0);
        assert_eq!(clamp_master_db(-3.0), -3.0);
        assert_eq!(clamp_master_db(f32::NAN), 0.0);
    }
}
