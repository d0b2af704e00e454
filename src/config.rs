//! Mixer configuration: channel count, parameter ranges, trigger thresholds.
//!
//! Fixed at construction. Loaded from JSON or taken from `Default`, which
//! matches the stock module layout.

use serde::{Deserialize, Serialize};

use crate::dsp::mixer::MixerInput;
use crate::error::{ConfigError, MixerError};

/// Range and default of a manual control.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParamRange {
    pub min: f32,
    pub max: f32,
    pub default: f32,
}

impl ParamRange {
    pub const fn new(min: f32, max: f32, default: f32) -> Self {
        ParamRange { min, max, default }
    }

    #[inline]
    pub fn clamp(&self, value: f32) -> f32 {
        value.clamp(self.min, self.max)
    }

    fn validate(&self, name: &'static str) -> Result<(), ConfigError> {
        if !self.min.is_finite() || !self.max.is_finite() || self.min > self.max {
            return Err(ConfigError::InvalidRange {
                name,
                min: self.min,
                max: self.max,
            });
        }
        if !(self.min..=self.max).contains(&self.default) {
            return Err(ConfigError::DefaultOutOfRange {
                name,
                default: self.default,
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }
}

/// Switches for the two master-bus behaviours that differ from the channel path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BusCompat {
    /// Right send forwards the left bus sum instead of the right one.
    pub right_send_mirrors_left: bool,
    /// Bus mix CV is added to the mix knob as-is instead of divided by `cv_scale`.
    pub unscaled_bus_mix_cv: bool,
}

impl Default for BusCompat {
    fn default() -> Self {
        BusCompat {
            right_send_mirrors_left: false,
            unscaled_bus_mix_cv: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MixerConfig {
    pub channels: usize,

    pub volume: ParamRange,
    pub pan: ParamRange,
    pub mix: ParamRange,
    pub button: ParamRange,

    pub master_volume: ParamRange,
    pub master_mix: ParamRange,
    pub master_button: ParamRange,

    /// Edge threshold for front-panel buttons.
    pub manual_threshold: f32,
    /// Edge threshold for gate/trigger CV inputs.
    pub cv_threshold: f32,
    /// Volts spanning a full control range; CV is divided by this before
    /// being added to a knob.
    pub cv_scale: f32,

    pub compat: BusCompat,
}

impl Default for MixerConfig {
    fn default() -> Self {
        MixerConfig {
            channels: 6,
            volume: ParamRange::new(0.0, 1.2, 1.0),
            pan: ParamRange::new(0.0, 1.0, 0.5),
            mix: ParamRange::new(0.0, 1.0, 0.0),
            button: ParamRange::new(0.0, 1.0, 0.0),
            master_volume: ParamRange::new(0.0, 1.2, 1.0),
            master_mix: ParamRange::new(0.0, 1.0, 0.0),
            master_button: ParamRange::new(0.0, 1.0, 0.0),
            manual_threshold: 0.5,
            cv_threshold: 1.7,
            cv_scale: 10.0,
            compat: BusCompat::default(),
        }
    }
}

impl MixerConfig {
    pub fn with_channels(channels: usize) -> Self {
        MixerConfig {
            channels,
            ..Default::default()
        }
    }

    /// Parse and validate a JSON config. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, MixerError> {
        let config: MixerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.channels == 0 {
            return Err(ConfigError::NoChannels);
        }
        self.volume.validate("volume")?;
        self.pan.validate("pan")?;
        self.mix.validate("mix")?;
        self.button.validate("button")?;
        self.master_volume.validate("masterVolume")?;
        self.master_mix.validate("masterMix")?;
        self.master_button.validate("masterButton")?;
        for (name, value) in [
            ("manualThreshold", self.manual_threshold),
            ("cvThreshold", self.cv_threshold),
            ("cvScale", self.cv_scale),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::InvalidThreshold { name, value });
            }
        }
        Ok(())
    }

    /// Clamp every manual control of a frame into its configured range.
    ///
    /// CV inputs are left alone; the signal path re-clamps after adding them.
    pub fn clamp_controls(&self, frame: &mut MixerInput) {
        for ch in &mut frame.channels {
            ch.volume = self.volume.clamp(ch.volume);
            ch.pan = self.pan.clamp(ch.pan);
            ch.mix = self.mix.clamp(ch.mix);
            ch.mute_button = self.button.clamp(ch.mute_button);
            ch.solo_button = self.button.clamp(ch.solo_button);
        }
        for side in [&mut frame.master.left, &mut frame.master.right] {
            side.volume = self.master_volume.clamp(side.volume);
            side.mix = self.master_mix.clamp(side.mix);
            side.mute_button = self.master_button.clamp(side.mute_button);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = MixerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.volume.max, 1.2);
        assert_eq!(config.pan.default, 0.5);
        assert_eq!(config.manual_threshold, 0.5);
        assert_eq!(config.cv_threshold, 1.7);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config = MixerConfig::from_json(r#"{ "channels": 2, "cvThreshold": 2.5 }"#).unwrap();
        assert_eq!(config.channels, 2);
        assert_eq!(config.cv_threshold, 2.5);
        assert_eq!(config.manual_threshold, 0.5);
        assert!(config.compat.unscaled_bus_mix_cv);
    }

    #[test]
    fn compat_from_json() {
        let config =
            MixerConfig::from_json(r#"{ "compat": { "rightSendMirrorsLeft": true } }"#).unwrap();
        assert!(config.compat.right_send_mirrors_left);
        assert!(config.compat.unscaled_bus_mix_cv);
    }

    #[test]
    fn rejects_zero_channels() {
        let err = MixerConfig::from_json(r#"{ "channels": 0 }"#).unwrap_err();
        assert!(matches!(err, MixerError::Config(ConfigError::NoChannels)));
    }

    #[test]
    fn rejects_inverted_range() {
        let mut config = MixerConfig::default();
        config.pan = ParamRange::new(1.0, 0.0, 0.5);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidRange { name: "pan", .. })
        ));
    }

    #[test]
    fn rejects_default_outside_range() {
        let mut config = MixerConfig::default();
        config.master_volume = ParamRange::new(0.0, 1.0, 1.2);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DefaultOutOfRange { name: "masterVolume", .. })
        ));
    }

    #[test]
    fn rejects_bad_threshold() {
        let mut config = MixerConfig::default();
        config.cv_threshold = f32::NAN;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidThreshold { name: "cvThreshold", .. })
        ));
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(matches!(
            MixerConfig::from_json("{ channels: "),
            Err(MixerError::Json(_))
        ));
    }

    #[test]
    fn clamp_controls_limits_manual_values() {
        let config = MixerConfig::with_channels(1);
        let mut frame = MixerInput::from_config(&config);
        frame.channels[0].volume = 3.0;
        frame.channels[0].pan = -1.0;
        frame.channels[0].volume_cv = Some(50.0);
        frame.master.right.volume = 2.0;
        config.clamp_controls(&mut frame);
        assert_eq!(frame.channels[0].volume, 1.2);
        assert_eq!(frame.channels[0].pan, 0.0);
        assert_eq!(frame.channels[0].volume_cv, Some(50.0));
        assert_eq!(frame.master.right.volume, 1.2);
    }
}
