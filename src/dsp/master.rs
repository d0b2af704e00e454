//! Master bus: per-side mute, send/receive, and output volume.
//!
//! Left and right are fully independent: each has its own mute toggle
//! (fader button plus CV), its own send/receive loop and its own volume.
//! The left side always runs first.

use serde::{Deserialize, Serialize};
use tracing::trace;

use super::channel::{crossfade, modulated};
use super::toggle::ToggleState;
use crate::config::MixerConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BusSideInput {
    pub volume: f32,
    pub mute_button: f32,
    pub mute_cv: Option<f32>,
    pub mix: f32,
    pub mix_cv: Option<f32>,
    pub receive: Option<f32>,
    pub send_connected: bool,
}

impl Default for BusSideInput {
    fn default() -> Self {
        BusSideInput {
            volume: 1.0,
            mute_button: 0.0,
            mute_cv: None,
            mix: 0.0,
            mix_cv: None,
            receive: None,
            send_connected: false,
        }
    }
}

impl BusSideInput {
    pub fn from_config(config: &MixerConfig) -> Self {
        BusSideInput {
            volume: config.master_volume.default,
            mute_button: config.master_button.default,
            mix: config.master_mix.default,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MasterInput {
    pub left: BusSideInput,
    pub right: BusSideInput,
}

impl MasterInput {
    pub fn from_config(config: &MixerConfig) -> Self {
        let side = BusSideInput::from_config(config);
        MasterInput {
            left: side,
            right: side,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusSideOutput {
    /// Final output voltage for this side.
    pub out: f32,
    pub send: Option<f32>,
    pub meter: f32,
    pub mute_light: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasterOutput {
    pub left: BusSideOutput,
    pub right: BusSideOutput,
}

#[derive(Debug, Clone)]
pub struct BusSide {
    side: Side,
    mute: ToggleState,
    mix_cv_scale: f32,
    meter: f32,
}

impl BusSide {
    pub fn new(side: Side, config: &MixerConfig) -> Self {
        BusSide {
            side,
            mute: ToggleState::manual_and_cv(config.manual_threshold, config.cv_threshold),
            mix_cv_scale: if config.compat.unscaled_bus_mix_cv {
                1.0
            } else {
                config.cv_scale
            },
            meter: 0.0,
        }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn is_muted(&self) -> bool {
        self.mute.is_active()
    }

    pub fn meter(&self) -> f32 {
        self.meter
    }

    /// Process the summed channel signal for this side.
    ///
    /// `send_value` is what goes out of the send jack; normally the
    /// pre-feedback `sum` itself.
    pub fn process(&mut self, sum: f32, send_value: f32, input: &BusSideInput) -> BusSideOutput {
        let was_muted = self.mute.is_active();
        // The fader button is always polled, the CV only while patched.
        self.mute.update(&[Some(input.mute_button), input.mute_cv]);
        if was_muted != self.mute.is_active() {
            trace!(side = ?self.side, muted = self.mute.is_active(), "master mute toggled");
        }

        let mut out = BusSideOutput {
            mute_light: self.mute.light(),
            ..Default::default()
        };

        if !self.mute.is_active() {
            let mut signal = sum;
            if input.send_connected {
                out.send = Some(send_value);
            }
            if let Some(receive) = input.receive {
                let mix = modulated(input.mix, input.mix_cv, self.mix_cv_scale).clamp(0.0, 1.0);
                signal = crossfade(signal, receive, mix);
            }
            out.out = signal * input.volume;
        }

        self.meter = out.out.abs();
        out.meter = self.meter;
        out
    }

    pub fn reset(&mut self) {
        self.mute.reset();
        self.meter = 0.0;
    }
}

#[derive(Debug, Clone)]
pub struct MasterBus {
    left: BusSide,
    right: BusSide,
    right_send_mirrors_left: bool,
}

impl MasterBus {
    pub fn new(config: &MixerConfig) -> Self {
        MasterBus {
            left: BusSide::new(Side::Left, config),
            right: BusSide::new(Side::Right, config),
            right_send_mirrors_left: config.compat.right_send_mirrors_left,
        }
    }

    pub fn side(&self, side: Side) -> &BusSide {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    /// Left side first, then right.
    pub fn process(&mut self, sum_left: f32, sum_right: f32, input: &MasterInput) -> MasterOutput {
        let left = self.left.process(sum_left, sum_left, &input.left);
        let right_send = if self.right_send_mirrors_left {
            left.out
        } else {
            sum_right
        };
        let right = self.right.process(sum_right, right_send, &input.right);
        MasterOutput { left, right }
    }

    pub fn reset(&mut self) {
        self.left.reset();
        self.right.reset();
    }
}
