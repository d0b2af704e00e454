//! Channel strip: mute/solo toggles, send/receive, volume, and pan.

use serde::{Deserialize, Serialize};
use tracing::trace;

use super::solo::SoloState;
use super::toggle::ToggleState;
use crate::config::MixerConfig;

/// One tick of inputs for a channel strip. `None` marks a disconnected jack.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChannelInput {
    pub input: Option<f32>,
    pub receive: Option<f32>,
    /// Something is patched into the send output.
    pub send_connected: bool,

    pub mix: f32,
    pub mix_cv: Option<f32>,
    pub volume: f32,
    pub volume_cv: Option<f32>,
    pub pan: f32,
    pub pan_cv: Option<f32>,

    pub mute_button: f32,
    pub mute_cv: Option<f32>,
    pub solo_button: f32,
    pub solo_cv: Option<f32>,
}

impl Default for ChannelInput {
    fn default() -> Self {
        ChannelInput {
            input: None,
            receive: None,
            send_connected: false,
            mix: 0.0,
            mix_cv: None,
            volume: 1.0,
            volume_cv: None,
            pan: 0.5,
            pan_cv: None,
            mute_button: 0.0,
            mute_cv: None,
            solo_button: 0.0,
            solo_cv: None,
        }
    }
}

impl ChannelInput {
    /// Nothing patched, every knob at its configured default.
    pub fn from_config(config: &MixerConfig) -> Self {
        ChannelInput {
            mix: config.mix.default,
            volume: config.volume.default,
            pan: config.pan.default,
            mute_button: config.button.default,
            solo_button: config.button.default,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelOutput {
    pub left: f32,
    pub right: f32,
    /// Pre-feedback input, present only when the send is patched and the
    /// channel is audible.
    pub send: Option<f32>,
    pub meter_left: f32,
    pub meter_right: f32,
    pub mute_light: f32,
    pub solo_light: f32,
}

/// Knob plus CV, with the CV scaled from volts into control units.
#[inline]
pub(crate) fn modulated(knob: f32, cv: Option<f32>, cv_scale: f32) -> f32 {
    knob + cv.map_or(0.0, |v| v / cv_scale)
}

/// Linear dry/wet blend.
#[inline]
pub(crate) fn crossfade(dry: f32, wet: f32, mix: f32) -> f32 {
    (1.0 - mix) * dry + mix * wet
}

/// Equal-gain pan: 0 is hard left, 0.5 leaves both sides untouched, 1 is hard right.
#[inline]
pub fn pan_split(signal: f32, pan: f32) -> (f32, f32) {
    let mut left = signal;
    let mut right = signal;
    if pan < 0.5 {
        right *= 2.0 * pan;
    }
    if pan > 0.5 {
        left *= 2.0 * (1.0 - pan);
    }
    (left, right)
}

#[derive(Debug, Clone)]
pub struct Channel {
    index: usize,
    mute: ToggleState,
    solo: ToggleState,
    cv_scale: f32,
    meter_left: f32,
    meter_right: f32,
}

impl Channel {
    pub const MAX_VOLUME: f32 = 1.2;

    pub fn new(index: usize, config: &MixerConfig) -> Self {
        Channel {
            index,
            mute: ToggleState::manual_and_cv(config.manual_threshold, config.cv_threshold),
            solo: ToggleState::manual_and_cv(config.manual_threshold, config.cv_threshold),
            cv_scale: config.cv_scale,
            meter_left: 0.0,
            meter_right: 0.0,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_muted(&self) -> bool {
        self.mute.is_active()
    }

    pub fn is_soloed(&self) -> bool {
        self.solo.is_active()
    }

    /// Last absolute output levels, for metering.
    pub fn meter(&self) -> (f32, f32) {
        (self.meter_left, self.meter_right)
    }

    /// First stage of a tick: feed the buttons and CV inputs to the toggles.
    ///
    /// The CV jacks read 0 V when unpatched, so they are always polled.
    pub fn update_toggles(&mut self, input: &ChannelInput) {
        let was_muted = self.mute.is_active();
        let was_soloed = self.solo.is_active();

        self.solo
            .update(&[Some(input.solo_button), Some(input.solo_cv.unwrap_or(0.0))]);
        self.mute
            .update(&[Some(input.mute_button), Some(input.mute_cv.unwrap_or(0.0))]);

        if was_muted != self.mute.is_active() {
            trace!(channel = self.index, muted = self.mute.is_active(), "mute toggled");
        }
        if was_soloed != self.solo.is_active() {
            trace!(channel = self.index, soloed = self.solo.is_active(), "solo toggled");
        }
    }

    /// Is this channel allowed onto the master bus?
    pub fn is_audible(&self, solo: &SoloState) -> bool {
        !self.is_muted() && solo.admits(self.is_soloed())
    }

    /// Run the signal path for one tick. Toggles must already be updated.
    pub fn process(&mut self, input: &ChannelInput, solo: &SoloState) -> ChannelOutput {
        let mut out = ChannelOutput {
            mute_light: self.mute.light(),
            solo_light: self.solo.light(),
            ..Default::default()
        };

        if self.is_audible(solo) {
            let mut signal = input.input.unwrap_or(0.0);

            if input.send_connected {
                out.send = Some(signal);
            }

            if let Some(receive) = input.receive {
                let mix = modulated(input.mix, input.mix_cv, self.cv_scale).clamp(0.0, 1.0);
                signal = crossfade(signal, receive, mix);
            }

            let volume = modulated(input.volume, input.volume_cv, self.cv_scale)
                .clamp(0.0, Self::MAX_VOLUME);
            signal *= volume;

            let pan = modulated(input.pan, input.pan_cv, self.cv_scale).clamp(0.0, 1.0);
            (out.left, out.right) = pan_split(signal, pan);
        }

        self.meter_left = out.left.abs();
        self.meter_right = out.right.abs();
        out.meter_left = self.meter_left;
        out.meter_right = self.meter_right;
        out
    }

    pub fn reset(&mut self) {
        self.mute.reset();
        self.solo.reset();
        self.meter_left = 0.0;
        self.meter_right = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::solo::SoloResolver;

    fn channel() -> Channel {
        Channel::new(0, &MixerConfig::default())
    }

    fn patched(v: f32) -> ChannelInput {
        ChannelInput {
            input: Some(v),
            send_connected: true,
            ..Default::default()
        }
    }

    fn run(ch: &mut Channel, input: &ChannelInput) -> ChannelOutput {
        ch.update_toggles(input);
        let solo = SoloResolver::resolve(std::slice::from_ref(&*ch));
        ch.process(input, &solo)
    }

    #[test]
    fn unity_center_passes_through() {
        let mut ch = channel();
        let out = run(&mut ch, &patched(5.0));
        assert_eq!((out.left, out.right), (5.0, 5.0));
        assert_eq!(out.send, Some(5.0));
        assert_eq!(ch.meter(), (5.0, 5.0));
    }

    #[test]
    fn disconnected_input_reads_zero() {
        let mut ch = channel();
        let out = run(&mut ch, &ChannelInput::default());
        assert_eq!((out.left, out.right), (0.0, 0.0));
        assert_eq!(out.send, None, "send not patched");
    }

    #[test]
    fn pan_law_is_equal_gain() {
        assert_eq!(pan_split(4.0, 0.0), (4.0, 0.0));
        assert_eq!(pan_split(4.0, 1.0), (0.0, 4.0));
        assert_eq!(pan_split(4.0, 0.5), (4.0, 4.0));
        assert_eq!(pan_split(4.0, 0.25), (4.0, 2.0));
        assert_eq!(pan_split(4.0, 0.75), (2.0, 4.0));
    }

    #[test]
    fn pan_cv_is_scaled_and_clamped() {
        let mut ch = channel();
        let input = ChannelInput {
            pan_cv: Some(10.0),
            ..patched(2.0)
        };
        let out = run(&mut ch, &input);
        assert_eq!((out.left, out.right), (0.0, 2.0));
    }

    #[test]
    fn volume_clamps_to_headroom() {
        let mut ch = channel();
        let hot = ChannelInput {
            volume: 1.0,
            volume_cv: Some(5.0),
            ..patched(1.0)
        };
        let out = run(&mut ch, &hot);
        assert!((out.left - 1.2).abs() < 1e-6);

        let negative = ChannelInput {
            volume: 0.2,
            volume_cv: Some(-10.0),
            ..patched(1.0)
        };
        let out = run(&mut ch, &negative);
        assert_eq!((out.left, out.right), (0.0, 0.0));
    }

    #[test]
    fn receive_crossfades_after_send() {
        let mut ch = channel();
        let input = ChannelInput {
            receive: Some(2.0),
            mix: 0.25,
            mix_cv: Some(2.5),
            ..patched(6.0)
        };
        let out = run(&mut ch, &input);
        // mix = 0.25 + 0.25 = 0.5
        assert_eq!(out.send, Some(6.0));
        assert!((out.left - 4.0).abs() < 1e-6);
        assert!((out.right - 4.0).abs() < 1e-6);
    }

    #[test]
    fn send_equals_input_when_mix_is_zero() {
        let mut ch = channel();
        for v in [-3.0, 0.0, 1.5, 7.25] {
            let input = ChannelInput {
                volume: 0.3,
                pan: 0.9,
                ..patched(v)
            };
            let out = run(&mut ch, &input);
            assert_eq!(out.send, Some(v));
        }
    }

    #[test]
    fn muted_channel_is_silent_and_does_not_send() {
        let mut ch = channel();
        let press = ChannelInput {
            mute_button: 1.0,
            receive: Some(3.0),
            ..patched(5.0)
        };
        let out = run(&mut ch, &press);
        assert!(ch.is_muted());
        assert_eq!((out.left, out.right), (0.0, 0.0));
        assert_eq!(out.send, None);
        assert_eq!(out.mute_light, 1.0);
        assert_eq!(ch.meter(), (0.0, 0.0));
    }

    #[test]
    fn mute_cv_toggles() {
        let mut ch = channel();
        run(&mut ch, &ChannelInput { mute_cv: Some(5.0), ..patched(1.0) });
        assert!(ch.is_muted());
        run(&mut ch, &ChannelInput { mute_cv: Some(0.0), ..patched(1.0) });
        assert!(ch.is_muted());
        run(&mut ch, &ChannelInput { mute_cv: Some(5.0), ..patched(1.0) });
        assert!(!ch.is_muted());
    }

    #[test]
    fn negative_signal_meters_absolute() {
        let mut ch = channel();
        let out = run(&mut ch, &ChannelInput { pan: 0.25, ..patched(-4.0) });
        assert_eq!((out.left, out.right), (-4.0, -2.0));
        assert_eq!((out.meter_left, out.meter_right), (4.0, 2.0));
    }
}
