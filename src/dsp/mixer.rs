//! Mixer: runs one tick over every channel strip and the master bus.
//!
//! Each tick is split into fixed stages:
//! 1. every channel's mute/solo toggles take their button and CV samples,
//! 2. the solo pass looks at all channels at once,
//! 3. every channel runs its signal path and admitted channels are summed,
//! 4. the master bus processes the left sum, then the right sum.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::channel::{Channel, ChannelInput, ChannelOutput};
use super::master::{MasterBus, MasterInput, MasterOutput, Side};
use super::solo::SoloResolver;
use crate::config::MixerConfig;
use crate::error::MixerError;

/// Everything the host supplies for one tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MixerInput {
    pub channels: Vec<ChannelInput>,
    pub master: MasterInput,
}

impl MixerInput {
    /// An idle frame: nothing patched, every knob at its configured default.
    pub fn from_config(config: &MixerConfig) -> Self {
        MixerInput {
            channels: vec![ChannelInput::from_config(config); config.channels],
            master: MasterInput::from_config(config),
        }
    }
}

/// Everything the mixer produces for one tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MixerOutput {
    pub channels: Vec<ChannelOutput>,
    pub master: MasterOutput,
}

impl MixerOutput {
    /// The final stereo pair.
    pub fn stereo(&self) -> (f32, f32) {
        (self.master.left.out, self.master.right.out)
    }
}

#[derive(Debug, Clone)]
pub struct MixerCv {
    config: MixerConfig,
    channels: Vec<Channel>,
    master: MasterBus,
}

impl MixerCv {
    pub fn new(config: MixerConfig) -> Result<Self, MixerError> {
        config.validate()?;
        let channels = (0..config.channels)
            .map(|i| Channel::new(i, &config))
            .collect();
        let master = MasterBus::new(&config);
        debug!(
            channels = config.channels,
            manual_threshold = config.manual_threshold,
            cv_threshold = config.cv_threshold,
            "mixer created"
        );
        Ok(MixerCv {
            config,
            channels,
            master,
        })
    }

    pub fn config(&self) -> &MixerConfig {
        &self.config
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn is_muted(&self, channel: usize) -> bool {
        self.channels.get(channel).is_some_and(Channel::is_muted)
    }

    pub fn is_soloed(&self, channel: usize) -> bool {
        self.channels.get(channel).is_some_and(Channel::is_soloed)
    }

    /// Master mute state as `(left, right)`.
    pub fn master_muted(&self) -> (bool, bool) {
        (
            self.master.side(Side::Left).is_muted(),
            self.master.side(Side::Right).is_muted(),
        )
    }

    /// Run one tick, allocating a fresh output record.
    pub fn process(&mut self, input: &MixerInput) -> Result<MixerOutput, MixerError> {
        let mut output = MixerOutput::default();
        self.process_into(input, &mut output)?;
        Ok(output)
    }

    /// Run one tick into a reusable output record.
    ///
    /// A frame with the wrong number of channels is rejected before any
    /// state is touched.
    pub fn process_into(
        &mut self,
        input: &MixerInput,
        output: &mut MixerOutput,
    ) -> Result<(), MixerError> {
        if input.channels.len() != self.channels.len() {
            warn!(
                expected = self.channels.len(),
                found = input.channels.len(),
                "rejected mixer frame"
            );
            return Err(MixerError::ChannelCountMismatch {
                expected: self.channels.len(),
                found: input.channels.len(),
            });
        }

        for (channel, ch_in) in self.channels.iter_mut().zip(&input.channels) {
            channel.update_toggles(ch_in);
        }

        let solo = SoloResolver::resolve(&self.channels);

        output
            .channels
            .resize(self.channels.len(), ChannelOutput::default());
        let mut sum_left = 0.0;
        let mut sum_right = 0.0;
        for ((channel, ch_in), ch_out) in self
            .channels
            .iter_mut()
            .zip(&input.channels)
            .zip(output.channels.iter_mut())
        {
            *ch_out = channel.process(ch_in, &solo);
            if channel.is_audible(&solo) {
                sum_left += ch_out.left;
                sum_right += ch_out.right;
            }
        }

        output.master = self.master.process(sum_left, sum_right, &input.master);
        Ok(())
    }

    /// Clear all toggles and meters, as on a fresh module.
    pub fn reset(&mut self) {
        for channel in &mut self.channels {
            channel.reset();
        }
        self.master.reset();
        debug!(channels = self.channels.len(), "mixer reset");
    }
}
