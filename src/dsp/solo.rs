//! Solo resolution across all channels.

use super::channel::Channel;

/// Result of the solo pass for one tick.
///
/// Only [`SoloResolver::resolve`] builds one, so a channel cannot be mixed
/// before every channel's solo toggle has been read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SoloState {
    any_solo: bool,
}

impl SoloState {
    pub fn any_solo(&self) -> bool {
        self.any_solo
    }

    /// With no solo anywhere every channel is admitted, otherwise only soloed ones.
    #[inline]
    pub fn admits(&self, soloed: bool) -> bool {
        !self.any_solo || soloed
    }
}

pub struct SoloResolver;

impl SoloResolver {
    pub fn resolve(channels: &[Channel]) -> SoloState {
        SoloState {
            any_solo: channels.iter().any(Channel::is_soloed),
        }
    }
}
