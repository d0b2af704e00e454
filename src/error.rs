use thiserror::Error;

#[derive(Debug, Error)]
pub enum MixerError {
    #[error("Invalid mixer config: {0}")]
    Config(#[from] ConfigError),
    #[error("Frame has {found} channels, mixer was built with {expected}")]
    ChannelCountMismatch { expected: usize, found: usize },
    #[error("Config JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("mixer needs at least one channel")]
    NoChannels,
    #[error("range '{name}' is inverted or not finite ({min}..{max})")]
    InvalidRange { name: &'static str, min: f32, max: f32 },
    #[error("default {default} of '{name}' lies outside {min}..{max}")]
    DefaultOutOfRange {
        name: &'static str,
        default: f32,
        min: f32,
        max: f32,
    },
    #[error("'{name}' must be finite and positive, got {value}")]
    InvalidThreshold { name: &'static str, value: f32 },
}
