use thiserror::Error;

#[derive(Debug, Error)]
pub enum DriftError {
    #[error("invalid settings: {0}")]
    Config(#[from] config::ConfigError),
    #[error(transparent)]
    Audio(#[from] AudioError),
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum AudioError {
    #[error("audio device unavailable: {0}")]
    Device(String),
    #[error("could not start playback: {0}")]
    Playback(String),
}
