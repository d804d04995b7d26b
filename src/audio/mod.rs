//! Audio collaborators: dyad synthesis, device output, exclusive playback,
//! wav export. The session core never touches any of this directly.

pub mod output;
pub mod player;
pub mod tone;
pub mod writer;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("no default audio output device")]
    NoDevice,
    #[error("querying default stream config failed: {0}")]
    StreamConfig(#[from] cpal::DefaultStreamConfigError),
    #[error("building output stream failed: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),
    #[error("starting output stream failed: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),
}
