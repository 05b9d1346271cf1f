//! Error types for the push channel

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChannelError {
    #[error("Channel read failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed frame: {0}")]
    Malformed(String),
}

impl From<serde_json::Error> for ChannelError {
    fn from(e: serde_json::Error) -> Self {
        ChannelError::Malformed(e.to_string())
    }
}
