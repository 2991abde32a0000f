//! Error types for the wallet adapters

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Malformed caller input (empty signer list, bad account string, ...)
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Handshake or connect failed, including a user declining approval
    #[error("Connection failed: {0}")]
    Connection(String),

    /// The wallet rejected or failed to produce a signature
    #[error("Signing failed: {0}")]
    Signing(String),

    /// The wallet could not be reached
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("unimplemented")]
    Unimplemented,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn is_unimplemented(&self) -> bool {
        matches!(self, Error::Unimplemented)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
