use std::path::PathBuf;

use thiserror::Error;

use crate::crypto::key::VALID_KEY_LENGTHS;

#[derive(Debug, Error)]
pub enum VaultError {
    #[error("invalid key length: expected one of {expected:?} bytes, got {actual}")]
    InvalidKeyLength {
        expected: &'static [usize],
        actual: usize,
    },

    #[error("source directory not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    #[error("malformed container: {len} bytes, need at least {min}")]
    MalformedContainer { len: usize, min: usize },

    #[error("authentication failed: wrong key or tampered data")]
    AuthenticationFailed,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal cipher error")]
    Internal,
}

impl VaultError {
    pub(crate) fn invalid_key_length(actual: usize) -> Self {
        Self::InvalidKeyLength {
            expected: VALID_KEY_LENGTHS,
            actual,
        }
    }
}
