//! Keystore error types.

use thiserror::Error;

/// Errors produced while building, parsing, or opening a keystore.
#[derive(Error, Debug)]
pub enum KeystoreError {
    /// A binary field held malformed hex.
    #[error("invalid hex encoding: {0}")]
    Hex(#[from] hex::FromHexError),

    /// The document is not valid JSON or is missing required fields.
    #[error("invalid keystore document: {0}")]
    Json(#[from] serde_json::Error),

    /// A module named a function outside the supported set.
    #[error("unknown {module} function: {function}")]
    UnknownFunction {
        module: &'static str,
        function: String,
    },

    /// KDF parameters were rejected or key derivation failed.
    #[error("key derivation failed: {0}")]
    KeyDerivation(String),

    /// Cipher parameters were rejected or the cipher could not run.
    #[error("cipher operation failed: {0}")]
    Cipher(String),

    /// Checksum verification failed: wrong password or corrupted document.
    #[error("invalid password: checksum mismatch")]
    InvalidPassword,

    /// The OS random generator was unavailable.
    #[error("system entropy source unavailable")]
    Entropy,

    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
