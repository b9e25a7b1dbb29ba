//! Integrity checksum.
//!
//! SHA-256 over the second 16 bytes of the derived key followed by the
//! ciphertext. A wrong password derives a different key half, so checksum
//! verification doubles as the password check.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

use super::{CIPHER_KEY_LEN, DK_LEN};
use crate::crypto::module::Algorithm;
use crate::error::KeystoreError;
use crate::hex::Hex;

const SHA256: &str = "sha256";

/// Checksum algorithm.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Checksum {
    Sha256(Sha256Params),
}

/// sha256 takes no parameters; the empty struct keeps `params` an object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sha256Params {}

impl Checksum {
    pub fn sha256() -> Self {
        Self::Sha256(Sha256Params {})
    }

    /// Digest over `key[16..32]` followed by the ciphertext.
    pub fn checksum(&self, key: &[u8], ciphertext: &[u8]) -> Result<Hex, KeystoreError> {
        match self {
            Checksum::Sha256(_) => {
                if key.len() < DK_LEN {
                    return Err(KeystoreError::KeyDerivation(format!(
                        "derived key must be at least {DK_LEN} bytes, got {}",
                        key.len()
                    )));
                }

                let mut hasher = Sha256::new();
                hasher.update(&key[CIPHER_KEY_LEN..DK_LEN]);
                hasher.update(ciphertext);
                Ok(Hex::from(hasher.finalize().to_vec()))
            }
        }
    }
}

impl Algorithm for Checksum {
    const MODULE: &'static str = "checksum";

    fn function(&self) -> &'static str {
        match self {
            Checksum::Sha256(_) => SHA256,
        }
    }

    fn resolve(function: &str, params: Value) -> Result<Self, KeystoreError> {
        match function {
            SHA256 => Ok(Self::Sha256(serde_json::from_value(params)?)),
            _ => Err(KeystoreError::UnknownFunction {
                module: Self::MODULE,
                function: function.to_string(),
            }),
        }
    }
}
