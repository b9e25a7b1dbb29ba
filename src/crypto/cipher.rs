//! Symmetric encryption of the secret.
//!
//! AES-128-CTR keyed with the first 16 bytes of the derived key. CTR mode
//! keeps the ciphertext the same length as the secret; integrity comes from
//! the checksum module, not from the cipher.

use aes::Aes128;
use cipher::{KeyIvInit, StreamCipher};
use ctr::Ctr128BE;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use zeroize::Zeroizing;

use super::{CIPHER_KEY_LEN, IV_LEN, secure_random};
use crate::crypto::module::Algorithm;
use crate::error::KeystoreError;
use crate::hex::Hex;

const AES_128_CTR: &str = "aes-128-ctr";

type Aes128Ctr = Ctr128BE<Aes128>;

/// Cipher algorithm and its parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cipher {
    Aes128Ctr(Aes128CtrParams),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aes128CtrParams {
    pub iv: Hex,
}

impl Cipher {
    /// AES-128-CTR with a fresh random IV.
    pub fn aes_128_ctr() -> Result<Self, KeystoreError> {
        let mut iv = [0u8; IV_LEN];
        secure_random(&mut iv)?;
        Ok(Self::Aes128Ctr(Aes128CtrParams { iv: Hex::from(iv) }))
    }

    /// Encrypts the secret under the first 16 bytes of the derived key.
    pub fn encrypt(&self, key: &[u8], secret: &[u8]) -> Result<Vec<u8>, KeystoreError> {
        let mut out = secret.to_vec();
        self.keystream(key)?.apply_keystream(&mut out);
        Ok(out)
    }

    /// Recovers the secret; in CTR mode this is the same keystream again.
    pub fn decrypt(
        &self,
        key: &[u8],
        ciphertext: &[u8],
    ) -> Result<Zeroizing<Vec<u8>>, KeystoreError> {
        let mut out = Zeroizing::new(ciphertext.to_vec());
        self.keystream(key)?.apply_keystream(&mut out);
        Ok(out)
    }

    fn keystream(&self, key: &[u8]) -> Result<Aes128Ctr, KeystoreError> {
        match self {
            Cipher::Aes128Ctr(params) => {
                if key.len() < CIPHER_KEY_LEN {
                    return Err(KeystoreError::Cipher(format!(
                        "encryption key must be at least {CIPHER_KEY_LEN} bytes, got {}",
                        key.len()
                    )));
                }
                if params.iv.len() != IV_LEN {
                    return Err(KeystoreError::Cipher(format!(
                        "iv must be {IV_LEN} bytes, got {}",
                        params.iv.len()
                    )));
                }

                let key: [u8; CIPHER_KEY_LEN] = key[..CIPHER_KEY_LEN]
                    .try_into()
                    .map_err(|_| KeystoreError::Cipher("key conversion failed".to_string()))?;
                let iv: [u8; IV_LEN] = params
                    .iv
                    .as_bytes()
                    .try_into()
                    .map_err(|_| KeystoreError::Cipher("iv conversion failed".to_string()))?;

                Ok(Aes128Ctr::new(&key.into(), &iv.into()))
            }
        }
    }
}

impl Algorithm for Cipher {
    const MODULE: &'static str = "cipher";

    fn function(&self) -> &'static str {
        match self {
            Cipher::Aes128Ctr(_) => AES_128_CTR,
        }
    }

    fn resolve(function: &str, params: Value) -> Result<Self, KeystoreError> {
        match function {
            AES_128_CTR => Ok(Self::Aes128Ctr(serde_json::from_value(params)?)),
            _ => Err(KeystoreError::UnknownFunction {
                module: Self::MODULE,
                function: function.to_string(),
            }),
        }
    }
}
