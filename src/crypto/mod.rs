//! Cryptographic modules of the keystore.
//!
//! Key derivation, secret encryption, and the integrity checksum, plus the
//! [`Crypto`] section that composes them into one pipeline.

pub mod checksum;
pub mod cipher;
pub mod kdf;
pub mod module;

pub use checksum::Checksum;
pub use cipher::Cipher;
pub use kdf::Kdf;
pub use module::{Algorithm, Module};

use getrandom::fill;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::error::KeystoreError;
use crate::hex::Hex;
use module::RawModule;

/// Length of the derived key (32 bytes; cipher and checksum take 16 each).
pub const DK_LEN: usize = 32;
/// Length of the cipher key slice (16 bytes for AES-128).
pub const CIPHER_KEY_LEN: usize = 16;
/// Length of a fresh KDF salt (32 bytes).
pub const SALT_LEN: usize = 32;
/// Length of the AES-CTR IV (16 bytes).
pub const IV_LEN: usize = 16;

/// Fill buffer with cryptographically secure random bytes
pub fn secure_random(buf: &mut [u8]) -> Result<(), KeystoreError> {
    fill(buf).map_err(|_| KeystoreError::Entropy)
}

/// The three-module crypto section of a keystore document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Crypto {
    pub kdf: Module<Kdf>,
    pub cipher: Module<Cipher>,
    pub checksum: Module<Checksum>,
}

/// First decoding phase of the crypto section; see [`module::RawModule`].
#[derive(Debug, Deserialize)]
pub(crate) struct RawCrypto {
    kdf: RawModule,
    cipher: RawModule,
    checksum: RawModule,
}

impl Crypto {
    pub fn new(kdf: Kdf, cipher: Cipher, checksum: Checksum) -> Self {
        Self {
            kdf: Module::new(kdf),
            cipher: Module::new(cipher),
            checksum: Module::new(checksum),
        }
    }

    pub(crate) fn from_raw(raw: RawCrypto) -> Result<Self, KeystoreError> {
        Ok(Self {
            kdf: Module::from_raw(raw.kdf)?,
            cipher: Module::from_raw(raw.cipher)?,
            checksum: Module::from_raw(raw.checksum)?,
        })
    }

    /// Encrypts `secret` under the normalized password bytes, filling the
    /// cipher and checksum messages.
    ///
    /// All outputs are computed before any message is assigned, so a failed
    /// call leaves `self` unchanged.
    pub fn encrypt(&mut self, secret: &[u8], password: &[u8]) -> Result<(), KeystoreError> {
        let key = self.kdf.params.derive_key(password)?;
        let ciphertext = self.cipher.params.encrypt(&key, secret)?;
        let checksum = self.checksum.params.checksum(&key, &ciphertext)?;

        self.cipher.message = Hex::from(ciphertext);
        self.checksum.message = checksum;
        Ok(())
    }

    /// Verifies the checksum, then recovers the secret.
    ///
    /// A wrong password and a tampered document are indistinguishable here;
    /// both surface as [`KeystoreError::InvalidPassword`].
    pub fn decrypt(&self, password: &[u8]) -> Result<Zeroizing<Vec<u8>>, KeystoreError> {
        let key = self.kdf.params.derive_key(password)?;
        let checksum = self
            .checksum
            .params
            .checksum(&key, &self.cipher.message)?;

        if checksum != self.checksum.message {
            return Err(KeystoreError::InvalidPassword);
        }

        self.cipher.params.decrypt(&key, &self.cipher.message)
    }
}
