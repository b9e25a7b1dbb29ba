//! The keystore document.
//!
//! A version-4 keystore is a JSON document holding the crypto section plus
//! descriptive metadata: an optional free-form description, the public key
//! belonging to the secret (if any), a derivation path, and a UUID naming
//! the document.

use std::path::Path;

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::crypto::{Checksum, Cipher, Crypto, Kdf, RawCrypto};
use crate::error::KeystoreError;
use crate::hex::Hex;
use crate::password;
use crate::storage::Storage;

/// Format generation written into every document.
pub const KEYSTORE_VERSION: u32 = 4;

/// An encrypted secret with its metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Keystore {
    crypto: Crypto,
    #[serde(skip_serializing_if = "String::is_empty")]
    description: String,
    #[serde(skip_serializing_if = "Hex::is_empty")]
    pubkey: Hex,
    path: String,
    uuid: Uuid,
    version: u32,
}

/// Settings for [`Keystore::encrypt`]; `..Default::default()` fills the rest.
///
/// Unset algorithm slots fall back to scrypt, AES-128-CTR and SHA-256 with
/// fresh random salt and IV.
#[derive(Debug, Default)]
pub struct EncryptOptions {
    pub kdf: Option<Kdf>,
    pub cipher: Option<Cipher>,
    pub checksum: Option<Checksum>,
    pub description: String,
    pub pubkey: Hex,
    pub path: String,
}

/// First decoding phase of the whole document.
#[derive(Deserialize)]
struct RawKeystore {
    crypto: RawCrypto,
    #[serde(default)]
    description: String,
    #[serde(default)]
    pubkey: Hex,
    #[serde(default)]
    path: String,
    #[serde(default)]
    uuid: Uuid,
    #[serde(default)]
    version: u32,
}

impl Keystore {
    /// Encrypts `secret` under `password` into a fresh document.
    ///
    /// The password is normalized before key derivation; see
    /// [`password::normalize`]. Each document gets a new random UUID.
    pub fn encrypt(
        secret: &[u8],
        password: &str,
        opts: EncryptOptions,
    ) -> Result<Self, KeystoreError> {
        let kdf = match opts.kdf {
            Some(kdf) => kdf,
            None => Kdf::scrypt()?,
        };
        let cipher = match opts.cipher {
            Some(cipher) => cipher,
            None => Cipher::aes_128_ctr()?,
        };
        let checksum = opts.checksum.unwrap_or_else(Checksum::sha256);

        let mut crypto = Crypto::new(kdf, cipher, checksum);
        crypto.encrypt(secret, &password::normalize(password))?;

        Ok(Self {
            crypto,
            description: opts.description,
            pubkey: opts.pubkey,
            path: opts.path,
            uuid: Uuid::new_v4(),
            version: KEYSTORE_VERSION,
        })
    }

    /// Recovers the secret, verifying the checksum first.
    pub fn decrypt(&self, password: &str) -> Result<Zeroizing<Vec<u8>>, KeystoreError> {
        self.crypto.decrypt(&password::normalize(password))
    }

    pub fn crypto(&self) -> &Crypto {
        &self.crypto
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn pubkey(&self) -> &Hex {
        &self.pubkey
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    /// Parses a document, resolving the algorithm tags of every module.
    pub fn from_json(json: &str) -> Result<Self, KeystoreError> {
        Self::from_raw(serde_json::from_str(json)?)
    }

    /// Compact JSON encoding of the document.
    pub fn to_json(&self) -> Result<String, KeystoreError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Reads and parses a keystore file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, KeystoreError> {
        let data = Storage::new(path.as_ref().to_path_buf()).load()?;
        Self::from_raw(serde_json::from_slice(&data)?)
    }

    /// Writes the document as pretty JSON, atomically and readable only by
    /// the owner on Unix.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), KeystoreError> {
        let mut data = serde_json::to_string_pretty(self)?;
        data.push('\n');
        Storage::new(path.as_ref().to_path_buf()).save(data.as_bytes())
    }

    fn from_raw(raw: RawKeystore) -> Result<Self, KeystoreError> {
        Ok(Self {
            crypto: Crypto::from_raw(raw.crypto)?,
            description: raw.description,
            pubkey: raw.pubkey,
            path: raw.path,
            uuid: raw.uuid,
            version: raw.version,
        })
    }
}
