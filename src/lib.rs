mod crypto;
mod error;
mod hex;
mod keystore;
pub mod password;
mod storage;

pub use crate::crypto::checksum::Sha256Params;
pub use crate::crypto::cipher::Aes128CtrParams;
pub use crate::crypto::kdf::{Pbkdf2Params, ScryptParams};
pub use crate::crypto::{Algorithm, Checksum, Cipher, Crypto, Kdf, Module};
pub use crate::error::KeystoreError;
pub use crate::hex::Hex;
pub use crate::keystore::{EncryptOptions, KEYSTORE_VERSION, Keystore};
pub use crate::storage::Storage;
