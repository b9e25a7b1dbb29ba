//! Key derivation.
//!
//! Two supported KDFs, scrypt and PBKDF2-HMAC-SHA-256, both deriving at
//! least 32 bytes: the first 16 feed the cipher, the second 16 feed the
//! checksum. Defaults use a cost of 2^18 and a fresh 32-byte salt.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::Sha256;
use zeroize::Zeroizing;

use super::{DK_LEN, SALT_LEN, secure_random};
use crate::crypto::module::Algorithm;
use crate::error::KeystoreError;
use crate::hex::Hex;

const SCRYPT: &str = "scrypt";
const PBKDF2: &str = "pbkdf2";
const HMAC_SHA256: &str = "hmac-sha256";

/// Default CPU cost, 2^18, for both KDFs.
const DEFAULT_COST: u32 = 1 << 18;

/// Key derivation algorithm and its parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Kdf {
    Scrypt(ScryptParams),
    Pbkdf2(Pbkdf2Params),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScryptParams {
    pub dklen: u32,
    pub n: u32,
    pub p: u32,
    pub r: u32,
    pub salt: Hex,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pbkdf2Params {
    pub dklen: u32,
    pub c: u32,
    pub prf: String,
    pub salt: Hex,
}

impl Kdf {
    /// scrypt with standard cost parameters and a random salt.
    pub fn scrypt() -> Result<Self, KeystoreError> {
        Ok(Self::Scrypt(ScryptParams {
            dklen: DK_LEN as u32,
            n: DEFAULT_COST,
            p: 1,
            r: 8,
            salt: random_salt()?,
        }))
    }

    /// PBKDF2-HMAC-SHA-256 with standard cost parameters and a random salt.
    pub fn pbkdf2() -> Result<Self, KeystoreError> {
        Ok(Self::Pbkdf2(Pbkdf2Params {
            dklen: DK_LEN as u32,
            c: DEFAULT_COST,
            prf: HMAC_SHA256.to_string(),
            salt: random_salt()?,
        }))
    }

    pub fn validate(&self) -> Result<(), KeystoreError> {
        match self {
            Kdf::Scrypt(p) => p.validate(),
            Kdf::Pbkdf2(p) => p.validate(),
        }
    }

    /// Derives `dklen` bytes from the normalized password bytes.
    pub fn derive_key(&self, password: &[u8]) -> Result<Zeroizing<Vec<u8>>, KeystoreError> {
        self.validate()?;
        match self {
            Kdf::Scrypt(p) => p.derive(password),
            Kdf::Pbkdf2(p) => p.derive(password),
        }
    }
}

impl Algorithm for Kdf {
    const MODULE: &'static str = "key derivation";

    fn function(&self) -> &'static str {
        match self {
            Kdf::Scrypt(_) => SCRYPT,
            Kdf::Pbkdf2(_) => PBKDF2,
        }
    }

    fn resolve(function: &str, params: Value) -> Result<Self, KeystoreError> {
        match function {
            SCRYPT => Ok(Self::Scrypt(serde_json::from_value(params)?)),
            PBKDF2 => Ok(Self::Pbkdf2(serde_json::from_value(params)?)),
            _ => Err(KeystoreError::UnknownFunction {
                module: Self::MODULE,
                function: function.to_string(),
            }),
        }
    }
}

impl ScryptParams {
    fn validate(&self) -> Result<(), KeystoreError> {
        if (self.dklen as usize) < DK_LEN {
            return Err(KeystoreError::KeyDerivation(format!(
                "dklen must be at least {DK_LEN}"
            )));
        }
        if self.n < 2 || !self.n.is_power_of_two() {
            return Err(KeystoreError::KeyDerivation(
                "n must be a power of two, at least 2".to_string(),
            ));
        }
        if self.r == 0 {
            return Err(KeystoreError::KeyDerivation("r must be positive".to_string()));
        }
        if self.p == 0 {
            return Err(KeystoreError::KeyDerivation("p must be positive".to_string()));
        }
        Ok(())
    }

    fn derive(&self, password: &[u8]) -> Result<Zeroizing<Vec<u8>>, KeystoreError> {
        // validate() guarantees n is a power of two >= 2
        let log_n = self.n.trailing_zeros() as u8;
        let params = scrypt::Params::new(log_n, self.r, self.p, self.dklen as usize)
            .map_err(|e| KeystoreError::KeyDerivation(e.to_string()))?;

        let mut key = Zeroizing::new(vec![0u8; self.dklen as usize]);
        scrypt::scrypt(password, &self.salt, &params, &mut key)
            .map_err(|e| KeystoreError::KeyDerivation(e.to_string()))?;
        Ok(key)
    }
}

impl Pbkdf2Params {
    fn validate(&self) -> Result<(), KeystoreError> {
        if (self.dklen as usize) < DK_LEN {
            return Err(KeystoreError::KeyDerivation(format!(
                "dklen must be at least {DK_LEN}"
            )));
        }
        if self.c == 0 {
            return Err(KeystoreError::KeyDerivation("c must be positive".to_string()));
        }
        if self.prf != HMAC_SHA256 {
            return Err(KeystoreError::KeyDerivation(format!(
                "unsupported prf: {}",
                self.prf
            )));
        }
        Ok(())
    }

    fn derive(&self, password: &[u8]) -> Result<Zeroizing<Vec<u8>>, KeystoreError> {
        let mut key = Zeroizing::new(vec![0u8; self.dklen as usize]);
        pbkdf2::pbkdf2_hmac::<Sha256>(password, &self.salt, self.c, &mut key);
        Ok(key)
    }
}

fn random_salt() -> Result<Hex, KeystoreError> {
    let mut salt = [0u8; SALT_LEN];
    secure_random(&mut salt)?;
    Ok(Hex::from(salt))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scrypt_matches_published_vector() {
        // RFC 7914, section 12
        let kdf = Kdf::Scrypt(ScryptParams {
            dklen: 64,
            n: 1024,
            p: 16,
            r: 8,
            salt: Hex::from(b"NaCl".as_slice()),
        });

        let key = kdf.derive_key(b"password").unwrap();
        assert_eq!(
            hex::encode(&*key),
            "fdbabe1c9d3472007856e7190d01e9fe7c6ad7cbc8237830e77376634b373162\
             2eaf30d92e22a3886ff109279d9830dac727afb94a83ee6d8360cbdfa2cc0640"
        );
    }

    #[test]
    fn pbkdf2_matches_published_vector() {
        // RFC 7914, section 11
        let kdf = Kdf::Pbkdf2(Pbkdf2Params {
            dklen: 64,
            c: 1,
            prf: "hmac-sha256".to_string(),
            salt: Hex::from(b"salt".as_slice()),
        });

        let key = kdf.derive_key(b"passwd").unwrap();
        assert_eq!(
            hex::encode(&*key),
            "55ac046e56e3089fec1691c22544b605f94185216dde0465e68b9d57c20dacbc\
             49ca9cccf179b645991664b39d77ef317c71b845b1e30bd509112041d3a19783"
        );
    }

    #[test]
    fn derivation_is_deterministic() {
        let kdf = Kdf::Scrypt(ScryptParams {
            dklen: 32,
            n: 16,
            p: 1,
            r: 1,
            salt: Hex::from([7u8; 32]),
        });

        let k1 = kdf.derive_key(b"pw").unwrap();
        let k2 = kdf.derive_key(b"pw").unwrap();
        assert_eq!(*k1, *k2);

        let k3 = kdf.derive_key(b"other").unwrap();
        assert_ne!(*k1, *k3);
    }

    #[test]
    fn fresh_kdfs_use_distinct_salts() {
        let a = Kdf::scrypt().unwrap();
        let b = Kdf::scrypt().unwrap();

        match (&a, &b) {
            (Kdf::Scrypt(pa), Kdf::Scrypt(pb)) => {
                assert_eq!(pa.salt.len(), SALT_LEN);
                assert_ne!(pa.salt, pb.salt);
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn scrypt_defaults_validate() {
        let kdf = Kdf::scrypt().unwrap();
        assert!(kdf.validate().is_ok());
        assert_eq!(kdf.function(), "scrypt");
    }

    #[test]
    fn pbkdf2_defaults_validate() {
        let kdf = Kdf::pbkdf2().unwrap();
        assert!(kdf.validate().is_ok());
        assert_eq!(kdf.function(), "pbkdf2");
    }

    #[test]
    fn invalid_params_fail_gracefully() {
        let base = ScryptParams {
            dklen: 32,
            n: 16,
            p: 1,
            r: 1,
            salt: Hex::default(),
        };

        let not_pow2 = ScryptParams { n: 12, ..base.clone() };
        assert!(Kdf::Scrypt(not_pow2).derive_key(b"pw").is_err());

        let n_one = ScryptParams { n: 1, ..base.clone() };
        assert!(Kdf::Scrypt(n_one).derive_key(b"pw").is_err());

        let zero_r = ScryptParams { r: 0, ..base.clone() };
        assert!(Kdf::Scrypt(zero_r).derive_key(b"pw").is_err());

        let zero_p = ScryptParams { p: 0, ..base.clone() };
        assert!(Kdf::Scrypt(zero_p).derive_key(b"pw").is_err());

        let short_dklen = ScryptParams { dklen: 16, ..base };
        assert!(Kdf::Scrypt(short_dklen).derive_key(b"pw").is_err());
    }

    #[test]
    fn pbkdf2_rejects_foreign_prf() {
        let kdf = Kdf::Pbkdf2(Pbkdf2Params {
            dklen: 32,
            c: 1,
            prf: "hmac-sha512".to_string(),
            salt: Hex::default(),
        });

        let err = kdf.derive_key(b"pw").unwrap_err();
        assert!(err.to_string().contains("unsupported prf"));
    }

    #[test]
    fn pbkdf2_rejects_zero_rounds() {
        let kdf = Kdf::Pbkdf2(Pbkdf2Params {
            dklen: 32,
            c: 0,
            prf: "hmac-sha256".to_string(),
            salt: Hex::default(),
        });
        assert!(kdf.derive_key(b"pw").is_err());
    }

    #[test]
    fn unknown_function_is_rejected() {
        let err = Kdf::resolve("hkdf", serde_json::json!({})).unwrap_err();
        assert_eq!(err.to_string(), "unknown key derivation function: hkdf");
    }

    #[test]
    fn params_serialize_without_a_tag() {
        let kdf = Kdf::Scrypt(ScryptParams {
            dklen: 32,
            n: 16,
            p: 1,
            r: 8,
            salt: Hex::from([0xaa; 32]),
        });

        let value = serde_json::to_value(&kdf).unwrap();
        assert_eq!(value["n"], 16);
        assert!(value.get("function").is_none());

        let back = Kdf::resolve("scrypt", value).unwrap();
        assert_eq!(back, kdf);
    }
}
