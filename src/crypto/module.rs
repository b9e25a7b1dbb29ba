//! Self-describing algorithm modules.
//!
//! Every entry in the document's crypto section is a module: a `function`
//! tag naming the algorithm, a `params` object, and a hex `message` holding
//! the module's output. Decoding is two-phase: the raw shape is read first,
//! then `params` is decoded against the variant selected by the tag, so a
//! document naming an unsupported algorithm is rejected before any
//! cryptography runs.

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::error::KeystoreError;
use crate::hex::Hex;

/// A closed family of algorithms filling one module slot.
pub trait Algorithm: Sized {
    /// Human name of the slot, used in unknown-function errors.
    const MODULE: &'static str;

    /// Wire tag of the selected algorithm.
    fn function(&self) -> &'static str;

    /// Decodes `params` according to `function`, rejecting unknown tags.
    fn resolve(function: &str, params: Value) -> Result<Self, KeystoreError>;
}

/// One `{function, params, message}` element of the crypto section.
///
/// The wire tag is not stored; it is derived from `params` on serialization,
/// so a module can never carry a tag that disagrees with its parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Module<F> {
    pub params: F,
    pub message: Hex,
}

impl<F: Algorithm> Module<F> {
    /// Wraps freshly chosen parameters; `message` starts empty and is filled
    /// in by the encryption pipeline.
    pub fn new(params: F) -> Self {
        Self {
            params,
            message: Hex::default(),
        }
    }

    pub fn function(&self) -> &'static str {
        self.params.function()
    }

    pub(crate) fn from_raw(raw: RawModule) -> Result<Self, KeystoreError> {
        let params = F::resolve(&raw.function, raw.params)?;
        Ok(Self {
            params,
            message: raw.message,
        })
    }
}

impl<F: Algorithm + Serialize> Serialize for Module<F> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("Module", 3)?;
        s.serialize_field("function", self.params.function())?;
        s.serialize_field("params", &self.params)?;
        s.serialize_field("message", &self.message)?;
        s.end()
    }
}

/// First decoding phase: tag and message are read, params stay opaque.
#[derive(Debug, Deserialize)]
pub(crate) struct RawModule {
    #[serde(default)]
    pub function: String,
    pub params: Value,
    #[serde(default)]
    pub message: Hex,
}
