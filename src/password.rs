//! Password normalization.
//!
//! Passwords are normalized before key derivation so that the same passphrase
//! typed on different platforms and keyboards derives the same key: Unicode
//! NFKD decomposition, then removal of control characters (C0, C1 and DEL),
//! then UTF-8 encoding.

use unicode_normalization::UnicodeNormalization;
use zeroize::Zeroizing;

/// Normalizes a password into the byte string fed to the KDF.
pub fn normalize(password: &str) -> Zeroizing<Vec<u8>> {
    let filtered: String = password.nfkd().filter(|c| !c.is_control()).collect();
    Zeroizing::new(filtered.into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_passes_through() {
        assert_eq!(normalize("password").as_slice(), b"password");
    }

    #[test]
    fn empty_stays_empty() {
        assert!(normalize("").is_empty());
    }

    #[test]
    fn compatibility_characters_decompose() {
        // mathematical fraktur letters decompose to plain ASCII under NFKD
        let n = normalize("𝔱𝔢𝔰𝔱𝔭𝔞𝔰𝔰𝔴𝔬𝔯𝔡🔑");
        assert_eq!(hex::encode(n.as_slice()), "7465737470617373776f7264f09f9491");
    }

    #[test]
    fn precomposed_characters_decompose() {
        // U+00E9 becomes 'e' followed by U+0301
        assert_eq!(normalize("\u{00e9}").as_slice(), "e\u{0301}".as_bytes());
    }

    #[test]
    fn control_characters_are_stripped() {
        assert_eq!(normalize("pass\u{0007}word").as_slice(), b"password");
        assert_eq!(normalize("tab\tand\nnewline").as_slice(), b"tabandnewline");
        // DEL and a C1 control
        assert_eq!(normalize("a\u{007f}b\u{0085}c").as_slice(), b"abc");
    }

    #[test]
    fn non_control_unicode_survives() {
        let n = normalize("🔑");
        assert_eq!(n.as_slice(), "🔑".as_bytes());
    }
}
