//! Content hash type for certificates.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A 32-byte certificate content hash.
///
/// Serves both as the public identity of a certificate and as the chain
/// linkage value stored in the next certificate's `previous_hash`.
///
/// Human-readable formats (JSON, TOML) carry it as lowercase hex; binary
/// formats carry the raw 32 bytes.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CertificateHash([u8; 32]);

impl Default for CertificateHash {
    fn default() -> Self {
        Self::ZERO
    }
}

impl CertificateHash {
    /// The genesis value: the previous-hash of the first certificate.
    pub const ZERO: Self = Self([0u8; 32]);

    /// Length of the lowercase hex rendering.
    pub const HEX_LEN: usize = 64;

    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    /// Parse a 64-character hex string (either case).
    ///
    /// Returns `None` for anything else; callers on public paths treat a
    /// malformed hash exactly like an unknown one.
    pub fn from_hex(s: &str) -> Option<Self> {
        let mut out = [0u8; 32];
        hex::decode_to_slice(s, &mut out).ok()?;
        Some(Self(out))
    }
}

impl fmt::Debug for CertificateHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CertificateHash({}\u{2026})", hex::encode(&self.0[..4]))
    }
}

impl fmt::Display for CertificateHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl Serialize for CertificateHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.collect_str(self)
        } else {
            self.0.serialize(serializer)
        }
    }
}

impl<'de> Deserialize<'de> for CertificateHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            Self::from_hex(&s).ok_or_else(|| de::Error::custom("expected 64 hex characters"))
        } else {
            <[u8; 32]>::deserialize(deserializer).map(Self)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_roundtrip() {
        let hash = CertificateHash::new([0xAB; 32]);
        let parsed = CertificateHash::from_hex(&hash.to_string()).unwrap();
        assert_eq!(parsed, hash);
    }

    #[test]
    fn uppercase_hex_accepted() {
        let upper = "AB".repeat(32);
        assert_eq!(
            CertificateHash::from_hex(&upper),
            Some(CertificateHash::new([0xAB; 32]))
        );
    }

    #[test]
    fn malformed_hex_rejected() {
        assert!(CertificateHash::from_hex("deadbeef").is_none());
        assert!(CertificateHash::from_hex(&"zz".repeat(32)).is_none());
        assert!(CertificateHash::from_hex("").is_none());
        // multi-byte characters must not panic the pairwise decoder
        assert!(CertificateHash::from_hex(&"é".repeat(32)).is_none());
    }

    #[test]
    fn genesis_is_zero() {
        assert!(CertificateHash::ZERO.is_zero());
        assert_eq!(CertificateHash::default(), CertificateHash::ZERO);
        assert_eq!(CertificateHash::ZERO.to_string(), "0".repeat(64));
    }
}
