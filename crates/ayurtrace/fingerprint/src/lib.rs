//! Content-addressed fingerprints for AyurTrace ledger records.
//!
//! Every admitted record carries a fingerprint derived from its canonical
//! JSON serialization, its admission instant, and the fingerprint of the
//! record admitted before it. The chain link means a later edit to any
//! stored record is detectable by recomputation; the admission instant
//! means identical content admitted twice fingerprints differently.

#![deny(unsafe_code)]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Domain separation prefix for all AyurTrace record fingerprints.
const FINGERPRINT_PREFIX: &[u8] = b"ayurtrace-record-v1:";

/// Errors raised while deriving a fingerprint.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FingerprintError {
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// A 32-byte blake3 digest identifying one admitted ledger record.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    /// The all-zero placeholder used while a record's own fingerprint is
    /// being computed.
    pub const ZERO: Fingerprint = Fingerprint([0; 32]);

    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        let mut out = String::with_capacity(64);
        for byte in &self.0 {
            out.push_str(&format!("{byte:02x}"));
        }
        out
    }

    /// First 16 hex characters, for display surfaces that show a snippet.
    pub fn short(&self) -> String {
        let mut out = String::with_capacity(16);
        for byte in &self.0[..8] {
            out.push_str(&format!("{byte:02x}"));
        }
        out
    }

    pub fn from_hex(hex: &str) -> Option<Self> {
        if hex.len() != 64 {
            return None;
        }
        let mut bytes = [0u8; 32];
        for (i, chunk) in hex.as_bytes().chunks(2).enumerate() {
            let pair = std::str::from_utf8(chunk).ok()?;
            bytes[i] = u8::from_str_radix(pair, 16).ok()?;
        }
        Some(Self(bytes))
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl std::fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Fingerprint({})", self.short())
    }
}

impl Serialize for Fingerprint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Fingerprint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        Fingerprint::from_hex(&hex)
            .ok_or_else(|| serde::de::Error::custom("expected 64 hex characters"))
    }
}

/// Derive the fingerprint for one record.
///
/// `domain` separates the four record kinds, `prev` is the fingerprint of
/// the record admitted immediately before this one (none for the genesis
/// record), and `content` is the record with its own fingerprint field
/// zeroed so recomputation is stable.
pub fn chained<T: Serialize>(
    domain: &str,
    prev: Option<&Fingerprint>,
    admitted_at: DateTime<Utc>,
    content: &T,
) -> Result<Fingerprint, FingerprintError> {
    let encoded = serde_json::to_vec(content)
        .map_err(|error| FingerprintError::Serialization(error.to_string()))?;

    let mut hasher = blake3::Hasher::new();
    hasher.update(FINGERPRINT_PREFIX);
    hasher.update(domain.as_bytes());
    match prev {
        Some(prev) => hasher.update(prev.as_bytes()),
        None => hasher.update(Fingerprint::ZERO.as_bytes()),
    };
    hasher.update(
        &admitted_at
            .timestamp_nanos_opt()
            .unwrap_or_default()
            .to_le_bytes(),
    );
    hasher.update(&encoded);
    Ok(Fingerprint(*hasher.finalize().as_bytes()))
}
