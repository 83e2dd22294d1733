use canonical_json::to_string;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest as Sha2Digest, Sha256};
use std::fmt;

use crate::canonicalizer::CanonicalizationError;
use crate::document::Document;
use crate::validation::ValidationError;

/// Domain separator for document fingerprints: `b"dashsync:document:v1\0"`.
const DOCUMENT_DOMAIN_SEPARATOR: &[u8] = b"dashsync:document:v1\0";

/// Supported digest algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DigestAlg {
    /// SHA-256.
    #[serde(rename = "sha-256")]
    Sha256,
}

/// Algorithm + bytes digest, encoded as base64url without padding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Digest {
    /// Digest algorithm.
    pub alg: DigestAlg,
    /// Base64URL (no padding) digest bytes.
    pub b64: String,
}

impl Digest {
    /// Constructs a validated digest.
    pub fn new(alg: DigestAlg, b64: impl Into<String>) -> Result<Self, ValidationError> {
        let b64 = b64.into();
        let re = Regex::new(r"^[A-Za-z0-9_-]{43,44}$").expect("invalid regex");
        if !re.is_match(&b64) {
            return Err(ValidationError::PatternMismatch {
                field: "digest",
                value: b64,
            });
        }
        Ok(Digest { alg, b64 })
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.alg {
            DigestAlg::Sha256 => write!(f, "sha-256:{}", self.b64),
        }
    }
}

/// Content fingerprint of a document.
///
/// Formula: `sha256(domain_separator || rfc8785_bytes(document))`. Mapping key
/// order does not affect the result; sequence order does.
pub fn fingerprint(document: &Document) -> Result<Digest, CanonicalizationError> {
    let canonical = to_string(&document.to_json())
        .map_err(|err| CanonicalizationError::Encoding(err.to_string()))?;

    let mut hasher = Sha256::new();
    hasher.update(DOCUMENT_DOMAIN_SEPARATOR);
    hasher.update(canonical.as_bytes());
    let hash_bytes = hasher.finalize();

    use base64::Engine;
    let b64 = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(hash_bytes);
    Ok(Digest::new(DigestAlg::Sha256, b64)?)
}
