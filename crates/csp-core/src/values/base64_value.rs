//! Base64-carrying sources: nonces and hashes

use std::fmt;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use sha2::{Digest, Sha256, Sha384, Sha512};

/// Why a base64-value was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Base64Error {
    #[error("Invalid base64-value (should be multiple of 4 bytes: {0}).")]
    Length(usize),
    #[error("Invalid base64-value (characters are not in the base64-value grammar).")]
    Characters,
    #[error("Invalid base64-value (bad padding).")]
    Padding,
}

/// An RFC 4648 base64 string (standard alphabet, padded) and its bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Base64Value {
    value: String,
    decoded: Vec<u8>,
}

impl Base64Value {
    pub fn new(value: &str) -> Result<Self, Base64Error> {
        if value.len() % 4 != 0 {
            return Err(Base64Error::Length(value.len()));
        }
        if !value
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'+' || b == b'/' || b == b'=')
        {
            return Err(Base64Error::Characters);
        }
        let body = value.trim_end_matches('=');
        if body.contains('=') || value.len() - body.len() > 2 {
            return Err(Base64Error::Padding);
        }
        let decoded = STANDARD.decode(value).map_err(|e| match e {
            base64::DecodeError::InvalidByte(..) => Base64Error::Characters,
            base64::DecodeError::InvalidLength(len) => Base64Error::Length(len),
            _ => Base64Error::Padding,
        })?;
        Ok(Base64Value {
            value: value.to_string(),
            decoded,
        })
    }

    pub fn encode(bytes: &[u8]) -> Self {
        Base64Value {
            value: STANDARD.encode(bytes),
            decoded: bytes.to_vec(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn decoded(&self) -> &[u8] {
        &self.decoded
    }

    /// Number of decoded bytes.
    pub fn size(&self) -> usize {
        self.decoded.len()
    }
}

impl fmt::Display for Base64Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.value)
    }
}

// ── Hash sources ──────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashAlgorithm {
    Sha256,
    Sha384,
    Sha512,
}

impl HashAlgorithm {
    /// Select by digest size, as written after `sha` in a hash-source.
    pub fn from_digest_size(size: &str) -> Option<Self> {
        match size {
            "256" => Some(HashAlgorithm::Sha256),
            "384" => Some(HashAlgorithm::Sha384),
            "512" => Some(HashAlgorithm::Sha512),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            HashAlgorithm::Sha256 => "sha256",
            HashAlgorithm::Sha384 => "sha384",
            HashAlgorithm::Sha512 => "sha512",
        }
    }

    /// Length in bytes of a digest produced by this algorithm.
    pub fn output_len(self) -> usize {
        match self {
            HashAlgorithm::Sha256 => Sha256::output_size(),
            HashAlgorithm::Sha384 => Sha384::output_size(),
            HashAlgorithm::Sha512 => Sha512::output_size(),
        }
    }

    pub fn digest(self, content: &[u8]) -> Vec<u8> {
        match self {
            HashAlgorithm::Sha256 => Sha256::digest(content).to_vec(),
            HashAlgorithm::Sha384 => Sha384::digest(content).to_vec(),
            HashAlgorithm::Sha512 => Sha512::digest(content).to_vec(),
        }
    }

    fn label(self) -> &'static str {
        match self {
            HashAlgorithm::Sha256 => "SHA-256",
            HashAlgorithm::Sha384 => "SHA-384",
            HashAlgorithm::Sha512 => "SHA-512",
        }
    }
}

/// `'sha256-…'`, `'sha384-…'` or `'sha512-…'`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HashSource {
    pub algorithm: HashAlgorithm,
    pub value: Base64Value,
}

impl HashSource {
    pub fn new(algorithm: HashAlgorithm, value: Base64Value) -> Self {
        HashSource { algorithm, value }
    }

    /// Hash-source allowing exactly `content` (e.g. an inline script body).
    pub fn for_content(algorithm: HashAlgorithm, content: &[u8]) -> Self {
        HashSource::new(algorithm, Base64Value::encode(&algorithm.digest(content)))
    }

    /// The digest must be exactly as long as the algorithm's output.
    pub fn validate(&self) -> Result<(), String> {
        let expected = self.algorithm.output_len();
        if self.value.size() != expected {
            return Err(format!(
                "Invalid {} value (wrong length): {}.",
                self.algorithm.label(),
                self.value.size()
            ));
        }
        Ok(())
    }
}

impl fmt::Display for HashSource {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "'{}-{}'", self.algorithm.name(), self.value)
    }
}

// ── Nonce sources ─────────────────────────────────────────

/// Minimum recommended nonce entropy: 128 bits.
const MIN_NONCE_BYTES: usize = 16;

/// `'nonce-…'`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NonceSource {
    pub value: String,
}

impl NonceSource {
    pub fn new(value: impl Into<String>) -> Self {
        NonceSource { value: value.into() }
    }

    /// Problems worth a warning. An unusual nonce is still a usable nonce.
    pub fn validation_errors(&self) -> Vec<String> {
        match Base64Value::new(&self.value) {
            Ok(b) if b.size() < MIN_NONCE_BYTES => vec![
                "CSP specification recommends nonce-value to be at least 128 bits long (before encoding)."
                    .to_string(),
            ],
            Ok(_) => Vec::new(),
            Err(e) => vec![e.to_string()],
        }
    }
}

impl fmt::Display for NonceSource {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "'nonce-{}'", self.value)
    }
}
