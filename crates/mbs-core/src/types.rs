use serde::{Deserialize, Serialize};
use std::fmt;

/// Wire format of an encrypted blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatVersion {
    /// Legacy framing: `nonce(12) || ciphertext || tag(16)`
    #[default]
    V0,
    /// Self-describing framing with magic, version, algorithm id and params
    V1,
}

impl fmt::Display for FormatVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatVersion::V0 => f.write_str("v0"),
            FormatVersion::V1 => f.write_str("v1"),
        }
    }
}

/// How a decrypting caller wants the blob format resolved.
///
/// Passed as `Option<FormatHint>`: `None` means "V0, no detection" for
/// compatibility with callers that predate V1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatHint {
    /// Caller asserts the format; detection still runs and must agree.
    Version(FormatVersion),
    /// Trust detection.
    Detect,
}

impl From<FormatVersion> for FormatHint {
    fn from(version: FormatVersion) -> Self {
        FormatHint::Version(version)
    }
}

/// Logical cipher algorithm, independent of its wire code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CipherAlgorithm {
    #[default]
    #[serde(rename = "aes-gcm")]
    AesGcm,
    #[serde(rename = "aes-cbc")]
    AesCbc,
    #[serde(rename = "aes-ctr")]
    AesCtr,
    #[serde(rename = "chacha20-poly1305")]
    ChaCha20Poly1305,
}

impl CipherAlgorithm {
    pub fn name(&self) -> &'static str {
        match self {
            CipherAlgorithm::AesGcm => "aes-gcm",
            CipherAlgorithm::AesCbc => "aes-cbc",
            CipherAlgorithm::AesCtr => "aes-ctr",
            CipherAlgorithm::ChaCha20Poly1305 => "chacha20-poly1305",
        }
    }

    /// Required key length in bytes. All AES variants are AES-256.
    pub fn key_len(&self) -> usize {
        32
    }

    /// Whether the algorithm authenticates its output.
    pub fn is_aead(&self) -> bool {
        matches!(
            self,
            CipherAlgorithm::AesGcm | CipherAlgorithm::ChaCha20Poly1305
        )
    }
}

impl fmt::Display for CipherAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Hash function backing HKDF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    #[default]
    Sha256,
    Sha512,
    /// Kept for reading keys derived by old deployments. Not for new use.
    Sha1,
}

impl HashAlgorithm {
    /// Digest output length in bytes.
    pub fn output_len(&self) -> usize {
        match self {
            HashAlgorithm::Sha256 => 32,
            HashAlgorithm::Sha512 => 64,
            HashAlgorithm::Sha1 => 20,
        }
    }

    /// Largest HKDF output (RFC 5869: 255 blocks).
    pub fn max_okm_len(&self) -> usize {
        255 * self.output_len()
    }

    pub fn is_legacy(&self) -> bool {
        matches!(self, HashAlgorithm::Sha1)
    }

    pub fn name(&self) -> &'static str {
        match self {
            HashAlgorithm::Sha256 => "sha256",
            HashAlgorithm::Sha512 => "sha512",
            HashAlgorithm::Sha1 => "sha1",
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
