//! HKDF key derivation with structured domain separation
//!
//! Info string:
//! ```text
//! com.mavbozo.mbsecurecrypto.<domain>.v1:<context>
//! ```
//!
//! Master key is the IKM, salt is empty, output length is the requested key
//! size. Keys derived under different domains are unrelated.

use hkdf::Hkdf;
use mbs_core::{HashAlgorithm, MbsError, MbsResult};
use sha1::Sha1;
use sha2::{Sha256, Sha512};
use zeroize::Zeroize;

use crate::keys::KeyMaterial;

const INFO_PREFIX: &str = "com.mavbozo.mbsecurecrypto.";
const INFO_VERSION: &str = ".v1:";

/// Smallest master key accepted for derivation (128-bit)
pub const MIN_MASTER_KEY_SIZE: usize = 16;

/// Output size when the caller does not choose one
pub const DEFAULT_KEY_SIZE: usize = 32;

/// One derivation, consumed by [`derive`].
#[derive(Debug)]
pub struct DerivationRequest {
    pub master_key: KeyMaterial,
    pub domain: String,
    pub context: String,
    pub key_size: usize,
    pub hash: HashAlgorithm,
}

impl DerivationRequest {
    /// Request with default size (32) and hash (SHA-256).
    pub fn new(
        master_key: KeyMaterial,
        domain: impl Into<String>,
        context: impl Into<String>,
    ) -> Self {
        Self {
            master_key,
            domain: domain.into(),
            context: context.into(),
            key_size: DEFAULT_KEY_SIZE,
            hash: HashAlgorithm::default(),
        }
    }

    pub fn key_size(mut self, key_size: usize) -> Self {
        self.key_size = key_size;
        self
    }

    pub fn hash(mut self, hash: HashAlgorithm) -> Self {
        self.hash = hash;
        self
    }
}

/// HKDF info string for `domain` and `context`.
pub fn build_info(domain: &str, context: &str) -> String {
    format!("{INFO_PREFIX}{domain}{INFO_VERSION}{context}")
}

/// Derive a key. The request (and its master key copy) is dropped and
/// zeroized on return.
pub fn derive(request: DerivationRequest) -> MbsResult<KeyMaterial> {
    derive_from(
        request.master_key.as_bytes(),
        &request.domain,
        &request.context,
        request.key_size,
        request.hash,
    )
}

/// Derive from a borrowed master key; `None` picks 32 bytes / SHA-256.
pub fn derive_key(
    master_key: &KeyMaterial,
    domain: &str,
    context: &str,
    key_size: Option<usize>,
    hash: Option<HashAlgorithm>,
) -> MbsResult<KeyMaterial> {
    derive_from(
        master_key.as_bytes(),
        domain,
        context,
        key_size.unwrap_or(DEFAULT_KEY_SIZE),
        hash.unwrap_or_default(),
    )
}

fn derive_from(
    ikm: &[u8],
    domain: &str,
    context: &str,
    key_size: usize,
    hash: HashAlgorithm,
) -> MbsResult<KeyMaterial> {
    if ikm.len() < MIN_MASTER_KEY_SIZE {
        return Err(MbsError::InvalidKey(format!(
            "master key must be at least {MIN_MASTER_KEY_SIZE} bytes, got {}",
            ikm.len()
        )));
    }
    if domain.is_empty() {
        return Err(MbsError::InvalidInput("domain must not be empty".into()));
    }
    if context.is_empty() {
        return Err(MbsError::InvalidInput("context must not be empty".into()));
    }
    if key_size == 0 || key_size > hash.max_okm_len() {
        return Err(MbsError::InvalidInput(format!(
            "key size {key_size} outside 1..={} for HKDF-{hash}",
            hash.max_okm_len()
        )));
    }
    if hash.is_legacy() {
        tracing::warn!(domain, "HKDF-SHA1 is legacy; use sha256 or sha512 for new keys");
    }

    let info = build_info(domain, context);
    let mut okm = vec![0u8; key_size];
    let expanded = match hash {
        HashAlgorithm::Sha256 => Hkdf::<Sha256>::new(None, ikm).expand(info.as_bytes(), &mut okm),
        HashAlgorithm::Sha512 => Hkdf::<Sha512>::new(None, ikm).expand(info.as_bytes(), &mut okm),
        HashAlgorithm::Sha1 => Hkdf::<Sha1>::new(None, ikm).expand(info.as_bytes(), &mut okm),
    };
    if let Err(e) = expanded {
        okm.zeroize();
        return Err(MbsError::InvalidInput(format!("HKDF expand failed: {e}")));
    }

    tracing::debug!(domain, key_size, hash = %hash, "derived key");
    Ok(KeyMaterial::from_vec(okm))
}
