//! Cipher orchestration: nonce acquisition, AEAD engine, wire framing
//!
//! Every call runs validate → (nonce → seal → frame) or
//! (resolve format → unframe → open) and stops at the first error.
//! Nothing is retried and nothing persists between calls.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use mbs_core::{CipherAlgorithm, FormatHint, FormatVersion, MbsError, MbsResult};
use zeroize::Zeroizing;

use crate::codec;
use crate::detect;
use crate::engine;
use crate::keys::KeyMaterial;
use crate::random::{OsRandom, RandomSource};
use crate::registry::{self, AlgorithmParams};
use crate::{NONCE_SIZE, TAG_SIZE};

/// Encrypt/decrypt façade over a random source.
///
/// The source is only consulted for nonces. [`Cipher::new`] uses the OS RNG;
/// [`Cipher::with_rng`] lets callers plug in another [`RandomSource`].
#[derive(Debug, Clone, Default)]
pub struct Cipher<R = OsRandom> {
    rng: R,
}

impl Cipher<OsRandom> {
    pub fn new() -> Self {
        Self { rng: OsRandom }
    }
}

impl<R: RandomSource> Cipher<R> {
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }

    /// Encrypt `plaintext` under a fresh nonce. `format: None` writes V0.
    pub fn encrypt(
        &self,
        plaintext: &[u8],
        algorithm: CipherAlgorithm,
        format: Option<FormatVersion>,
        key: &KeyMaterial,
    ) -> MbsResult<Vec<u8>> {
        let format = format.unwrap_or_default();
        engine::ensure_supported(algorithm)?;
        engine::validate_key(algorithm, key)?;

        let mut nonce = [0u8; NONCE_SIZE];
        self.rng.fill_bytes(&mut nonce)?;

        let sealed = engine::seal(algorithm, key, &nonce, plaintext)?;
        let blob = match format {
            FormatVersion::V0 => codec::encode_v0(&nonce, &sealed.ciphertext, &sealed.tag)?,
            FormatVersion::V1 => {
                let params = AlgorithmParams::for_aead(algorithm, &nonce)?;
                codec::encode_v1(
                    registry::wire_code_for(algorithm),
                    &params.encode(),
                    &sealed.ciphertext,
                    &sealed.tag,
                )?
            }
        };

        tracing::debug!(
            %algorithm,
            %format,
            plaintext_len = plaintext.len(),
            blob_len = blob.len(),
            "encrypted"
        );
        Ok(blob)
    }

    /// Decrypt a blob. See [`detect::resolve`] for how `format` is applied.
    pub fn decrypt(
        &self,
        blob: &[u8],
        algorithm: CipherAlgorithm,
        format: Option<FormatHint>,
        key: &KeyMaterial,
    ) -> MbsResult<Vec<u8>> {
        engine::ensure_supported(algorithm)?;
        engine::validate_key(algorithm, key)?;

        let version = detect::resolve(blob, format)?;
        let plaintext = match version {
            FormatVersion::V0 => {
                let parts = codec::decode_v0(blob)?;
                engine::open(algorithm, key, parts.nonce, parts.ciphertext, parts.tag)?
            }
            FormatVersion::V1 => {
                let parts = codec::decode_v1(blob)?;
                let params = AlgorithmParams::decode(parts.algorithm_id, parts.params)?;
                check_v1_params(algorithm, &params)?;
                engine::open(algorithm, key, params.iv(), parts.data, parts.tag)?
            }
        };

        tracing::debug!(
            %algorithm,
            format = %version,
            blob_len = blob.len(),
            plaintext_len = plaintext.len(),
            "decrypted"
        );
        Ok(plaintext)
    }

    /// Encrypt UTF-8 text; returns standard Base64.
    pub fn encrypt_string(
        &self,
        plaintext: &str,
        algorithm: CipherAlgorithm,
        format: Option<FormatVersion>,
        key: &KeyMaterial,
    ) -> MbsResult<String> {
        let blob = self.encrypt(plaintext.as_bytes(), algorithm, format, key)?;
        Ok(STANDARD.encode(blob))
    }

    /// Decrypt standard Base64 produced by [`Cipher::encrypt_string`].
    pub fn decrypt_string(
        &self,
        encoded: &str,
        algorithm: CipherAlgorithm,
        format: Option<FormatHint>,
        key: &KeyMaterial,
    ) -> MbsResult<String> {
        let blob = STANDARD
            .decode(encoded.trim())
            .map_err(|e| MbsError::InvalidInput(format!("invalid base64: {e}")))?;
        let plaintext = Zeroizing::new(self.decrypt(&blob, algorithm, format, key)?);
        std::str::from_utf8(&plaintext)
            .map(str::to_owned)
            .map_err(|e| MbsError::InvalidInput(format!("decrypted data is not UTF-8: {e}")))
    }
}

/// The blob must name the algorithm the caller asked for and carry params the
/// engine can honour.
fn check_v1_params(expected: CipherAlgorithm, params: &AlgorithmParams) -> MbsResult<()> {
    if params.algorithm() != expected {
        return Err(MbsError::InvalidInput(format!(
            "blob was sealed with {}, caller requested {expected}",
            params.algorithm()
        )));
    }
    match params {
        AlgorithmParams::AesGcm { tag_len, .. } if *tag_len as usize != TAG_SIZE => {
            Err(MbsError::InvalidInput(format!(
                "AES-GCM tagLen {tag_len} unsupported (expected {TAG_SIZE})"
            )))
        }
        AlgorithmParams::ChaCha20Poly1305 { counter, .. } if *counter != 0 => {
            Err(MbsError::InvalidInput(format!(
                "ChaCha20-Poly1305 initial counter {counter} unsupported (expected 0)"
            )))
        }
        _ => Ok(()),
    }
}

pub fn encrypt_data(
    plaintext: &[u8],
    algorithm: CipherAlgorithm,
    format: Option<FormatVersion>,
    key: &KeyMaterial,
) -> MbsResult<Vec<u8>> {
    Cipher::new().encrypt(plaintext, algorithm, format, key)
}

pub fn decrypt_data(
    blob: &[u8],
    algorithm: CipherAlgorithm,
    format: Option<FormatHint>,
    key: &KeyMaterial,
) -> MbsResult<Vec<u8>> {
    Cipher::new().decrypt(blob, algorithm, format, key)
}

pub fn encrypt_string(
    plaintext: &str,
    algorithm: CipherAlgorithm,
    format: Option<FormatVersion>,
    key: &KeyMaterial,
) -> MbsResult<String> {
    Cipher::new().encrypt_string(plaintext, algorithm, format, key)
}

pub fn decrypt_string(
    encoded: &str,
    algorithm: CipherAlgorithm,
    format: Option<FormatHint>,
    key: &KeyMaterial,
) -> MbsResult<String> {
    Cipher::new().decrypt_string(encoded, algorithm, format, key)
}
