//! Adapter over the AEAD engines (`aes-gcm`, `chacha20poly1305`)
//!
//! Detached-tag API: ciphertext and tag come back separately so either wire
//! format can place them. No associated data is bound; both formats frame
//! only nonce, ciphertext and tag.

use aes_gcm::aead::{AeadInPlace, KeyInit, Nonce, Tag};
use aes_gcm::Aes256Gcm;
use chacha20poly1305::ChaCha20Poly1305;
use mbs_core::{CipherAlgorithm, MbsError, MbsResult};

use crate::keys::KeyMaterial;
use crate::{NONCE_SIZE, TAG_SIZE};

/// Output of a seal: ciphertext (same length as plaintext) and tag.
#[derive(Debug)]
pub struct Sealed {
    pub ciphertext: Vec<u8>,
    pub tag: [u8; TAG_SIZE],
}

/// Fail unless the engine can seal/open `algorithm`.
pub fn ensure_supported(algorithm: CipherAlgorithm) -> MbsResult<()> {
    if algorithm.is_aead() {
        Ok(())
    } else {
        Err(MbsError::UnsupportedAlgorithm(format!(
            "{algorithm} has a registered wire format but no authenticated engine"
        )))
    }
}

/// Check `key` is exactly the length `algorithm` needs.
pub fn validate_key(algorithm: CipherAlgorithm, key: &KeyMaterial) -> MbsResult<()> {
    if key.len() != algorithm.key_len() {
        return Err(MbsError::InvalidKey(format!(
            "{algorithm} requires a {}-byte key, got {}",
            algorithm.key_len(),
            key.len()
        )));
    }
    Ok(())
}

pub fn seal(
    algorithm: CipherAlgorithm,
    key: &KeyMaterial,
    nonce: &[u8],
    plaintext: &[u8],
) -> MbsResult<Sealed> {
    ensure_supported(algorithm)?;
    check_nonce(nonce)?;
    match algorithm {
        CipherAlgorithm::ChaCha20Poly1305 => {
            seal_with::<ChaCha20Poly1305>(key.as_bytes(), nonce, plaintext)
        }
        _ => seal_with::<Aes256Gcm>(key.as_bytes(), nonce, plaintext),
    }
}

/// Verify `tag` and decrypt. A tag mismatch is `AuthenticationFailed`.
pub fn open(
    algorithm: CipherAlgorithm,
    key: &KeyMaterial,
    nonce: &[u8],
    ciphertext: &[u8],
    tag: &[u8],
) -> MbsResult<Vec<u8>> {
    ensure_supported(algorithm)?;
    check_nonce(nonce)?;
    if tag.len() != TAG_SIZE {
        return Err(MbsError::DecryptionFailed(format!(
            "engine expects a {TAG_SIZE}-byte tag, got {}",
            tag.len()
        )));
    }
    match algorithm {
        CipherAlgorithm::ChaCha20Poly1305 => {
            open_with::<ChaCha20Poly1305>(key.as_bytes(), nonce, ciphertext, tag)
        }
        _ => open_with::<Aes256Gcm>(key.as_bytes(), nonce, ciphertext, tag),
    }
}

fn check_nonce(nonce: &[u8]) -> MbsResult<()> {
    if nonce.len() != NONCE_SIZE {
        return Err(MbsError::InvalidIv(format!(
            "nonce must be {NONCE_SIZE} bytes, got {}",
            nonce.len()
        )));
    }
    Ok(())
}

fn seal_with<C: AeadInPlace + KeyInit>(
    key: &[u8],
    nonce: &[u8],
    plaintext: &[u8],
) -> MbsResult<Sealed> {
    let cipher =
        C::new_from_slice(key).map_err(|e| MbsError::InvalidKey(format!("engine key: {e}")))?;

    let mut buffer = plaintext.to_vec();
    let tag = cipher
        .encrypt_in_place_detached(Nonce::<C>::from_slice(nonce), b"", &mut buffer)
        .map_err(|e| MbsError::EncryptionFailed(format!("AEAD seal: {e}")))?;

    let mut tag_bytes = [0u8; TAG_SIZE];
    tag_bytes.copy_from_slice(tag.as_slice());
    Ok(Sealed {
        ciphertext: buffer,
        tag: tag_bytes,
    })
}

fn open_with<C: AeadInPlace + KeyInit>(
    key: &[u8],
    nonce: &[u8],
    ciphertext: &[u8],
    tag: &[u8],
) -> MbsResult<Vec<u8>> {
    let cipher =
        C::new_from_slice(key).map_err(|e| MbsError::DecryptionFailed(format!("engine key: {e}")))?;

    let mut buffer = ciphertext.to_vec();
    cipher
        .decrypt_in_place_detached(
            Nonce::<C>::from_slice(nonce),
            b"",
            &mut buffer,
            Tag::<C>::from_slice(tag),
        )
        .map_err(|_| {
            MbsError::AuthenticationFailed(
                "tag verification failed: wrong key or tampered data".into(),
            )
        })?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> KeyMaterial {
        KeyMaterial::from_vec(vec![7u8; 32])
    }

    #[test]
    fn test_seal_open_gcm() {
        let sealed = seal(CipherAlgorithm::AesGcm, &key(), &[1u8; 12], b"hello").unwrap();
        assert_eq!(sealed.ciphertext.len(), 5);

        let opened = open(
            CipherAlgorithm::AesGcm,
            &key(),
            &[1u8; 12],
            &sealed.ciphertext,
            &sealed.tag,
        )
        .unwrap();
        assert_eq!(opened, b"hello");
    }

    #[test]
    fn test_seal_open_chacha() {
        let alg = CipherAlgorithm::ChaCha20Poly1305;
        let sealed = seal(alg, &key(), &[2u8; 12], b"hello").unwrap();
        let opened = open(alg, &key(), &[2u8; 12], &sealed.ciphertext, &sealed.tag).unwrap();
        assert_eq!(opened, b"hello");
    }

    #[test]
    fn test_engines_produce_different_ciphertext() {
        let gcm = seal(CipherAlgorithm::AesGcm, &key(), &[0u8; 12], b"same input").unwrap();
        let chacha = seal(
            CipherAlgorithm::ChaCha20Poly1305,
            &key(),
            &[0u8; 12],
            b"same input",
        )
        .unwrap();
        assert_ne!(gcm.ciphertext, chacha.ciphertext);
    }

    #[test]
    fn test_bad_tag_is_authentication_failure() {
        let sealed = seal(CipherAlgorithm::AesGcm, &key(), &[1u8; 12], b"hello").unwrap();
        let mut tag = sealed.tag;
        tag[0] ^= 0x01;

        let result = open(
            CipherAlgorithm::AesGcm,
            &key(),
            &[1u8; 12],
            &sealed.ciphertext,
            &tag,
        );
        assert!(matches!(result, Err(MbsError::AuthenticationFailed(_))));
    }

    #[test]
    fn test_wrong_nonce_size() {
        let result = seal(CipherAlgorithm::AesGcm, &key(), &[1u8; 16], b"x");
        assert!(matches!(result, Err(MbsError::InvalidIv(_))));
    }

    #[test]
    fn test_block_modes_unsupported() {
        let result = seal(CipherAlgorithm::AesCbc, &key(), &[1u8; 12], b"x");
        assert!(matches!(result, Err(MbsError::UnsupportedAlgorithm(_))));
    }

    #[test]
    fn test_validate_key_length() {
        let short = KeyMaterial::from_vec(vec![0u8; 16]);
        assert!(matches!(
            validate_key(CipherAlgorithm::AesGcm, &short),
            Err(MbsError::InvalidKey(_))
        ));
        assert!(validate_key(CipherAlgorithm::AesGcm, &key()).is_ok());
    }
}
