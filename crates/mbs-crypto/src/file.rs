//! File encryption/decryption
//!
//! Sizes are checked from metadata before any buffer is allocated. Output
//! goes to a temporary file in the destination directory and is renamed into
//! place only after the full blob (or plaintext) is written, so a failed call
//! never leaves a half-written destination behind.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use mbs_core::{CipherAlgorithm, FormatHint, FormatVersion, MbsError, MbsResult};
use zeroize::Zeroizing;

use crate::cipher::Cipher;
use crate::codec;
use crate::detect;
use crate::engine;
use crate::keys::KeyMaterial;
use crate::random::{OsRandom, RandomSource};
use crate::registry;

/// Largest plaintext file accepted for encryption (10 MiB).
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Largest encrypted file accepted for decryption.
fn max_encrypted_size() -> u64 {
    let overhead = registry::max_v1_overhead().max(crate::V0_MIN_LEN);
    MAX_FILE_SIZE + overhead as u64
}

impl<R: RandomSource> Cipher<R> {
    pub fn encrypt_file(
        &self,
        source: &Path,
        destination: &Path,
        algorithm: CipherAlgorithm,
        format: Option<FormatVersion>,
        key: &KeyMaterial,
    ) -> MbsResult<()> {
        engine::ensure_supported(algorithm)?;
        engine::validate_key(algorithm, key)?;

        let plaintext = read_bounded(source, MAX_FILE_SIZE)?;
        let blob = self.encrypt(&plaintext, algorithm, format, key)?;
        write_atomic(destination, &blob)?;

        tracing::info!(
            source = %source.display(),
            destination = %destination.display(),
            bytes = blob.len(),
            "file encrypted"
        );
        Ok(())
    }

    pub fn decrypt_file(
        &self,
        source: &Path,
        destination: &Path,
        algorithm: CipherAlgorithm,
        format: Option<FormatHint>,
        key: &KeyMaterial,
    ) -> MbsResult<()> {
        engine::ensure_supported(algorithm)?;
        engine::validate_key(algorithm, key)?;

        let blob = read_bounded(source, max_encrypted_size())?;
        let plaintext = Zeroizing::new(self.decrypt(&blob, algorithm, format, key)?);
        write_atomic(destination, &plaintext)?;

        tracing::info!(
            source = %source.display(),
            destination = %destination.display(),
            bytes = plaintext.len(),
            "file decrypted"
        );
        Ok(())
    }
}

pub fn encrypt_file(
    source: &Path,
    destination: &Path,
    algorithm: CipherAlgorithm,
    format: Option<FormatVersion>,
    key: &KeyMaterial,
) -> MbsResult<()> {
    Cipher::<OsRandom>::new().encrypt_file(source, destination, algorithm, format, key)
}

pub fn decrypt_file(
    source: &Path,
    destination: &Path,
    algorithm: CipherAlgorithm,
    format: Option<FormatHint>,
    key: &KeyMaterial,
) -> MbsResult<()> {
    Cipher::<OsRandom>::new().decrypt_file(source, destination, algorithm, format, key)
}

/// Result of [`detect_file`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetectedFile {
    pub version: FormatVersion,
    pub size: usize,
    /// Algorithm named in the V1 header; `None` for V0.
    pub algorithm: Option<CipherAlgorithm>,
}

/// Classify an encrypted file. Size limits match [`decrypt_file`].
pub fn detect_file(path: &Path) -> MbsResult<DetectedFile> {
    let blob = read_bounded(path, max_encrypted_size())?;
    let version = detect::detect(&blob)?;
    let algorithm = match version {
        FormatVersion::V0 => None,
        FormatVersion::V1 => {
            let parts = codec::decode_v1(&blob)?;
            Some(registry::schema_for(parts.algorithm_id)?.algorithm)
        }
    };

    tracing::debug!(path = %path.display(), %version, size = blob.len(), "file detected");
    Ok(DetectedFile {
        version,
        size: blob.len(),
        algorithm,
    })
}

/// Read a whole regular file of at most `limit` bytes.
pub(crate) fn read_bounded(path: &Path, limit: u64) -> MbsResult<Zeroizing<Vec<u8>>> {
    let file = File::open(path).map_err(|e| MbsError::from_io(e, path))?;
    let metadata = file.metadata().map_err(|e| MbsError::from_io(e, path))?;
    if !metadata.is_file() {
        return Err(MbsError::IoFailure(format!(
            "{}: not a regular file",
            path.display()
        )));
    }
    if metadata.len() > limit {
        return Err(MbsError::FileTooLarge(format!(
            "{}: {} bytes exceeds limit of {limit}",
            path.display(),
            metadata.len()
        )));
    }

    let mut buf = Zeroizing::new(Vec::new());
    buf.try_reserve_exact(metadata.len() as usize)
        .map_err(|e| MbsError::BufferAllocation(format!("{}: {e}", path.display())))?;
    // The file may grow between stat and read
    file.take(limit + 1)
        .read_to_end(&mut buf)
        .map_err(|e| MbsError::from_io(e, path))?;
    if buf.len() as u64 > limit {
        return Err(MbsError::FileTooLarge(format!(
            "{}: grew past limit of {limit} while reading",
            path.display()
        )));
    }
    Ok(buf)
}

/// Write `bytes` to a sibling temp file, fsync, then rename over `path`.
fn write_atomic(path: &Path, bytes: &[u8]) -> MbsResult<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut tmp =
        tempfile::NamedTempFile::new_in(parent).map_err(|e| MbsError::from_io(e, parent))?;
    tmp.write_all(bytes)
        .map_err(|e| MbsError::from_io(e, path))?;
    tmp.as_file()
        .sync_all()
        .map_err(|e| MbsError::from_io(e, path))?;
    tmp.persist(path)
        .map_err(|e| MbsError::from_io(e.error, path))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const GCM: CipherAlgorithm = CipherAlgorithm::AesGcm;

    fn key() -> KeyMaterial {
        KeyMaterial::from_vec(vec![0x24u8; 32])
    }

    #[test]
    fn test_file_roundtrip_v1() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("document.pdf");
        let enc = tmp.path().join("document.encrypted");
        let out = tmp.path().join("document.out");
        std::fs::write(&src, b"%PDF-1.7 pretend document").unwrap();

        encrypt_file(&src, &enc, GCM, Some(FormatVersion::V1), &key()).unwrap();
        let blob = std::fs::read(&enc).unwrap();
        assert_eq!(&blob[..4], b"SECB");

        decrypt_file(&enc, &out, GCM, Some(FormatHint::Detect), &key()).unwrap();
        assert_eq!(std::fs::read(&out).unwrap(), b"%PDF-1.7 pretend document");
    }

    #[test]
    fn test_file_too_large() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("big.bin");
        let f = File::create(&src).unwrap();
        f.set_len(MAX_FILE_SIZE + 1).unwrap();
        drop(f);

        let result = encrypt_file(&src, &tmp.path().join("big.enc"), GCM, None, &key());
        assert!(matches!(result, Err(MbsError::FileTooLarge(_))));
        assert!(!tmp.path().join("big.enc").exists());
    }

    #[test]
    fn test_file_at_limit() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("limit.bin");
        let f = File::create(&src).unwrap();
        f.set_len(MAX_FILE_SIZE).unwrap();
        drop(f);

        let enc = tmp.path().join("limit.enc");
        encrypt_file(&src, &enc, GCM, Some(FormatVersion::V1), &key()).unwrap();
        decrypt_file(&enc, &tmp.path().join("limit.out"), GCM, Some(FormatHint::Detect), &key())
            .unwrap();
    }

    #[test]
    fn test_detect_file_reports_format() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("plain.txt");
        let v0 = tmp.path().join("plain.v0");
        let v1 = tmp.path().join("plain.v1");
        std::fs::write(&src, b"hello").unwrap();

        encrypt_file(&src, &v0, GCM, None, &key()).unwrap();
        encrypt_file(
            &src,
            &v1,
            CipherAlgorithm::ChaCha20Poly1305,
            Some(FormatVersion::V1),
            &key(),
        )
        .unwrap();

        let found = detect_file(&v0).unwrap();
        assert_eq!(found.version, FormatVersion::V0);
        assert_eq!(found.size, 5 + 28);
        assert_eq!(found.algorithm, None);

        let found = detect_file(&v1).unwrap();
        assert_eq!(found.version, FormatVersion::V1);
        assert_eq!(found.algorithm, Some(CipherAlgorithm::ChaCha20Poly1305));
    }

    #[test]
    fn test_detect_file_too_large() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("huge.bin");
        let f = File::create(&src).unwrap();
        f.set_len(MAX_FILE_SIZE + 41).unwrap();
        drop(f);

        assert!(matches!(
            detect_file(&src),
            Err(MbsError::FileTooLarge(_))
        ));
    }

    #[test]
    fn test_detect_file_short() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("short.bin");
        std::fs::write(&src, [0u8; 27]).unwrap();

        assert!(matches!(
            detect_file(&src),
            Err(MbsError::FormatDetectionFailed(_))
        ));
    }

    #[test]
    fn test_missing_source() {
        let tmp = TempDir::new().unwrap();
        let result = encrypt_file(
            &tmp.path().join("absent"),
            &tmp.path().join("out"),
            GCM,
            None,
            &key(),
        );
        assert!(matches!(result, Err(MbsError::IoFailure(_))));
    }

    #[test]
    fn test_directory_source_rejected() {
        let tmp = TempDir::new().unwrap();
        let result = encrypt_file(tmp.path(), &tmp.path().join("out"), GCM, None, &key());
        assert!(matches!(result, Err(MbsError::IoFailure(_))));
    }

    #[test]
    fn test_failed_decrypt_leaves_destination_untouched() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("plain.txt");
        let enc = tmp.path().join("plain.enc");
        let out = tmp.path().join("existing.txt");
        std::fs::write(&src, b"secret data").unwrap();
        std::fs::write(&out, b"previous contents").unwrap();

        encrypt_file(&src, &enc, GCM, None, &key()).unwrap();
        let mut blob = std::fs::read(&enc).unwrap();
        let last = blob.len() - 1;
        blob[last] ^= 0x80;
        std::fs::write(&enc, &blob).unwrap();

        let result = decrypt_file(&enc, &out, GCM, None, &key());
        assert!(matches!(result, Err(MbsError::AuthenticationFailed(_))));
        assert_eq!(std::fs::read(&out).unwrap(), b"previous contents");

        // No stray temp files
        let entries = std::fs::read_dir(tmp.path()).unwrap().count();
        assert_eq!(entries, 3);
    }

    #[test]
    fn test_invalid_key_checked_before_reading() {
        let tmp = TempDir::new().unwrap();
        let short = KeyMaterial::from_vec(vec![0u8; 31]);
        // Source does not exist: key validation must fire first
        let result = encrypt_file(
            &tmp.path().join("absent"),
            &tmp.path().join("out"),
            GCM,
            None,
            &short,
        );
        assert!(matches!(result, Err(MbsError::InvalidKey(_))));
    }

    #[test]
    fn test_missing_destination_directory() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("plain.txt");
        std::fs::write(&src, b"data").unwrap();

        let result = encrypt_file(
            &src,
            &tmp.path().join("no/such/dir/out.enc"),
            GCM,
            None,
            &key(),
        );
        assert!(matches!(result, Err(MbsError::IoFailure(_))));
    }
}
