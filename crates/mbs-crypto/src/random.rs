//! Cryptographically secure random bytes

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use mbs_core::{MbsError, MbsResult};
use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::Zeroizing;

/// Largest single random-generation request (1 MiB).
pub const MAX_RANDOM_BYTES: usize = 1_048_576;

/// Source of secure random bytes.
pub trait RandomSource {
    fn fill_bytes(&self, dest: &mut [u8]) -> MbsResult<()>;
}

/// The operating system CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsRandom;

impl RandomSource for OsRandom {
    fn fill_bytes(&self, dest: &mut [u8]) -> MbsResult<()> {
        OsRng
            .try_fill_bytes(dest)
            .map_err(|e| MbsError::GenerationFailed(format!("OS RNG: {e}")))
    }
}

/// Generate `count` random bytes (1..=1 MiB) from the OS RNG.
pub fn generate_bytes(count: usize) -> MbsResult<Vec<u8>> {
    generate_bytes_with(&OsRandom, count)
}

/// Generate `count` random bytes from `source`.
pub fn generate_bytes_with<R: RandomSource + ?Sized>(
    source: &R,
    count: usize,
) -> MbsResult<Vec<u8>> {
    if count == 0 || count > MAX_RANDOM_BYTES {
        return Err(MbsError::InvalidByteCount(format!(
            "requested {count} bytes, allowed 1..={MAX_RANDOM_BYTES}"
        )));
    }

    let mut buf = Zeroizing::new(Vec::new());
    buf.try_reserve_exact(count)
        .map_err(|e| MbsError::BufferAllocation(format!("{count} bytes: {e}")))?;
    buf.resize(count, 0);
    source.fill_bytes(&mut buf)?;

    Ok(std::mem::take(&mut *buf))
}

/// Random bytes as lowercase hex (`2 * count` characters).
pub fn generate_hex(count: usize) -> MbsResult<String> {
    let bytes = Zeroizing::new(generate_bytes(count)?);
    Ok(hex::encode(&*bytes))
}

/// Random bytes as standard padded Base64.
pub fn generate_base64(count: usize) -> MbsResult<String> {
    let bytes = Zeroizing::new(generate_bytes(count)?);
    Ok(STANDARD.encode(&*bytes))
}
