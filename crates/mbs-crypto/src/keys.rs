//! Sensitive key buffers

use mbs_core::{MbsError, MbsResult};
use zeroize::Zeroize;

/// Owned key bytes. Zeroized on drop.
///
/// Not `Clone`: copies must be made explicitly with [`KeyMaterial::from_slice`].
/// Zeroing is best-effort. It covers this buffer, but not copies the caller
/// made before handing the bytes over, nor bytes left behind by a
/// reallocation of the source `Vec`.
pub struct KeyMaterial {
    bytes: Vec<u8>,
}

impl KeyMaterial {
    /// Take ownership of `bytes` without copying.
    pub fn from_vec(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Copy `bytes` into a new buffer.
    pub fn from_slice(bytes: &[u8]) -> Self {
        Self {
            bytes: bytes.to_vec(),
        }
    }

    /// Parse a hex-encoded key (e.g. from a CLI flag or env var).
    pub fn from_hex(hex_str: &str) -> MbsResult<Self> {
        hex::decode(hex_str.trim())
            .map(Self::from_vec)
            .map_err(|e| MbsError::InvalidKey(format!("key is not valid hex: {e}")))
    }

    /// Fresh random key of `len` bytes from the OS RNG.
    pub fn generate(len: usize) -> MbsResult<Self> {
        crate::random::generate_bytes(len).map(Self::from_vec)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl Drop for KeyMaterial {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

impl std::fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("len", &self.bytes.len())
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}
