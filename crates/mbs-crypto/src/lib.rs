//! mbs-crypto: versioned secure-block codec and crypto façade
//!
//! Encrypt pipeline: validate → fresh nonce (OS RNG) → AEAD seal → frame (V0 or V1)
//!
//! Decrypt pipeline: resolve format (explicit / detect / V0 default) → unframe → AEAD open
//!
//! Wire formats:
//! ```text
//! V0: [12 bytes: nonce][N bytes: ciphertext][16 bytes: tag]
//! V1: ["SECB"][0x01][alg id][params len, u16 BE][params][data][tag (alg dependent)]
//! ```
//!
//! Derived keys use HKDF with the info string
//! `com.mavbozo.mbsecurecrypto.<domain>.v1:<context>`.

pub mod cipher;
pub mod codec;
pub mod detect;
pub mod engine;
pub mod file;
pub mod kdf;
pub mod keys;
pub mod random;
pub mod registry;

pub use cipher::{decrypt_data, decrypt_string, encrypt_data, encrypt_string, Cipher};
pub use codec::{decode_v0, decode_v1, encode_v0, encode_v1, V0Parts, V1Parts};
pub use detect::detect;
pub use file::{decrypt_file, detect_file, encrypt_file, DetectedFile, MAX_FILE_SIZE};
pub use kdf::{derive, derive_key, DerivationRequest};
pub use keys::KeyMaterial;
pub use random::{
    generate_base64, generate_bytes, generate_hex, OsRandom, RandomSource, MAX_RANDOM_BYTES,
};
pub use registry::{schema_for, wire_code_for, AlgorithmParams, ParamSchema};

pub use mbs_core::{CipherAlgorithm, FormatHint, FormatVersion, HashAlgorithm, MbsError, MbsResult};

/// Size of an AES-256 / ChaCha20 key in bytes
pub const KEY_SIZE: usize = 32;

/// Size of the AES-GCM / ChaCha20-Poly1305 nonce (96-bit)
pub const NONCE_SIZE: usize = 12;

/// Size of a GCM / Poly1305 authentication tag
pub const TAG_SIZE: usize = 16;

/// Smallest valid V0 blob: nonce + tag, empty ciphertext
pub const V0_MIN_LEN: usize = NONCE_SIZE + TAG_SIZE;

/// V1 magic, "SECB"
pub const V1_MAGIC: [u8; 4] = *b"SECB";

/// V1 version byte
pub const V1_VERSION: u8 = 0x01;

/// magic(4) + version(1) + algorithm id(1) + params len(2)
pub const V1_HEADER_LEN: usize = 8;
