use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{MbsError, MbsResult};
use crate::types::{CipherAlgorithm, FormatVersion, HashAlgorithm};

/// Top-level configuration (loaded from mbs.toml)
///
/// Only front ends read this; the library operations take every parameter
/// explicitly and never consult it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MbsConfig {
    pub logging: LoggingConfig,
    pub cipher: CipherConfig,
    pub kdf: KdfConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (default: info)
    pub level: String,
    /// Log format: "json" or "text"
    pub format: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CipherConfig {
    /// Algorithm used when none is given on the command line
    pub algorithm: CipherAlgorithm,
    /// Output format for encryption (default: v0)
    pub format: FormatVersion,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KdfConfig {
    /// Derived key size in bytes (default: 32)
    pub key_size: usize,
    /// HKDF hash (default: sha256)
    pub hash: HashAlgorithm,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "text".into(),
        }
    }
}

impl Default for KdfConfig {
    fn default() -> Self {
        Self {
            key_size: 32,
            hash: HashAlgorithm::Sha256,
        }
    }
}

impl MbsConfig {
    /// Read and parse a TOML config file. A missing file yields defaults.
    pub fn load(path: &Path) -> MbsResult<Self> {
        if !path.exists() {
            tracing::warn!("config file not found: {}  (using defaults)", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| MbsError::Config(format!("reading config {}: {e}", path.display())))?;
        toml::from_str(&content)
            .map_err(|e| MbsError::Config(format!("parsing config {}: {e}", path.display())))
    }
}
