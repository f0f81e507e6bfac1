use thiserror::Error;

pub type MbsResult<T> = Result<T, MbsError>;

/// Every failure a mbsecure operation can report.
///
/// Each variant has a stable numeric code (see [`MbsError::code`]) for callers
/// that classify failures across an FFI or logging boundary.
#[derive(Debug, Error)]
pub enum MbsError {
    // Random generation
    #[error("invalid byte count: {0}")]
    InvalidByteCount(String),

    #[error("random generation failed: {0}")]
    GenerationFailed(String),

    #[error("buffer allocation failed: {0}")]
    BufferAllocation(String),

    // Input validation
    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("invalid IV: {0}")]
    InvalidIv(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("format detection failed: {0}")]
    FormatDetectionFailed(String),

    #[error("format mismatch: {0}")]
    FormatMismatch(String),

    // Engine
    #[error("encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("decryption failed: {0}")]
    DecryptionFailed(String),

    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    // File operations
    #[error("I/O failure: {0}")]
    IoFailure(String),

    #[error("file too large: {0}")]
    FileTooLarge(String),

    #[error("file permission denied: {0}")]
    FilePermission(String),

    #[error("config error: {0}")]
    Config(String),
}

impl MbsError {
    /// Stable numeric code for this error kind.
    pub fn code(&self) -> u16 {
        match self {
            MbsError::InvalidByteCount(_) => 100,
            MbsError::GenerationFailed(_) => 101,
            MbsError::BufferAllocation(_) => 102,
            MbsError::InvalidKey(_) => 200,
            MbsError::InvalidIv(_) => 201,
            MbsError::InvalidInput(_) => 202,
            MbsError::UnsupportedAlgorithm(_) => 203,
            MbsError::UnsupportedFormat(_) => 204,
            MbsError::FormatDetectionFailed(_) => 205,
            MbsError::FormatMismatch(_) => 206,
            MbsError::EncryptionFailed(_) => 210,
            MbsError::DecryptionFailed(_) => 211,
            MbsError::AuthenticationFailed(_) => 212,
            MbsError::IoFailure(_) => 220,
            MbsError::FileTooLarge(_) => 221,
            MbsError::FilePermission(_) => 222,
            MbsError::Config(_) => 300,
        }
    }

    /// Classify an I/O error raised while touching `path`.
    pub fn from_io(err: std::io::Error, path: &std::path::Path) -> Self {
        let msg = format!("{}: {err}", path.display());
        match err.kind() {
            std::io::ErrorKind::PermissionDenied => MbsError::FilePermission(msg),
            _ => MbsError::IoFailure(msg),
        }
    }
}
