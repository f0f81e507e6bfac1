pub mod config;
pub mod error;
pub mod types;

pub use error::{MbsError, MbsResult};
pub use types::{CipherAlgorithm, FormatHint, FormatVersion, HashAlgorithm};
