//! Blob format detection and format resolution for decryption

use mbs_core::{FormatHint, FormatVersion, MbsError, MbsResult};

use crate::{V0_MIN_LEN, V1_MAGIC, V1_VERSION};

/// Whether `bytes` starts with the V1 magic and supported version byte.
pub fn is_v1(bytes: &[u8]) -> bool {
    bytes.len() > V1_MAGIC.len() && bytes[..V1_MAGIC.len()] == V1_MAGIC && bytes[4] == V1_VERSION
}

/// Classify a blob as V1 (magic + version) or V0 (long enough), else fail.
///
/// A V0 blob whose random nonce happens to begin with `SECB\x01` is
/// classified as V1; the odds are 2^-40 per blob.
pub fn detect(bytes: &[u8]) -> MbsResult<FormatVersion> {
    if is_v1(bytes) {
        return Ok(FormatVersion::V1);
    }
    if bytes.len() >= V0_MIN_LEN {
        return Ok(FormatVersion::V0);
    }
    Err(MbsError::FormatDetectionFailed(format!(
        "{} bytes match no known format (V0 needs at least {V0_MIN_LEN})",
        bytes.len()
    )))
}

/// Decide which decoder to run for `bytes`.
///
/// - `None`: V0, detection skipped
/// - `Some(Detect)`: whatever [`detect`] says
/// - `Some(Version(v))`: detection must agree with `v`
pub fn resolve(bytes: &[u8], hint: Option<FormatHint>) -> MbsResult<FormatVersion> {
    match hint {
        None => Ok(FormatVersion::V0),
        Some(FormatHint::Detect) => detect(bytes),
        Some(FormatHint::Version(expected)) => {
            let detected = detect(bytes)?;
            if detected != expected {
                return Err(MbsError::FormatMismatch(format!(
                    "caller asserted {expected}, blob looks like {detected}"
                )));
            }
            Ok(expected)
        }
    }
}
