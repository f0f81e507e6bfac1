//! V0 and V1 secure-block framing
//!
//! ```text
//! V0: [12 bytes: nonce][N bytes: ciphertext][16 bytes: tag]
//! V1: [4: "SECB"][1: 0x01][1: alg id][2: params len, BE][params][data][tag]
//! ```
//!
//! Encoders are pure: identical inputs give identical bytes. Nonce
//! generation belongs to the caller. Decoders borrow from the input.

use mbs_core::{MbsError, MbsResult};

use crate::registry::schema_for;
use crate::{NONCE_SIZE, TAG_SIZE, V0_MIN_LEN, V1_HEADER_LEN, V1_MAGIC, V1_VERSION};

/// Components of a V0 blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct V0Parts<'a> {
    pub nonce: &'a [u8],
    pub ciphertext: &'a [u8],
    pub tag: &'a [u8],
}

/// Components of a V1 blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct V1Parts<'a> {
    pub algorithm_id: u8,
    pub params: &'a [u8],
    pub data: &'a [u8],
    pub tag: &'a [u8],
}

pub fn encode_v0(nonce: &[u8], ciphertext: &[u8], tag: &[u8]) -> MbsResult<Vec<u8>> {
    if nonce.len() != NONCE_SIZE {
        return Err(MbsError::InvalidInput(format!(
            "V0 nonce must be {NONCE_SIZE} bytes, got {}",
            nonce.len()
        )));
    }
    if tag.len() != TAG_SIZE {
        return Err(MbsError::InvalidInput(format!(
            "V0 tag must be {TAG_SIZE} bytes, got {}",
            tag.len()
        )));
    }

    let mut out = Vec::with_capacity(NONCE_SIZE + ciphertext.len() + TAG_SIZE);
    out.extend_from_slice(nonce);
    out.extend_from_slice(ciphertext);
    out.extend_from_slice(tag);
    Ok(out)
}

pub fn decode_v0(bytes: &[u8]) -> MbsResult<V0Parts<'_>> {
    if bytes.len() < V0_MIN_LEN {
        return Err(MbsError::InvalidInput(format!(
            "V0 blob too short: {} bytes (minimum {V0_MIN_LEN})",
            bytes.len()
        )));
    }

    let (nonce, rest) = bytes.split_at(NONCE_SIZE);
    let (ciphertext, tag) = rest.split_at(rest.len() - TAG_SIZE);
    Ok(V0Parts {
        nonce,
        ciphertext,
        tag,
    })
}

pub fn encode_v1(algorithm_id: u8, params: &[u8], data: &[u8], tag: &[u8]) -> MbsResult<Vec<u8>> {
    let schema = schema_for(algorithm_id).map_err(|_| {
        MbsError::UnsupportedFormat(format!(
            "cannot frame unknown algorithm id 0x{algorithm_id:02x}"
        ))
    })?;
    if params.len() != schema.params_len() {
        return Err(MbsError::UnsupportedFormat(format!(
            "{} params must be {} bytes, got {}",
            schema.algorithm,
            schema.params_len(),
            params.len()
        )));
    }
    if tag.len() != schema.tag_len {
        return Err(MbsError::InvalidInput(format!(
            "{} tag must be {} bytes, got {}",
            schema.algorithm,
            schema.tag_len,
            tag.len()
        )));
    }

    // Every registered schema fits in u16.
    let params_len = params.len() as u16;

    let mut out = Vec::with_capacity(V1_HEADER_LEN + params.len() + data.len() + tag.len());
    out.extend_from_slice(&V1_MAGIC);
    out.push(V1_VERSION);
    out.push(algorithm_id);
    out.extend_from_slice(&params_len.to_be_bytes());
    out.extend_from_slice(params);
    out.extend_from_slice(data);
    out.extend_from_slice(tag);
    Ok(out)
}

pub fn decode_v1(bytes: &[u8]) -> MbsResult<V1Parts<'_>> {
    if bytes.len() < V1_MAGIC.len() || bytes[..V1_MAGIC.len()] != V1_MAGIC {
        return Err(MbsError::UnsupportedFormat("missing V1 magic".into()));
    }
    match bytes.get(4) {
        Some(&V1_VERSION) => {}
        Some(other) => {
            return Err(MbsError::UnsupportedFormat(format!(
                "unsupported V1 version byte 0x{other:02x}"
            )))
        }
        None => return Err(MbsError::UnsupportedFormat("missing V1 version byte".into())),
    }
    if bytes.len() < V1_HEADER_LEN {
        return Err(MbsError::InvalidInput(format!(
            "V1 header truncated: {} bytes (need {V1_HEADER_LEN})",
            bytes.len()
        )));
    }

    let algorithm_id = bytes[5];
    let schema = schema_for(algorithm_id)?;
    let params_len = u16::from_be_bytes([bytes[6], bytes[7]]) as usize;
    if params_len != schema.params_len() {
        return Err(MbsError::UnsupportedFormat(format!(
            "{} params length {params_len} does not match schema ({})",
            schema.algorithm,
            schema.params_len()
        )));
    }

    let body = &bytes[V1_HEADER_LEN..];
    if body.len() < params_len + schema.tag_len {
        return Err(MbsError::InvalidInput(format!(
            "V1 body too short: {} bytes (need at least {})",
            body.len(),
            params_len + schema.tag_len
        )));
    }

    let (params, rest) = body.split_at(params_len);
    let (data, tag) = rest.split_at(rest.len() - schema.tag_len);
    Ok(V1Parts {
        algorithm_id,
        params,
        data,
        tag,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gcm_params() -> Vec<u8> {
        let mut p = vec![0x11u8; 12];
        p.extend_from_slice(&16u32.to_be_bytes());
        p
    }

    #[test]
    fn test_v0_layout() {
        let blob = encode_v0(&[1u8; 12], b"abc", &[2u8; 16]).unwrap();

        assert_eq!(blob.len(), 12 + 3 + 16);
        assert_eq!(&blob[..12], &[1u8; 12]);
        assert_eq!(&blob[12..15], b"abc");
        assert_eq!(&blob[15..], &[2u8; 16]);
    }

    #[test]
    fn test_v0_rejects_bad_widths() {
        assert!(matches!(
            encode_v0(&[0u8; 11], b"", &[0u8; 16]),
            Err(MbsError::InvalidInput(_))
        ));
        assert!(matches!(
            encode_v0(&[0u8; 12], b"", &[0u8; 15]),
            Err(MbsError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_v0_empty_ciphertext() {
        let blob = [9u8; 28];
        let parts = decode_v0(&blob).unwrap();
        assert!(parts.ciphertext.is_empty());
        assert_eq!(parts.nonce.len(), 12);
        assert_eq!(parts.tag.len(), 16);
    }

    #[test]
    fn test_v0_too_short() {
        assert!(matches!(
            decode_v0(&[0u8; 27]),
            Err(MbsError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_v1_layout() {
        let params = gcm_params();
        let blob = encode_v1(0x01, &params, b"data", &[0xEE; 16]).unwrap();

        assert_eq!(&blob[..4], b"SECB");
        assert_eq!(blob[4], 0x01);
        assert_eq!(blob[5], 0x01);
        assert_eq!(&blob[6..8], &[0x00, 0x10]);
        assert_eq!(&blob[8..24], params.as_slice());
        assert_eq!(&blob[24..28], b"data");
        assert_eq!(&blob[28..], &[0xEE; 16]);
    }

    #[test]
    fn test_v1_decode_splits_parts() {
        let params = gcm_params();
        let blob = encode_v1(0x01, &params, b"payload", &[0xEE; 16]).unwrap();
        let parts = decode_v1(&blob).unwrap();

        assert_eq!(parts.algorithm_id, 0x01);
        assert_eq!(parts.params, params.as_slice());
        assert_eq!(parts.data, b"payload");
        assert_eq!(parts.tag, &[0xEE; 16]);
    }

    #[test]
    fn test_v1_untagged_algorithm() {
        let blob = encode_v1(0x02, &[0x33; 16], b"block-data", &[]).unwrap();
        let parts = decode_v1(&blob).unwrap();

        assert_eq!(parts.data, b"block-data");
        assert!(parts.tag.is_empty());
    }

    #[test]
    fn test_v1_encode_unknown_algorithm() {
        assert!(matches!(
            encode_v1(0x42, &[0u8; 16], b"", &[0u8; 16]),
            Err(MbsError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_v1_encode_params_mismatch() {
        assert!(matches!(
            encode_v1(0x01, &[0u8; 12], b"", &[0u8; 16]),
            Err(MbsError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_v1_bad_magic_and_version() {
        let mut blob = encode_v1(0x01, &gcm_params(), b"x", &[0u8; 16]).unwrap();

        let mut bad_magic = blob.clone();
        bad_magic[0] = b'X';
        assert!(matches!(
            decode_v1(&bad_magic),
            Err(MbsError::UnsupportedFormat(_))
        ));

        blob[4] = 0x02;
        assert!(matches!(
            decode_v1(&blob),
            Err(MbsError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_v1_unknown_algorithm_on_decode() {
        let mut blob = encode_v1(0x01, &gcm_params(), b"x", &[0u8; 16]).unwrap();
        blob[5] = 0x7F;
        assert!(matches!(
            decode_v1(&blob),
            Err(MbsError::UnsupportedAlgorithm(_))
        ));
    }

    #[test]
    fn test_v1_params_len_tampered() {
        let mut blob = encode_v1(0x01, &gcm_params(), b"x", &[0u8; 16]).unwrap();
        blob[7] = 0x0F;
        assert!(matches!(
            decode_v1(&blob),
            Err(MbsError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_v1_truncated() {
        let blob = encode_v1(0x01, &gcm_params(), b"", &[0u8; 16]).unwrap();
        assert!(decode_v1(&blob).is_ok());

        let truncated = &blob[..blob.len() - 1];
        assert!(matches!(
            decode_v1(truncated),
            Err(MbsError::InvalidInput(_))
        ));
        assert!(matches!(
            decode_v1(&blob[..6]),
            Err(MbsError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_encoders_are_deterministic() {
        let a = encode_v1(0x11, &[5u8; 16], b"same", &[6u8; 16]).unwrap();
        let b = encode_v1(0x11, &[5u8; 16], b"same", &[6u8; 16]).unwrap();
        assert_eq!(a, b);
    }
}
