//! Algorithm registry: wire codes and V1 parameter schemas
//!
//! ```text
//! id    algorithm            params                         tag
//! 0x01  AES-GCM              iv(12) || tagLen(4, u32 BE)    16
//! 0x02  AES-CBC              iv(16)                          0
//! 0x03  AES-CTR              iv(16)                          0
//! 0x11  ChaCha20-Poly1305    nonce(12) || counter(4, u32 BE) 16
//! ```
//!
//! The codec and the params encoder/decoder both read field widths from this
//! table and nowhere else.

use mbs_core::{CipherAlgorithm, MbsError, MbsResult};

use crate::{NONCE_SIZE, TAG_SIZE};

/// One fixed-width field of a params block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamField {
    pub name: &'static str,
    pub size: usize,
}

/// Parameter layout and tag width for one algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamSchema {
    pub algorithm: CipherAlgorithm,
    pub wire_code: u8,
    pub fields: &'static [ParamField],
    pub tag_len: usize,
}

impl ParamSchema {
    /// Total params block size in bytes.
    pub fn params_len(&self) -> usize {
        self.fields.iter().map(|f| f.size).sum()
    }

    /// Split a params block into per-field slices, in schema order.
    fn split<'a>(&self, params: &'a [u8]) -> MbsResult<Vec<&'a [u8]>> {
        if params.len() != self.params_len() {
            return Err(MbsError::UnsupportedFormat(format!(
                "{} params must be {} bytes, got {}",
                self.algorithm,
                self.params_len(),
                params.len()
            )));
        }
        let mut out = Vec::with_capacity(self.fields.len());
        let mut offset = 0;
        for field in self.fields {
            out.push(&params[offset..offset + field.size]);
            offset += field.size;
        }
        Ok(out)
    }
}

const AES_GCM_FIELDS: &[ParamField] = &[
    ParamField { name: "iv", size: 12 },
    ParamField { name: "tagLen", size: 4 },
];

const AES_CBC_FIELDS: &[ParamField] = &[ParamField { name: "iv", size: 16 }];

const AES_CTR_FIELDS: &[ParamField] = &[ParamField { name: "iv", size: 16 }];

const CHACHA20_POLY1305_FIELDS: &[ParamField] = &[
    ParamField { name: "nonce", size: 12 },
    ParamField { name: "counter", size: 4 },
];

static SCHEMAS: [ParamSchema; 4] = [
    ParamSchema {
        algorithm: CipherAlgorithm::AesGcm,
        wire_code: 0x01,
        fields: AES_GCM_FIELDS,
        tag_len: TAG_SIZE,
    },
    ParamSchema {
        algorithm: CipherAlgorithm::AesCbc,
        wire_code: 0x02,
        fields: AES_CBC_FIELDS,
        tag_len: 0,
    },
    ParamSchema {
        algorithm: CipherAlgorithm::AesCtr,
        wire_code: 0x03,
        fields: AES_CTR_FIELDS,
        tag_len: 0,
    },
    ParamSchema {
        algorithm: CipherAlgorithm::ChaCha20Poly1305,
        wire_code: 0x11,
        fields: CHACHA20_POLY1305_FIELDS,
        tag_len: TAG_SIZE,
    },
];

/// Look up the schema for a wire algorithm id.
pub fn schema_for(algorithm_id: u8) -> MbsResult<&'static ParamSchema> {
    SCHEMAS
        .iter()
        .find(|s| s.wire_code == algorithm_id)
        .ok_or_else(|| {
            MbsError::UnsupportedAlgorithm(format!("unknown algorithm id 0x{algorithm_id:02x}"))
        })
}

/// Schema for a logical algorithm. Every variant is registered.
pub fn schema_of(algorithm: CipherAlgorithm) -> &'static ParamSchema {
    match algorithm {
        CipherAlgorithm::AesGcm => &SCHEMAS[0],
        CipherAlgorithm::AesCbc => &SCHEMAS[1],
        CipherAlgorithm::AesCtr => &SCHEMAS[2],
        CipherAlgorithm::ChaCha20Poly1305 => &SCHEMAS[3],
    }
}

pub fn wire_code_for(algorithm: CipherAlgorithm) -> u8 {
    schema_of(algorithm).wire_code
}

/// Largest V1 framing overhead across registered algorithms.
pub fn max_v1_overhead() -> usize {
    SCHEMAS
        .iter()
        .map(|s| crate::V1_HEADER_LEN + s.params_len() + s.tag_len)
        .max()
        .unwrap_or(crate::V1_HEADER_LEN)
}

/// Typed V1 parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlgorithmParams {
    AesGcm { iv: [u8; 12], tag_len: u32 },
    AesCbc { iv: [u8; 16] },
    AesCtr { iv: [u8; 16] },
    ChaCha20Poly1305 { nonce: [u8; 12], counter: u32 },
}

impl AlgorithmParams {
    /// Params for an AEAD encryption under `nonce`.
    pub fn for_aead(algorithm: CipherAlgorithm, nonce: &[u8; NONCE_SIZE]) -> MbsResult<Self> {
        match algorithm {
            CipherAlgorithm::AesGcm => Ok(AlgorithmParams::AesGcm {
                iv: *nonce,
                tag_len: TAG_SIZE as u32,
            }),
            CipherAlgorithm::ChaCha20Poly1305 => Ok(AlgorithmParams::ChaCha20Poly1305 {
                nonce: *nonce,
                counter: 0,
            }),
            other => Err(MbsError::UnsupportedAlgorithm(format!(
                "{other} is not an AEAD algorithm"
            ))),
        }
    }

    pub fn algorithm(&self) -> CipherAlgorithm {
        match self {
            AlgorithmParams::AesGcm { .. } => CipherAlgorithm::AesGcm,
            AlgorithmParams::AesCbc { .. } => CipherAlgorithm::AesCbc,
            AlgorithmParams::AesCtr { .. } => CipherAlgorithm::AesCtr,
            AlgorithmParams::ChaCha20Poly1305 { .. } => CipherAlgorithm::ChaCha20Poly1305,
        }
    }

    /// The IV or nonce field.
    pub fn iv(&self) -> &[u8] {
        match self {
            AlgorithmParams::AesGcm { iv, .. } => iv,
            AlgorithmParams::AesCbc { iv } => iv,
            AlgorithmParams::AesCtr { iv } => iv,
            AlgorithmParams::ChaCha20Poly1305 { nonce, .. } => nonce,
        }
    }

    /// Serialize in schema field order.
    pub fn encode(&self) -> Vec<u8> {
        let schema = schema_of(self.algorithm());
        let mut out = Vec::with_capacity(schema.params_len());
        match self {
            AlgorithmParams::AesGcm { iv, tag_len } => {
                out.extend_from_slice(iv);
                out.extend_from_slice(&tag_len.to_be_bytes());
            }
            AlgorithmParams::AesCbc { iv } | AlgorithmParams::AesCtr { iv } => {
                out.extend_from_slice(iv);
            }
            AlgorithmParams::ChaCha20Poly1305 { nonce, counter } => {
                out.extend_from_slice(nonce);
                out.extend_from_slice(&counter.to_be_bytes());
            }
        }
        debug_assert_eq!(out.len(), schema.params_len());
        out
    }

    /// Parse a params block for the given wire algorithm id.
    pub fn decode(algorithm_id: u8, params: &[u8]) -> MbsResult<Self> {
        let schema = schema_for(algorithm_id)?;
        let fields = schema.split(params)?;
        let decoded = match schema.algorithm {
            CipherAlgorithm::AesGcm => AlgorithmParams::AesGcm {
                iv: fixed(fields[0])?,
                tag_len: u32::from_be_bytes(fixed(fields[1])?),
            },
            CipherAlgorithm::AesCbc => AlgorithmParams::AesCbc {
                iv: fixed(fields[0])?,
            },
            CipherAlgorithm::AesCtr => AlgorithmParams::AesCtr {
                iv: fixed(fields[0])?,
            },
            CipherAlgorithm::ChaCha20Poly1305 => AlgorithmParams::ChaCha20Poly1305 {
                nonce: fixed(fields[0])?,
                counter: u32::from_be_bytes(fixed(fields[1])?),
            },
        };
        Ok(decoded)
    }
}

fn fixed<const N: usize>(field: &[u8]) -> MbsResult<[u8; N]> {
    field.try_into().map_err(|_| {
        MbsError::InvalidInput(format!("param field is {} bytes, expected {N}", field.len()))
    })
}
