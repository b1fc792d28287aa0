//! Raw Datum Universe
//!
//! Datums and redeemers arrive as values of this closed `Data` type:
//! constructor applications, maps, lists, integers, and byte strings.
//! Typed decoding on top of it lives with the contract; this module only
//! provides the universe, its CBOR wire form, and datum hashing.
//!
//! Constructor tags use the ledger's CBOR convention: tags 0-6 map to
//! CBOR tags 121-127, tags 7-127 to 1280-1400, anything larger to CBOR
//! tag 102 wrapping `[tag, fields]`.

use crate::types::DatumHash;
use crate::Vec;
use borsh::{BorshDeserialize, BorshSerialize};
use ciborium::value::{Integer, Value as CborValue};
use serde::{Deserialize, Serialize};

#[cfg(not(feature = "std"))]
use alloc::boxed::Box;

/// A raw on-chain data value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub enum Data {
    /// Constructor application: tag plus ordered fields
    Constr { tag: u64, fields: Vec<Data> },
    /// Association list of data pairs
    Map(Vec<(Data, Data)>),
    /// Ordered list
    List(Vec<Data>),
    /// Integer, range-limited to what the wire form can carry
    Int(i128),
    /// Byte string
    Bytes(Vec<u8>),
}

impl Data {
    /// Constructor application
    pub fn constr(tag: u64, fields: Vec<Data>) -> Self {
        Self::Constr { tag, fields }
    }

    /// Integer
    pub fn int(value: i128) -> Self {
        Self::Int(value)
    }

    /// Byte string
    pub fn bytes(bytes: &[u8]) -> Self {
        Self::Bytes(bytes.to_vec())
    }

    /// Constructor tag and fields, if this is a constructor
    pub fn as_constr(&self) -> Option<(u64, &[Data])> {
        match self {
            Self::Constr { tag, fields } => Some((*tag, fields)),
            _ => None,
        }
    }

    /// Integer value, if this is an integer
    pub fn as_int(&self) -> Option<i128> {
        match self {
            Self::Int(value) => Some(*value),
            _ => None,
        }
    }

    /// Integer narrowed to `u64`, if it fits
    pub fn as_u64(&self) -> Option<u64> {
        self.as_int().and_then(|i| u64::try_from(i).ok())
    }

    /// Byte string contents, if this is one
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Byte string narrowed to a 28-byte credential hash
    pub fn as_key_hash(&self) -> Option<[u8; 28]> {
        let bytes = self.as_bytes()?;
        if bytes.len() != 28 {
            return None;
        }
        let mut hash = [0u8; 28];
        hash.copy_from_slice(bytes);
        Some(hash)
    }

    // ============ CBOR Wire Form ============

    /// Encode to CBOR bytes
    ///
    /// Returns `None` when an integer exceeds the plain CBOR integer
    /// range; bignums are not part of the wire contract.
    pub fn to_cbor(&self) -> Option<Vec<u8>> {
        let value = self.to_cbor_value()?;
        let mut bytes = Vec::new();
        ciborium::ser::into_writer(&value, &mut bytes).ok()?;
        Some(bytes)
    }

    /// Decode from CBOR bytes
    pub fn from_cbor(bytes: &[u8]) -> Option<Self> {
        let value: CborValue = ciborium::de::from_reader(bytes).ok()?;
        Self::from_cbor_value(&value)
    }

    /// Hash of the CBOR encoding, keying the witness table
    pub fn hash(&self) -> Option<DatumHash> {
        use sha2::{Digest, Sha256};
        let bytes = self.to_cbor()?;
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        let result = hasher.finalize();
        let mut hash = [0u8; 32];
        hash.copy_from_slice(&result);
        Some(hash)
    }

    fn to_cbor_value(&self) -> Option<CborValue> {
        match self {
            Self::Constr { tag, fields } => {
                let mut encoded = Vec::new();
                for field in fields {
                    encoded.push(field.to_cbor_value()?);
                }
                let value = match tag {
                    0..=6 => CborValue::Tag(121 + tag, Box::new(CborValue::Array(encoded))),
                    7..=127 => CborValue::Tag(1280 + (tag - 7), Box::new(CborValue::Array(encoded))),
                    _ => CborValue::Tag(
                        102,
                        Box::new(CborValue::Array(Vec::from([
                            CborValue::Integer(Integer::from(*tag)),
                            CborValue::Array(encoded),
                        ]))),
                    ),
                };
                Some(value)
            }
            Self::Map(pairs) => {
                let mut encoded = Vec::new();
                for (key, val) in pairs {
                    encoded.push((key.to_cbor_value()?, val.to_cbor_value()?));
                }
                Some(CborValue::Map(encoded))
            }
            Self::List(items) => {
                let mut encoded = Vec::new();
                for item in items {
                    encoded.push(item.to_cbor_value()?);
                }
                Some(CborValue::Array(encoded))
            }
            Self::Int(value) => Integer::try_from(*value).ok().map(CborValue::Integer),
            Self::Bytes(bytes) => Some(CborValue::Bytes(bytes.clone())),
        }
    }

    fn from_cbor_value(value: &CborValue) -> Option<Self> {
        match value {
            CborValue::Tag(tag, inner) => {
                let (constr_tag, raw_fields): (u64, &[CborValue]) = match (tag, inner.as_ref()) {
                    (121..=127, CborValue::Array(fields)) => (tag - 121, fields.as_slice()),
                    (1280..=1400, CborValue::Array(fields)) => (7 + (tag - 1280), fields.as_slice()),
                    (102, CborValue::Array(parts)) => match parts.as_slice() {
                        [CborValue::Integer(t), CborValue::Array(fields)] => {
                            (u64::try_from(i128::from(*t)).ok()?, fields.as_slice())
                        }
                        _ => return None,
                    },
                    _ => return None,
                };
                let mut fields = Vec::new();
                for field in raw_fields {
                    fields.push(Self::from_cbor_value(field)?);
                }
                Some(Self::Constr {
                    tag: constr_tag,
                    fields,
                })
            }
            CborValue::Map(pairs) => {
                let mut decoded = Vec::new();
                for (key, val) in pairs {
                    decoded.push((Self::from_cbor_value(key)?, Self::from_cbor_value(val)?));
                }
                Some(Self::Map(decoded))
            }
            CborValue::Array(items) => {
                let mut decoded = Vec::new();
                for item in items {
                    decoded.push(Self::from_cbor_value(item)?);
                }
                Some(Self::List(decoded))
            }
            CborValue::Integer(value) => Some(Self::Int(i128::from(*value))),
            CborValue::Bytes(bytes) => Some(Self::Bytes(bytes.clone())),
            _ => None,
        }
    }
}
