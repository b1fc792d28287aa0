//! Pool Datum and Redeemer Codec
//!
//! Total decoding of raw constructor-tagged data into the typed pool
//! state and action, and the matching encode halves so off-chain
//! construction reproduces the exact wire shape. Decoding rejects every
//! shape it does not recognize; nothing is inferred or defaulted.

use crate::entries::{EntryList, EntryNode, StakeEntry, ENTRY_NODE_TAG, TERMINATOR_TAG};
use bonded_common::{AssetClass, Data, PoolError, PoolResult, PubKeyHash};
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

/// Wire-level constructor tags and field positions
mod shape {
    /// Pool-state constructor and its field order
    pub const POOL_TAG: u64 = 0;
    pub const POOL_FIELDS: usize = 4;
    pub const ADMIN_KEY: usize = 0;
    pub const TOTAL_SIZE: usize = 1;
    pub const ASSET_CLASS: usize = 2;
    pub const ENTRIES: usize = 3;

    /// Asset-class constructor: [currency symbol, token name]
    pub const ASSET_TAG: u64 = 0;
    pub const ASSET_FIELDS: usize = 2;
    pub const MAX_NAME_LEN: usize = 32;

    /// Entry node: [key, staked, rest of chain]
    pub const ENTRY_FIELDS: usize = 3;

    /// Redeemer constructors
    pub const ADMIN_UPDATE_TAG: u64 = 0;
    pub const DEPOSIT_TAG: u64 = 1;
    pub const WITHDRAW_TAG: u64 = 2;
    pub const CLOSE_TAG: u64 = 3;
    pub const ACT_FIELDS: usize = 2;
}

// ============ Pool Datum ============

/// The pool's entire state, as carried by its datum
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct PoolDatum {
    /// Sole administrator
    pub admin_key: PubKeyHash,
    /// Aggregate stake under management; always the entry-list sum
    pub total_size: u64,
    /// The one token the pool accepts
    pub asset_class: AssetClass,
    /// Stake records
    pub entries: EntryList,
}

impl PoolDatum {
    /// Fresh pool with no stake
    pub fn new(admin_key: PubKeyHash, asset_class: AssetClass) -> Self {
        Self {
            admin_key,
            total_size: 0,
            asset_class,
            entries: EntryList::empty(),
        }
    }

    /// Decode a raw datum into pool state.
    ///
    /// Anything but the pool-state constructor with well-typed fields is
    /// a wrong datum. Unknown entry-node tags are the one exception:
    /// they decode into the arena so the list walks reject them
    /// themselves.
    pub fn decode(data: &Data) -> PoolResult<Self> {
        let (tag, fields) = data.as_constr().ok_or(PoolError::WrongDatumConstructor)?;
        if tag != shape::POOL_TAG || fields.len() != shape::POOL_FIELDS {
            return Err(PoolError::WrongDatumConstructor);
        }
        let admin_key = fields[shape::ADMIN_KEY]
            .as_key_hash()
            .ok_or(PoolError::WrongDatumConstructor)?;
        let total_size = fields[shape::TOTAL_SIZE]
            .as_u64()
            .ok_or(PoolError::WrongDatumConstructor)?;
        let asset_class = decode_asset_class(&fields[shape::ASSET_CLASS])?;
        let entries = decode_entries(&fields[shape::ENTRIES])?;
        Ok(Self {
            admin_key,
            total_size,
            asset_class,
            entries,
        })
    }

    /// Encode pool state back to its wire shape
    pub fn encode(&self) -> Data {
        Data::constr(
            shape::POOL_TAG,
            vec![
                Data::bytes(&self.admin_key),
                Data::int(self.total_size as i128),
                encode_asset_class(&self.asset_class),
                encode_entries(self.entries.nodes()),
            ],
        )
    }
}

fn decode_asset_class(data: &Data) -> PoolResult<AssetClass> {
    let (tag, fields) = data.as_constr().ok_or(PoolError::WrongDatumConstructor)?;
    if tag != shape::ASSET_TAG || fields.len() != shape::ASSET_FIELDS {
        return Err(PoolError::WrongDatumConstructor);
    }
    let symbol = fields[0]
        .as_key_hash()
        .ok_or(PoolError::WrongDatumConstructor)?;
    let name = fields[1]
        .as_bytes()
        .ok_or(PoolError::WrongDatumConstructor)?;
    if name.len() > shape::MAX_NAME_LEN {
        return Err(PoolError::WrongDatumConstructor);
    }
    Ok(AssetClass::new(symbol, name.to_vec()))
}

fn encode_asset_class(class: &AssetClass) -> Data {
    Data::constr(
        shape::ASSET_TAG,
        vec![Data::bytes(&class.symbol), Data::bytes(&class.name)],
    )
}

fn decode_entries(data: &Data) -> PoolResult<EntryList> {
    let mut nodes = Vec::new();
    let mut cursor = data;
    loop {
        let (tag, fields) = cursor.as_constr().ok_or(PoolError::WrongDatumConstructor)?;
        match tag {
            ENTRY_NODE_TAG => {
                if fields.len() != shape::ENTRY_FIELDS {
                    return Err(PoolError::WrongDatumConstructor);
                }
                let key = fields[0]
                    .as_key_hash()
                    .ok_or(PoolError::WrongDatumConstructor)?;
                let staked = fields[1]
                    .as_u64()
                    .ok_or(PoolError::WrongDatumConstructor)?;
                nodes.push(EntryNode::Entry(StakeEntry::new(key, staked)));
                cursor = &fields[2];
            }
            TERMINATOR_TAG => {
                if !fields.is_empty() {
                    return Err(PoolError::WrongDatumConstructor);
                }
                nodes.push(EntryNode::End);
                return Ok(EntryList::from_nodes(nodes));
            }
            other => {
                // Preserved; the walks report it as unmatched
                nodes.push(EntryNode::Unknown(other));
                return Ok(EntryList::from_nodes(nodes));
            }
        }
    }
}

fn encode_entries(nodes: &[EntryNode]) -> Data {
    match nodes.split_first() {
        Some((EntryNode::Entry(entry), rest)) => Data::constr(
            ENTRY_NODE_TAG,
            vec![
                Data::bytes(&entry.key),
                Data::int(entry.staked as i128),
                encode_entries(rest),
            ],
        ),
        // The chain form stops at the first non-entry node
        Some((EntryNode::End, _)) | None => Data::constr(TERMINATOR_TAG, Vec::new()),
        Some((EntryNode::Unknown(tag), _)) => Data::constr(*tag, Vec::new()),
    }
}

// ============ Redeemer ============

/// The action a transaction asks the pool to authorize
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub enum PoolRedeemer {
    /// Administrator updates size and accounting
    AdminUpdate,
    /// Participant stakes `amount` under `key`
    Deposit { key: PubKeyHash, amount: u64 },
    /// Participant takes `amount` back out of `key`'s entry
    Withdraw { key: PubKeyHash, amount: u64 },
    /// Administrator dissolves the pool
    Close,
}

impl PoolRedeemer {
    /// Decode a raw redeemer into a typed action.
    ///
    /// The action set is closed: any unrecognized tag, arity, or field
    /// type is malformed.
    pub fn decode(data: &Data) -> PoolResult<Self> {
        let (tag, fields) = data.as_constr().ok_or(PoolError::MalformedRedeemer)?;
        match tag {
            shape::ADMIN_UPDATE_TAG if fields.is_empty() => Ok(Self::AdminUpdate),
            shape::DEPOSIT_TAG => {
                let (key, amount) = decode_act_fields(fields)?;
                Ok(Self::Deposit { key, amount })
            }
            shape::WITHDRAW_TAG => {
                let (key, amount) = decode_act_fields(fields)?;
                Ok(Self::Withdraw { key, amount })
            }
            shape::CLOSE_TAG if fields.is_empty() => Ok(Self::Close),
            _ => Err(PoolError::MalformedRedeemer),
        }
    }

    /// Encode the action back to its wire shape
    pub fn encode(&self) -> Data {
        match self {
            Self::AdminUpdate => Data::constr(shape::ADMIN_UPDATE_TAG, Vec::new()),
            Self::Deposit { key, amount } => {
                Data::constr(shape::DEPOSIT_TAG, encode_act_fields(key, *amount))
            }
            Self::Withdraw { key, amount } => {
                Data::constr(shape::WITHDRAW_TAG, encode_act_fields(key, *amount))
            }
            Self::Close => Data::constr(shape::CLOSE_TAG, Vec::new()),
        }
    }
}

fn decode_act_fields(fields: &[Data]) -> PoolResult<(PubKeyHash, u64)> {
    if fields.len() != shape::ACT_FIELDS {
        return Err(PoolError::MalformedRedeemer);
    }
    let key = fields[0].as_key_hash().ok_or(PoolError::MalformedRedeemer)?;
    let amount = fields[1].as_u64().ok_or(PoolError::MalformedRedeemer)?;
    Ok((key, amount))
}

fn encode_act_fields(key: &PubKeyHash, amount: u64) -> Vec<Data> {
    vec![Data::bytes(key), Data::int(amount as i128)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use bonded_common::constants::token;

    fn key(fill: u8) -> PubKeyHash {
        [fill; 28]
    }

    fn sample_datum() -> PoolDatum {
        PoolDatum {
            admin_key: key(1),
            total_size: 100,
            asset_class: AssetClass::bonded([5u8; 28]),
            entries: EntryList::from_entries(vec![
                StakeEntry::new(key(2), 40),
                StakeEntry::new(key(4), 60),
            ]),
        }
    }

    #[test]
    fn test_datum_roundtrip() {
        let datum = sample_datum();
        assert_eq!(PoolDatum::decode(&datum.encode()).unwrap(), datum);
    }

    #[test]
    fn test_empty_pool_roundtrip() {
        let datum = PoolDatum::new(key(1), AssetClass::bonded([5u8; 28]));
        let decoded = PoolDatum::decode(&datum.encode()).unwrap();
        assert_eq!(decoded.total_size, 0);
        assert_eq!(decoded.entries, EntryList::empty());
    }

    #[test]
    fn test_datum_roundtrip_through_cbor() {
        let datum = sample_datum();
        let bytes = datum.encode().to_cbor().unwrap();
        let recovered = Data::from_cbor(&bytes).unwrap();
        assert_eq!(PoolDatum::decode(&recovered).unwrap(), datum);
    }

    #[test]
    fn test_decode_rejects_wrong_top_tag() {
        let mut raw = sample_datum().encode();
        if let Data::Constr { tag, .. } = &mut raw {
            *tag = 2;
        }
        assert!(matches!(
            PoolDatum::decode(&raw),
            Err(PoolError::WrongDatumConstructor)
        ));
    }

    #[test]
    fn test_decode_rejects_non_constr() {
        assert!(matches!(
            PoolDatum::decode(&Data::int(5)),
            Err(PoolError::WrongDatumConstructor)
        ));
        assert!(matches!(
            PoolDatum::decode(&Data::bytes(b"junk")),
            Err(PoolError::WrongDatumConstructor)
        ));
    }

    #[test]
    fn test_decode_rejects_wrong_arity() {
        let raw = Data::constr(0, vec![Data::bytes(&key(1)), Data::int(100)]);
        assert!(matches!(
            PoolDatum::decode(&raw),
            Err(PoolError::WrongDatumConstructor)
        ));
    }

    #[test]
    fn test_decode_rejects_short_admin_key() {
        let mut datum = sample_datum().encode();
        if let Data::Constr { fields, .. } = &mut datum {
            fields[0] = Data::bytes(&[1u8; 27]);
        }
        assert!(matches!(
            PoolDatum::decode(&datum),
            Err(PoolError::WrongDatumConstructor)
        ));
    }

    #[test]
    fn test_decode_rejects_negative_size() {
        let mut datum = sample_datum().encode();
        if let Data::Constr { fields, .. } = &mut datum {
            fields[1] = Data::int(-1);
        }
        assert!(matches!(
            PoolDatum::decode(&datum),
            Err(PoolError::WrongDatumConstructor)
        ));
    }

    #[test]
    fn test_decode_rejects_oversized_token_name() {
        let mut datum = sample_datum().encode();
        if let Data::Constr { fields, .. } = &mut datum {
            fields[2] = Data::constr(0, vec![Data::bytes(&[5u8; 28]), Data::bytes(&[7u8; 33])]);
        }
        assert!(matches!(
            PoolDatum::decode(&datum),
            Err(PoolError::WrongDatumConstructor)
        ));
    }

    #[test]
    fn test_decode_preserves_unknown_entry_node() {
        let raw = Data::constr(
            shape::POOL_TAG,
            vec![
                Data::bytes(&key(1)),
                Data::int(0),
                encode_asset_class(&AssetClass::bonded([5u8; 28])),
                Data::constr(7, Vec::new()),
            ],
        );
        let decoded = PoolDatum::decode(&raw).unwrap();
        assert_eq!(decoded.entries.nodes(), &[EntryNode::Unknown(7)]);
    }

    #[test]
    fn test_decode_rejects_non_constr_chain_tail() {
        let raw = Data::constr(
            shape::POOL_TAG,
            vec![
                Data::bytes(&key(1)),
                Data::int(10),
                encode_asset_class(&AssetClass::bonded([5u8; 28])),
                Data::constr(
                    ENTRY_NODE_TAG,
                    vec![Data::bytes(&key(2)), Data::int(10), Data::int(0)],
                ),
            ],
        );
        assert!(matches!(
            PoolDatum::decode(&raw),
            Err(PoolError::WrongDatumConstructor)
        ));
    }

    #[test]
    fn test_default_token_name_is_carried() {
        let datum = PoolDatum::new(key(1), AssetClass::bonded([5u8; 28]));
        assert_eq!(datum.asset_class.name, token::NAME.to_vec());
    }

    #[test]
    fn test_redeemer_roundtrip_all_actions() {
        let actions = [
            PoolRedeemer::AdminUpdate,
            PoolRedeemer::Deposit {
                key: key(2),
                amount: 20,
            },
            PoolRedeemer::Withdraw {
                key: key(2),
                amount: 5,
            },
            PoolRedeemer::Close,
        ];
        for action in actions {
            assert_eq!(PoolRedeemer::decode(&action.encode()).unwrap(), action);
        }
    }

    #[test]
    fn test_redeemer_rejects_unknown_tag() {
        assert!(matches!(
            PoolRedeemer::decode(&Data::constr(4, Vec::new())),
            Err(PoolError::MalformedRedeemer)
        ));
    }

    #[test]
    fn test_redeemer_rejects_wrong_arity() {
        let raw = Data::constr(shape::DEPOSIT_TAG, vec![Data::bytes(&key(2))]);
        assert!(matches!(
            PoolRedeemer::decode(&raw),
            Err(PoolError::MalformedRedeemer)
        ));

        let raw = Data::constr(shape::CLOSE_TAG, vec![Data::int(1)]);
        assert!(matches!(
            PoolRedeemer::decode(&raw),
            Err(PoolError::MalformedRedeemer)
        ));
    }

    #[test]
    fn test_redeemer_rejects_bad_fields() {
        let raw = Data::constr(
            shape::WITHDRAW_TAG,
            vec![Data::bytes(&key(2)), Data::int(-5)],
        );
        assert!(matches!(
            PoolRedeemer::decode(&raw),
            Err(PoolError::MalformedRedeemer)
        ));

        let raw = Data::constr(
            shape::DEPOSIT_TAG,
            vec![Data::int(9), Data::int(5)],
        );
        assert!(matches!(
            PoolRedeemer::decode(&raw),
            Err(PoolError::MalformedRedeemer)
        ));
    }

    #[test]
    fn test_redeemer_rejects_non_constr() {
        assert!(matches!(
            PoolRedeemer::decode(&Data::List(Vec::new())),
            Err(PoolError::MalformedRedeemer)
        ));
    }
}
