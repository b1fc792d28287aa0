//! Core Ledger Types
//!
//! This module defines the transaction-view types the validator is
//! evaluated against. The ledger runtime constructs one `TransactionView`
//! per spend attempt; the validator only ever reads it.

use crate::data::Data;
use crate::value::Value;
use crate::Vec;
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

/// Type alias for public-key hashes (28-byte payment credential)
pub type PubKeyHash = [u8; 28];

/// Type alias for script hashes (28-byte script credential)
pub type ScriptHash = [u8; 28];

/// Type alias for minting-policy hashes
pub type CurrencySymbol = [u8; 28];

/// Type alias for token names under a policy (raw bytes)
pub type TokenName = Vec<u8>;

/// Type alias for transaction identifiers
pub type TxId = [u8; 32];

/// Type alias for datum hashes
pub type DatumHash = [u8; 32];

// ============ Credentials and Addresses ============

/// Payment credential controlling an output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub enum Credential {
    /// Controlled by a key signature
    PubKey(PubKeyHash),
    /// Controlled by a validator script
    Script(ScriptHash),
}

/// Address of an output
///
/// Only the payment part matters to the validator; staking parts are not
/// modelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct Address {
    /// Payment credential
    pub payment: Credential,
}

impl Address {
    /// Address paying to a key
    pub fn pubkey(hash: PubKeyHash) -> Self {
        Self {
            payment: Credential::PubKey(hash),
        }
    }

    /// Address paying to a script
    pub fn script(hash: ScriptHash) -> Self {
        Self {
            payment: Credential::Script(hash),
        }
    }

    /// Returns true if this address pays to the given script
    pub fn is_script(&self, hash: &ScriptHash) -> bool {
        matches!(&self.payment, Credential::Script(h) if h == hash)
    }
}

// ============ Outputs and Inputs ============

/// Reference to a transaction output being spent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct TxOutRef {
    /// Transaction that produced the output
    pub tx_id: TxId,
    /// Index of the output within that transaction
    pub index: u32,
}

impl TxOutRef {
    pub fn new(tx_id: TxId, index: u32) -> Self {
        Self { tx_id, index }
    }
}

/// A transaction output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct TxOut {
    /// Where the output pays to
    pub address: Address,
    /// Assets held by the output
    pub value: Value,
    /// Hash of the attached datum, resolvable via the witness table
    pub datum_hash: Option<DatumHash>,
}

impl TxOut {
    /// Output with no datum attached
    pub fn new(address: Address, value: Value) -> Self {
        Self {
            address,
            value,
            datum_hash: None,
        }
    }

    /// Attach a datum hash
    pub fn with_datum_hash(mut self, hash: DatumHash) -> Self {
        self.datum_hash = Some(hash);
        self
    }
}

/// A resolved transaction input: the reference plus the output it spends
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct TxInInfo {
    /// Reference being consumed
    pub out_ref: TxOutRef,
    /// The output that reference points at
    pub resolved: TxOut,
}

impl TxInInfo {
    pub fn new(out_ref: TxOutRef, resolved: TxOut) -> Self {
        Self { out_ref, resolved }
    }
}

// ============ Validity Interval ============

/// Slot interval the transaction declares itself valid in
///
/// `None` bounds are open ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct ValidityInterval {
    /// Inclusive lower slot bound
    pub start: Option<u64>,
    /// Inclusive upper slot bound
    pub end: Option<u64>,
}

impl ValidityInterval {
    /// The unbounded interval
    pub fn always() -> Self {
        Self {
            start: None,
            end: None,
        }
    }

    /// Interval bounded on both ends
    pub fn between(start: u64, end: u64) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    /// Returns true if the slot falls inside the interval
    pub fn contains(&self, slot: u64) -> bool {
        let after_start = self.start.map_or(true, |s| slot >= s);
        let before_end = self.end.map_or(true, |e| slot <= e);
        after_start && before_end
    }
}

// ============ Script Purpose ============

/// What the ledger is asking the script to authorize
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub enum ScriptPurpose {
    /// Spending the referenced input
    Spending(TxOutRef),
    /// Minting under the given policy
    Minting(CurrencySymbol),
}

// ============ Transaction View ============

/// Ledger-supplied projection of the spending transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct TransactionView {
    /// Resolved inputs being consumed
    pub inputs: Vec<TxInInfo>,
    /// Outputs being produced
    pub outputs: Vec<TxOut>,
    /// Net minted and burned amounts, negative for burns
    pub mint: Value,
    /// Keys that signed the transaction
    pub signatories: Vec<PubKeyHash>,
    /// Declared validity interval
    pub valid_range: ValidityInterval,
    /// Witness table mapping datum hashes to raw datums
    pub datums: Vec<(DatumHash, Data)>,
}

impl TransactionView {
    /// Empty view, extended field by field in construction
    pub fn new() -> Self {
        Self {
            inputs: Vec::new(),
            outputs: Vec::new(),
            mint: Value::zero(),
            signatories: Vec::new(),
            valid_range: ValidityInterval::always(),
            datums: Vec::new(),
        }
    }

    /// Find the input consuming the given reference
    pub fn find_input(&self, out_ref: &TxOutRef) -> Option<&TxInInfo> {
        self.inputs.iter().find(|i| &i.out_ref == out_ref)
    }

    /// Returns true if the key signed the transaction
    pub fn is_signed_by(&self, key: &PubKeyHash) -> bool {
        self.signatories.iter().any(|s| s == key)
    }

    /// Resolve a datum hash through the witness table
    pub fn lookup_datum(&self, hash: &DatumHash) -> Option<&Data> {
        self.datums
            .iter()
            .find(|(h, _)| h == hash)
            .map(|(_, d)| d)
    }

    /// All outputs paying to the given script
    pub fn outputs_at_script(&self, hash: &ScriptHash) -> Vec<&TxOut> {
        self.outputs
            .iter()
            .filter(|o| o.address.is_script(hash))
            .collect()
    }
}

impl Default for TransactionView {
    fn default() -> Self {
        Self::new()
    }
}
