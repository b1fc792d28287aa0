//! Multi-Asset Values
//!
//! A `Value` maps asset classes to signed amounts. Output values are
//! non-negative in practice; the mint field uses negative amounts for
//! burns. Amounts are `i128` so delta arithmetic over full-range holdings
//! never wraps.

use crate::types::{CurrencySymbol, TokenName};
use crate::Vec;
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

/// An asset class: the issuing policy plus the token's name under it
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, BorshSerialize, BorshDeserialize,
)]
pub struct AssetClass {
    /// Hash of the minting policy
    pub symbol: CurrencySymbol,
    /// Token name under that policy
    pub name: TokenName,
}

impl AssetClass {
    pub fn new(symbol: CurrencySymbol, name: TokenName) -> Self {
        Self { symbol, name }
    }

    /// The pool's staking token under the given policy
    pub fn bonded(symbol: CurrencySymbol) -> Self {
        Self {
            symbol,
            name: crate::constants::token::NAME.to_vec(),
        }
    }
}

/// Holdings keyed by asset class, kept sorted and free of zero entries
#[derive(
    Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, BorshSerialize, BorshDeserialize,
)]
pub struct Value {
    assets: Vec<(AssetClass, i128)>,
}

impl Value {
    /// The empty value
    pub fn zero() -> Self {
        Self { assets: Vec::new() }
    }

    /// A value holding a single asset
    pub fn singleton(class: AssetClass, amount: i128) -> Self {
        Self::zero().add(class, amount)
    }

    /// Builder-style addition, merging into the sorted entry list
    pub fn add(mut self, class: AssetClass, amount: i128) -> Self {
        match self.assets.binary_search_by(|(c, _)| c.cmp(&class)) {
            Ok(pos) => {
                let merged = self.assets[pos].1.saturating_add(amount);
                if merged == 0 {
                    self.assets.remove(pos);
                } else {
                    self.assets[pos].1 = merged;
                }
            }
            Err(pos) => {
                if amount != 0 {
                    self.assets.insert(pos, (class, amount));
                }
            }
        }
        self
    }

    /// Sum of two values
    pub fn merge(&self, other: &Value) -> Value {
        let mut out = self.clone();
        for (class, amount) in &other.assets {
            out = out.add(class.clone(), *amount);
        }
        out
    }

    /// The value with every amount negated
    pub fn negate(&self) -> Value {
        Self {
            assets: self
                .assets
                .iter()
                .map(|(class, amount)| (class.clone(), amount.saturating_neg()))
                .collect(),
        }
    }

    /// Amount held of the given class, zero if absent
    pub fn amount_of(&self, class: &AssetClass) -> i128 {
        self.assets
            .binary_search_by(|(c, _)| c.cmp(class))
            .map(|pos| self.assets[pos].1)
            .unwrap_or(0)
    }

    /// All token names and amounts held under one policy
    pub fn entries_under(&self, symbol: &CurrencySymbol) -> Vec<(&TokenName, i128)> {
        self.assets
            .iter()
            .filter(|(c, _)| &c.symbol == symbol)
            .map(|(c, a)| (&c.name, *a))
            .collect()
    }

    /// Every (class, amount) entry, sorted by class
    pub fn assets(&self) -> &[(AssetClass, i128)] {
        &self.assets
    }

    /// Returns true if nothing is held
    pub fn is_zero(&self) -> bool {
        self.assets.is_empty()
    }
}
