//! Entry List and Reconciliation
//!
//! The pool's stake records travel in the datum as a linked chain of
//! constructor-tagged nodes ending in a terminator. In memory the chain
//! is an arena-backed ordered sequence so malformed shapes (missing or
//! doubled terminators, unknown node tags, trailing nodes) stay
//! representable and every walk can reject them explicitly.
//!
//! Entries are kept in strictly ascending key order. Participant
//! mutations preserve the order by construction; the reconciler binds
//! any declared list to its declared size.

use bonded_common::{PoolError, PoolResult, PubKeyHash};
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

/// Wire tag of an entry node
pub const ENTRY_NODE_TAG: u64 = 0;
/// Wire tag of the terminator node
pub const TERMINATOR_TAG: u64 = 1;

/// One participant's stake record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct StakeEntry {
    /// Key the stake belongs to
    pub key: PubKeyHash,
    /// Amount staked, in token base units
    pub staked: u64,
}

impl StakeEntry {
    pub fn new(key: PubKeyHash, staked: u64) -> Self {
        Self { key, staked }
    }
}

/// One node of the entry chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub enum EntryNode {
    /// A stake record followed by the rest of the chain
    Entry(StakeEntry),
    /// The distinguished end-of-list marker
    End,
    /// A constructor tag no walk recognizes; kept so walks reject it
    Unknown(u64),
}

/// Arena-backed entry sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct EntryList {
    nodes: Vec<EntryNode>,
}

impl EntryList {
    /// The empty list: just the terminator
    pub fn empty() -> Self {
        Self {
            nodes: vec![EntryNode::End],
        }
    }

    /// Well-formed list over the given records, terminator appended
    pub fn from_entries(entries: Vec<StakeEntry>) -> Self {
        let mut nodes: Vec<EntryNode> = entries.into_iter().map(EntryNode::Entry).collect();
        nodes.push(EntryNode::End);
        Self { nodes }
    }

    /// List over raw nodes, shape unchecked
    pub fn from_nodes(nodes: Vec<EntryNode>) -> Self {
        Self { nodes }
    }

    /// The underlying nodes in order
    pub fn nodes(&self) -> &[EntryNode] {
        &self.nodes
    }

    /// Stake records before the first terminator
    pub fn entries(&self) -> Vec<&StakeEntry> {
        self.nodes
            .iter()
            .take_while(|n| !matches!(n, EntryNode::End))
            .filter_map(|n| match n {
                EntryNode::Entry(e) => Some(e),
                _ => None,
            })
            .collect()
    }

    /// Locate a record by key.
    ///
    /// The walk considers every node tag; hitting the terminator means
    /// the key is absent, anything unrecognized is a constructor no arm
    /// handles, and a chain that never terminates failed to produce the
    /// constructor the walk was looking for.
    pub fn find(&self, key: &PubKeyHash) -> PoolResult<&StakeEntry> {
        for node in &self.nodes {
            match node {
                EntryNode::Entry(entry) if &entry.key == key => return Ok(entry),
                EntryNode::Entry(_) => {}
                EntryNode::End => return Err(PoolError::ElementNotFound { key: *key }),
                EntryNode::Unknown(tag) => {
                    return Err(PoolError::UnmatchedConstructor { tag: *tag })
                }
            }
        }
        Err(PoolError::UnmatchedConstructor {
            tag: TERMINATOR_TAG,
        })
    }

    /// The list after applying a deposit.
    ///
    /// An existing entry for the key is incremented; otherwise a new
    /// entry is inserted at its ascending-key position.
    pub fn with_deposit(&self, key: &PubKeyHash, amount: u64) -> PoolResult<EntryList> {
        let mut updated: Vec<StakeEntry> = Vec::new();
        let mut placed = false;

        for node in &self.nodes {
            match node {
                EntryNode::Entry(entry) if !placed && &entry.key == key => {
                    updated.push(StakeEntry::new(*key, entry.staked.saturating_add(amount)));
                    placed = true;
                }
                EntryNode::Entry(entry) => {
                    if !placed && entry.key > *key {
                        updated.push(StakeEntry::new(*key, amount));
                        placed = true;
                    }
                    updated.push(entry.clone());
                }
                EntryNode::End => {
                    if !placed {
                        updated.push(StakeEntry::new(*key, amount));
                    }
                    return Ok(EntryList::from_entries(updated));
                }
                EntryNode::Unknown(tag) => {
                    return Err(PoolError::UnmatchedConstructor { tag: *tag })
                }
            }
        }
        Err(PoolError::UnmatchedConstructor {
            tag: TERMINATOR_TAG,
        })
    }

    /// The list after applying a withdrawal.
    ///
    /// The entry must exist and cover the amount. Withdrawing the full
    /// stake removes the entry, anything less decrements it in place.
    pub fn with_withdrawal(&self, key: &PubKeyHash, amount: u64) -> PoolResult<EntryList> {
        let mut updated: Vec<StakeEntry> = Vec::new();
        let mut touched = false;

        for node in &self.nodes {
            match node {
                EntryNode::Entry(entry) if !touched && &entry.key == key => {
                    if amount > entry.staked {
                        return Err(PoolError::TokenNameOrAmountPredicateFailed {
                            expected: entry.staked as i128,
                            moved: amount as i128,
                        });
                    }
                    if amount < entry.staked {
                        updated.push(StakeEntry::new(*key, entry.staked - amount));
                    }
                    touched = true;
                }
                EntryNode::Entry(entry) => updated.push(entry.clone()),
                EntryNode::End => {
                    if !touched {
                        return Err(PoolError::ElementNotFound { key: *key });
                    }
                    return Ok(EntryList::from_entries(updated));
                }
                EntryNode::Unknown(tag) => {
                    return Err(PoolError::UnmatchedConstructor { tag: *tag })
                }
            }
        }
        Err(PoolError::UnmatchedConstructor {
            tag: TERMINATOR_TAG,
        })
    }

    /// Walk the list and confirm it carries the declared size.
    ///
    /// The staked amounts must sum to `total_size` and the walk must
    /// hit the terminator exactly once with nothing after it. Pure and
    /// idempotent.
    pub fn reconcile(&self, total_size: u64) -> PoolResult<()> {
        let mut sum: u128 = 0;

        for (index, node) in self.nodes.iter().enumerate() {
            match node {
                EntryNode::Entry(entry) => {
                    sum = sum.saturating_add(entry.staked as u128);
                }
                EntryNode::End => {
                    if sum != total_size as u128 {
                        return Err(PoolError::SizeNotUpdatedCorrectly {
                            declared: total_size,
                            expected: u64::try_from(sum).unwrap_or(u64::MAX),
                        });
                    }
                    let remaining = self.nodes.len() - index - 1;
                    if remaining > 0 {
                        return Err(PoolError::UnexpectedNonEmptyRemainder {
                            remaining: remaining as u64,
                        });
                    }
                    return Ok(());
                }
                EntryNode::Unknown(tag) => {
                    return Err(PoolError::UnmatchedConstructor { tag: *tag })
                }
            }
        }
        Err(PoolError::UnmatchedConstructor {
            tag: TERMINATOR_TAG,
        })
    }
}

/// Compare a computed post-action list against the declared one,
/// node by node.
///
/// A wrong or missing record is a lookup failure on the declared list;
/// declared nodes past the computed terminator are surplus.
pub fn verify_entries_match(expected: &EntryList, declared: &EntryList) -> PoolResult<()> {
    let mut index = 0;
    loop {
        let left = expected.nodes().get(index);
        let right = declared.nodes().get(index);
        match (left, right) {
            (Some(EntryNode::Entry(want)), Some(EntryNode::Entry(got))) => {
                if want != got {
                    return Err(PoolError::ElementNotFound { key: want.key });
                }
            }
            (Some(EntryNode::End), Some(EntryNode::End)) => return Ok(()),
            (Some(EntryNode::Unknown(tag)), _) | (_, Some(EntryNode::Unknown(tag))) => {
                return Err(PoolError::UnmatchedConstructor { tag: *tag });
            }
            (Some(EntryNode::Entry(want)), _) => {
                return Err(PoolError::ElementNotFound { key: want.key });
            }
            (Some(EntryNode::End), Some(EntryNode::Entry(_))) => {
                return Err(PoolError::UnexpectedNonEmptyRemainder {
                    remaining: (declared.nodes().len() - index) as u64,
                });
            }
            _ => {
                return Err(PoolError::UnmatchedConstructor {
                    tag: TERMINATOR_TAG,
                });
            }
        }
        index += 1;
    }
}
