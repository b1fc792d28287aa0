//! Bonded Pool Common Library
//!
//! UTXO-native implementation.
//!
//! Shared types, constants, and utilities for the bonded staking pool
//! validator. This crate provides the ledger-facing foundation the
//! validator is written against.
//!
//! ## IMPORTANT: This is an eUTXO validator, NOT a stateful program
//!
//! The validator is a pure spending predicate. All implementations follow:
//! - **UTXO model**: Consume the pool input, produce the continuing output
//! - **Datum-carried state**: The pool's entire state travels in its datum
//! - **Accept/reject only**: No side effects, no storage, no callbacks
//! - **Single-shot evaluation**: One invocation validates one spend
//!
//! ## What lives here
//!
//! - **Ledger types**: transaction view, outputs, credentials, intervals
//! - **Multi-asset values**: per-asset-class amounts with signed deltas
//! - **Raw data universe**: constructor-tagged data, CBOR form, hashing
//! - **Error surface**: one fatal error per failed check, with the
//!   on-chain diagnostic string each condition reports
//! - **Trace log**: the success traces the evaluator emits
//!
//! This crate is `no_std` compatible when built without the `std` feature.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

// Re-export Vec for submodules based on feature
#[cfg(not(feature = "std"))]
pub use alloc::vec::Vec;
#[cfg(feature = "std")]
pub use std::vec::Vec;

pub mod constants;
pub mod data;
pub mod errors;
pub mod trace;
pub mod types;
pub mod validation;
pub mod value;

// Re-exports for convenience
pub use constants::*;
pub use data::*;
pub use errors::*;
pub use trace::*;
pub use types::*;
pub use validation::*;
pub use value::*;
