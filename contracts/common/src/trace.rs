//! Evaluation Traces
//!
//! The deployed script emits short trace strings on the success path of
//! the asset predicates. The validator mirrors them as typed traces
//! collected per invocation, so tests and callers can observe which
//! stages ran. Purely in-memory; there is no other observability.

use crate::Vec;
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

/// Success traces emitted during evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub enum PoolTrace {
    /// Currency-symbol predicate stage passed
    CurrencySymbolOk,
    /// Token-name/amount predicate stage passed
    TokenNameAndAmountOk,
}

impl PoolTrace {
    /// The string the deployed script emits for this trace
    pub fn message(&self) -> &'static str {
        match self {
            Self::CurrencySymbolOk => "evalCs OK",
            Self::TokenNameAndAmountOk => "evalTnAndAmount OK",
        }
    }
}

/// Trace log collecting traces during one evaluation
#[derive(Debug, Clone, Default)]
pub struct TraceLog {
    traces: Vec<PoolTrace>,
}

impl TraceLog {
    /// Create a new empty trace log
    pub fn new() -> Self {
        Self { traces: Vec::new() }
    }

    /// Emit a trace (add to log)
    pub fn emit(&mut self, trace: PoolTrace) {
        self.traces.push(trace);
    }

    /// Get all traces in emission order
    pub fn traces(&self) -> &[PoolTrace] {
        &self.traces
    }

    /// Take ownership of all traces
    pub fn into_traces(self) -> Vec<PoolTrace> {
        self.traces
    }

    /// Check if a particular trace was emitted
    pub fn contains(&self, trace: PoolTrace) -> bool {
        self.traces.iter().any(|t| *t == trace)
    }

    /// Check if any traces were emitted
    pub fn has_traces(&self) -> bool {
        !self.traces.is_empty()
    }

    /// Get number of traces
    pub fn len(&self) -> usize {
        self.traces.len()
    }

    /// Returns true if nothing was emitted
    pub fn is_empty(&self) -> bool {
        self.traces.is_empty()
    }

    /// Clear all traces
    pub fn clear(&mut self) {
        self.traces.clear();
    }
}
