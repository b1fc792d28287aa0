//! Validation Helpers
//!
//! Centralized validation utilities shared by the validator's checks.
//!
//! ## Features
//!
//! - `check!` macro for cleaner validation code
//! - `require_signed_by()` for signature checks
//! - `apply_delta()` for overflow-safe size arithmetic
//!
//! ## Usage
//!
//! ```rust,ignore
//! use bonded_common::{check, require_signed_by};
//!
//! // Using check! macro
//! check!(amount > 0, PoolError::CurrencySymbolPredicateFailed);
//!
//! // Signature check
//! require_signed_by(&view, &datum.admin_key)?;
//! ```

use crate::errors::{PoolError, PoolResult};
use crate::types::{PubKeyHash, TransactionView};

// ============ Validation Macro ============

/// Check a condition and return an error if it fails.
///
/// Combines the condition check and the error return in a single
/// expression.
///
/// # Examples
///
/// ```rust,ignore
/// check!(outputs.is_empty(), PoolError::UnexpectedNonEmptyRemainder {
///     remaining: outputs.len() as u64,
/// });
/// ```
#[macro_export]
macro_rules! check {
    ($condition:expr, $error:expr) => {
        if !($condition) {
            return Err($error);
        }
    };
}

pub use check;

// ============ Signature Checks ============

/// Require the transaction to be signed by the given admin key.
pub fn require_signed_by(view: &TransactionView, admin: &PubKeyHash) -> PoolResult<()> {
    if !view.is_signed_by(admin) {
        return Err(PoolError::NotSignedByAdmin { admin: *admin });
    }
    Ok(())
}

// ============ Size Arithmetic ============

/// Apply a signed delta to an accounting size.
///
/// Returns `None` when the result leaves the `u64` range; callers turn
/// that into the size-consistency failure of the check at hand.
pub fn apply_delta(base: u64, delta: i128) -> Option<u64> {
    let shifted = (base as i128).checked_add(delta)?;
    u64::try_from(shifted).ok()
}
