//! Error Types for the Bonded Pool Validator
//!
//! Every failed check maps to exactly one of these kinds. All of them are
//! fatal: evaluation short-circuits on the first failure and the spend is
//! rejected. `diagnostic()` carries the trace string the deployed script
//! reports for the same condition, `code()` a stable machine-readable tag.

/// Result type alias for validator checks
pub type PoolResult<T> = Result<T, PoolError>;

/// Main error enum for all bonded pool validation failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    // ============ Dispatch Errors ============
    /// Redeemer did not decode to any known action
    MalformedRedeemer,

    /// Script was not invoked to spend an input it can locate
    NotSpendingInput,

    // ============ Datum Errors ============
    /// Datum shape is not the pool-state constructor
    WrongDatumConstructor,

    // ============ Continuation Errors ============
    /// No unique continuing output with a resolvable datum
    ContinuingOutputNotFound,

    // ============ Admin Errors ============
    /// Transaction lacks the administrator's signature
    NotSignedByAdmin { admin: [u8; 28] },

    /// Declared pool size disagrees with the reconstructed one
    SizeNotUpdatedCorrectly { declared: u64, expected: u64 },

    // ============ Asset Predicate Errors ============
    /// Minted or moved asset fails the currency-symbol predicate
    CurrencySymbolPredicateFailed,

    /// Token name or amount moved disagrees with the action
    TokenNameOrAmountPredicateFailed { expected: i128, moved: i128 },

    // ============ Entry List Errors ============
    /// Required entry is missing from the list
    ElementNotFound { key: [u8; 28] },

    /// Node tag fell through every known constructor arm
    UnmatchedConstructor { tag: u64 },

    /// Nodes remain where the list was required to end
    UnexpectedNonEmptyRemainder { remaining: u64 },
}

impl PoolError {
    /// Stable machine-readable code for indexing and assertions
    pub fn code(&self) -> &'static str {
        match self {
            Self::MalformedRedeemer => "E001_MALFORMED_REDEEMER",
            Self::NotSpendingInput => "E002_NOT_SPENDING_INPUT",
            Self::WrongDatumConstructor => "E010_WRONG_DATUM_CONSTRUCTOR",
            Self::ContinuingOutputNotFound => "E020_NO_CONTINUING_OUTPUT",
            Self::NotSignedByAdmin { .. } => "E030_NOT_SIGNED_BY_ADMIN",
            Self::SizeNotUpdatedCorrectly { .. } => "E031_SIZE_NOT_UPDATED",
            Self::CurrencySymbolPredicateFailed => "E040_CURRENCY_SYMBOL_PREDICATE",
            Self::TokenNameOrAmountPredicateFailed { .. } => "E041_TOKEN_NAME_OR_AMOUNT",
            Self::ElementNotFound { .. } => "E050_ELEMENT_NOT_FOUND",
            Self::UnmatchedConstructor { .. } => "E051_UNMATCHED_CONSTRUCTOR",
            Self::UnexpectedNonEmptyRemainder { .. } => "E052_NON_EMPTY_REMAINDER",
        }
    }

    /// The trace string the deployed script emits for this condition
    pub fn diagnostic(&self) -> &'static str {
        match self {
            Self::MalformedRedeemer => {
                "Pattern match failure in 'do' block at src/BondedPool.hs:171:9-27"
            }
            Self::NotSpendingInput => "cannot get input because tx is not of spending type",
            Self::WrongDatumConstructor => {
                "adminActLogic: update failed because a wrong datum constructor was provided"
            }
            Self::ContinuingOutputNotFound => "could not find datum hash in txOut",
            Self::NotSignedByAdmin { .. } => "transaction not signed by admin",
            Self::SizeNotUpdatedCorrectly { .. } => {
                "adminActLogic: update failed because new size was not updated correctly"
            }
            Self::CurrencySymbolPredicateFailed => "predicate on CurrencySymbol not satisfied",
            Self::TokenNameOrAmountPredicateFailed { .. } => {
                "predicate on TokenName/amount not satisfied"
            }
            Self::ElementNotFound { .. } => "find: element not found",
            Self::UnmatchedConstructor { .. } => {
                "reached end of sum while still not having found the constructor"
            }
            Self::UnexpectedNonEmptyRemainder { .. } => "list is longer than zero",
        }
    }

    /// Returns true if the failure happened while decoding wire data,
    /// before any rule logic ran
    pub fn is_decode_failure(&self) -> bool {
        matches!(
            self,
            Self::MalformedRedeemer | Self::WrongDatumConstructor | Self::UnmatchedConstructor { .. }
        )
    }
}
