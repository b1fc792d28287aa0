//! Protocol Constants
//!
//! All magic numbers and configuration values for the bonded pool.
//!
//! # Network Configuration
//!
//! Use feature flags to compile for different networks:
//! - `mainnet` - Production values (higher stake minimums)
//! - Default (no feature) - Testnet values (lower minimums for testing)
//!
//! ```toml
//! # For mainnet deployment:
//! bonded-common = { path = "...", features = ["mainnet"] }
//! ```

/// Token Metadata
pub mod token {
    /// Name of the staking token the pool accepts
    pub const NAME: &[u8] = b"BondedStakingToken";
    /// Decimal places
    pub const DECIMALS: u8 = 8;
    /// One unit with decimals (1 token = 100_000_000 base units)
    pub const ONE: u64 = 100_000_000;
}

/// Stake Limits
///
/// Values differ between mainnet and testnet to allow easier testing.
pub mod limits {
    use super::token::ONE;

    /// Minimum single deposit
    /// - Mainnet: 100 tokens (keeps the entry list from filling with dust)
    /// - Testnet: 1 token
    #[cfg(feature = "mainnet")]
    pub const MIN_STAKE: u64 = 100 * ONE;
    #[cfg(not(feature = "mainnet"))]
    pub const MIN_STAKE: u64 = ONE;

    /// Maximum single deposit (prevents concentration in one entry)
    pub const MAX_STAKE: u64 = 1_000_000 * ONE;

    /// Helper to check if running in mainnet mode
    #[cfg(feature = "mainnet")]
    pub const IS_MAINNET: bool = true;
    #[cfg(not(feature = "mainnet"))]
    pub const IS_MAINNET: bool = false;
}

/// Hash and credential sizes (fixed by the ledger)
pub mod sizes {
    /// Script and payment credential hashes
    pub const CREDENTIAL_HASH: usize = 28;
    /// Transaction ids and datum hashes
    pub const WIDE_HASH: usize = 32;
}
