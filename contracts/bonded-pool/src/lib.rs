//! Bonded Staking Pool Validator
//!
//! Spending checks for a script-locked stake pool. Participants bond a
//! single configured token; the datum carries the admin key, the
//! aggregate size, the bonded asset class, and the per-participant
//! entry list.
//!
//! ## Continuing Output Pattern (UTXO Model)
//!
//! Every action except closing re-locks the pool at its own address:
//! - The spent input tells the validator its own address and holdings
//! - Exactly one output must continue at that address
//! - The continuing datum is the declared post-action state; the rules
//!   recompute the state and compare node by node
//! - Approval only permits the spend; nothing is stored or called

use bonded_common::{
    check,
    constants::limits::{MAX_STAKE, MIN_STAKE},
    data::Data,
    errors::{PoolError, PoolResult},
    trace::{PoolTrace, TraceLog},
    types::{Credential, PubKeyHash, ScriptHash, ScriptPurpose, TransactionView, TxOut},
    validation::{apply_delta, require_signed_by},
    value::Value,
};

pub mod datum;
pub mod entries;

#[cfg(test)]
mod integration_tests;

pub use datum::{PoolDatum, PoolRedeemer};
pub use entries::{verify_entries_match, EntryList, EntryNode, StakeEntry};

// ============ Validation Context ============

/// Context for validating a pool spend
pub struct PoolContext {
    /// Ledger-supplied view of the transaction
    pub view: TransactionView,
    /// What the ledger asked the script to authorize
    pub purpose: ScriptPurpose,
    /// Success traces emitted along the way
    pub traces: TraceLog,
}

impl PoolContext {
    pub fn new(view: TransactionView, purpose: ScriptPurpose) -> Self {
        Self {
            view,
            purpose,
            traces: TraceLog::new(),
        }
    }
}

// ============ Validation Functions ============

/// Main validation entry point.
///
/// Decodes the raw redeemer and datum, locates the pool's own input,
/// and routes to the rule set for the requested action. Evaluation is
/// single-shot: the first failed check decides the result.
pub fn validate(ctx: &mut PoolContext, redeemer: &Data, datum: &Data) -> PoolResult<()> {
    let view = &ctx.view;
    let traces = &mut ctx.traces;

    // 1. The action must decode before anything else is looked at
    let action = PoolRedeemer::decode(redeemer)?;

    // 2. Only a spending purpose carries the input the rules need
    let own_ref = match ctx.purpose {
        ScriptPurpose::Spending(out_ref) => out_ref,
        ScriptPurpose::Minting(_) => return Err(PoolError::NotSpendingInput),
    };

    // 3. The spent output names the pool's own address and holdings
    let own_input = view
        .find_input(&own_ref)
        .ok_or(PoolError::NotSpendingInput)?;
    let own_script = match own_input.resolved.address.payment {
        Credential::Script(hash) => hash,
        Credential::PubKey(_) => return Err(PoolError::NotSpendingInput),
    };

    // 4. The datum must carry the pool-state constructor
    let pool = PoolDatum::decode(datum)?;

    match action {
        PoolRedeemer::AdminUpdate => {
            validate_admin_update(view, &own_input.resolved, &own_script, &pool)
        }
        PoolRedeemer::Deposit { key, amount } => validate_deposit(
            view,
            traces,
            &own_input.resolved,
            &own_script,
            &pool,
            &key,
            amount,
        ),
        PoolRedeemer::Withdraw { key, amount } => validate_withdraw(
            view,
            traces,
            &own_input.resolved,
            &own_script,
            &pool,
            &key,
            amount,
        ),
        PoolRedeemer::Close => validate_close(view, &own_script, &pool),
    }
}

/// Validate an administrator update.
///
/// The signature is the authority here: a signed admin may restructure
/// the entry list freely, as long as the declared size tracks the
/// pool's own asset movement and the list still sums to it.
fn validate_admin_update(
    view: &TransactionView,
    own: &TxOut,
    own_script: &ScriptHash,
    pool: &PoolDatum,
) -> PoolResult<()> {
    // 1. Only the admin updates the pool
    require_signed_by(view, &pool.admin_key)?;

    // 2. The pool must continue with a resolvable declared state
    let (declared, continuing) = locate_continuing_output(view, own_script)?;

    // 3. Size, identity, and accounting against the asset delta
    let moved = net_asset_movement(&own.value, &continuing).amount_of(&pool.asset_class);
    confirm_continuing_state(pool, &declared, moved)
}

/// Validate a participant deposit
fn validate_deposit(
    view: &TransactionView,
    traces: &mut TraceLog,
    own: &TxOut,
    own_script: &ScriptHash,
    pool: &PoolDatum,
    key: &PubKeyHash,
    amount: u64,
) -> PoolResult<()> {
    // 1. The pool must continue with a resolvable declared state
    let (declared, continuing) = locate_continuing_output(view, own_script)?;
    let diff = net_asset_movement(&own.value, &continuing);

    // 2. Currency-symbol predicate over movement and mint
    check_currency_symbol(view, traces, pool, &diff)?;

    // 3. The declared stake must land inside the pool's bounds
    check!(
        amount >= MIN_STAKE,
        PoolError::TokenNameOrAmountPredicateFailed {
            expected: MIN_STAKE as i128,
            moved: amount as i128,
        }
    );
    check!(
        amount <= MAX_STAKE,
        PoolError::TokenNameOrAmountPredicateFailed {
            expected: MAX_STAKE as i128,
            moved: amount as i128,
        }
    );

    // 4. Token-name predicate: the pool gains exactly the stake
    check_participant_movement(traces, pool, &diff, amount as i128)?;

    // 5. The declared entries must be the computed post-deposit list
    let expected = pool.entries.with_deposit(key, amount)?;
    verify_entries_match(&expected, &declared.entries)?;

    // 6. Size, identity, and accounting
    confirm_continuing_state(pool, &declared, amount as i128)
}

/// Validate a participant withdrawal
fn validate_withdraw(
    view: &TransactionView,
    traces: &mut TraceLog,
    own: &TxOut,
    own_script: &ScriptHash,
    pool: &PoolDatum,
    key: &PubKeyHash,
    amount: u64,
) -> PoolResult<()> {
    // 1. The pool must continue with a resolvable declared state
    let (declared, continuing) = locate_continuing_output(view, own_script)?;
    let diff = net_asset_movement(&own.value, &continuing);

    // 2. Currency-symbol predicate over movement and mint
    check_currency_symbol(view, traces, pool, &diff)?;

    // 3. Withdrawing nothing is not a withdrawal
    check!(
        amount > 0,
        PoolError::TokenNameOrAmountPredicateFailed {
            expected: 1,
            moved: 0,
        }
    );

    // 4. Token-name predicate: the pool loses exactly the stake
    check_participant_movement(traces, pool, &diff, -(amount as i128))?;

    // 5. The declared entries must be the computed post-withdrawal list
    let expected = pool.entries.with_withdrawal(key, amount)?;
    verify_entries_match(&expected, &declared.entries)?;

    // 6. Size, identity, and accounting
    confirm_continuing_state(pool, &declared, -(amount as i128))
}

/// Validate closing the pool.
///
/// Closing consumes the pool without continuation; whatever the pool
/// held is paid out under the admin's signature.
fn validate_close(
    view: &TransactionView,
    own_script: &ScriptHash,
    pool: &PoolDatum,
) -> PoolResult<()> {
    // 1. Only the admin dissolves the pool
    require_signed_by(view, &pool.admin_key)?;

    // 2. Nothing may continue at the pool address
    let remaining = view.outputs_at_script(own_script).len();
    check!(
        remaining == 0,
        PoolError::UnexpectedNonEmptyRemainder {
            remaining: remaining as u64,
        }
    );

    Ok(())
}

// ============ Continuation and Predicates ============

/// Find the single continuing output and decode its declared state.
///
/// Exactly one output may sit at the pool's own address. Its datum hash
/// must resolve through the witness table to a datum that actually
/// hashes back to it; anything less leaves the pool without a
/// trustworthy continuation.
fn locate_continuing_output(
    view: &TransactionView,
    own_script: &ScriptHash,
) -> PoolResult<(PoolDatum, Value)> {
    let candidates = view.outputs_at_script(own_script);

    // 1. Zero candidates is no continuation; several is ambiguous
    let output = match candidates.as_slice() {
        [single] => *single,
        _ => return Err(PoolError::ContinuingOutputNotFound),
    };

    // 2. The named datum must resolve and hash back to its name
    let hash = output
        .datum_hash
        .ok_or(PoolError::ContinuingOutputNotFound)?;
    let raw = view
        .lookup_datum(&hash)
        .ok_or(PoolError::ContinuingOutputNotFound)?;
    if raw.hash() != Some(hash) {
        return Err(PoolError::ContinuingOutputNotFound);
    }

    let declared = PoolDatum::decode(raw)?;
    Ok((declared, output.value.clone()))
}

/// Assets the pool gains across the spend: continuation minus own input
fn net_asset_movement(own_holding: &Value, continuing: &Value) -> Value {
    continuing.merge(&own_holding.negate())
}

/// Currency-symbol stage of the participant asset predicate.
///
/// Every asset the pool's output gains or loses must sit under the
/// pool's own policy, and anything minted under that policy must use
/// the configured token name.
fn check_currency_symbol(
    view: &TransactionView,
    traces: &mut TraceLog,
    pool: &PoolDatum,
    diff: &Value,
) -> PoolResult<()> {
    // 1. The pool's holdings only ever move in its own asset
    for (class, _) in diff.assets() {
        if class.symbol != pool.asset_class.symbol {
            return Err(PoolError::CurrencySymbolPredicateFailed);
        }
    }

    // 2. Whatever the policy mints this transaction is the pool token
    for (name, _) in view.mint.entries_under(&pool.asset_class.symbol) {
        if name != &pool.asset_class.name {
            return Err(PoolError::CurrencySymbolPredicateFailed);
        }
    }

    traces.emit(PoolTrace::CurrencySymbolOk);
    Ok(())
}

/// Token-name and amount stage of the participant asset predicate.
///
/// `expected_move` is signed: positive for deposits, negative for
/// withdrawals.
fn check_participant_movement(
    traces: &mut TraceLog,
    pool: &PoolDatum,
    diff: &Value,
    expected_move: i128,
) -> PoolResult<()> {
    // 1. Every moved asset must carry the configured token name
    for (name, moved) in diff.entries_under(&pool.asset_class.symbol) {
        if name != &pool.asset_class.name {
            return Err(PoolError::TokenNameOrAmountPredicateFailed {
                expected: expected_move,
                moved,
            });
        }
    }

    // 2. The pool must move exactly the declared amount
    let moved = diff.amount_of(&pool.asset_class);
    check!(
        moved == expected_move,
        PoolError::TokenNameOrAmountPredicateFailed {
            expected: expected_move,
            moved,
        }
    );

    traces.emit(PoolTrace::TokenNameAndAmountOk);
    Ok(())
}

/// Checks every action imposes on the declared continuing state.
///
/// Identity fields never change; the declared size must equal the input
/// size moved by `delta`; the declared entries must sum to it.
fn confirm_continuing_state(pool: &PoolDatum, declared: &PoolDatum, delta: i128) -> PoolResult<()> {
    // 1. Admin key and asset class are fixed at pool creation
    check!(
        declared.admin_key == pool.admin_key,
        PoolError::WrongDatumConstructor
    );
    check!(
        declared.asset_class == pool.asset_class,
        PoolError::WrongDatumConstructor
    );

    // 2. The declared size must be the input size moved by the delta
    let expected = apply_delta(pool.total_size, delta).ok_or(PoolError::SizeNotUpdatedCorrectly {
        declared: declared.total_size,
        expected: pool.total_size,
    })?;
    check!(
        declared.total_size == expected,
        PoolError::SizeNotUpdatedCorrectly {
            declared: declared.total_size,
            expected,
        }
    );

    // 3. The declared entry list must carry the declared size
    declared.entries.reconcile(declared.total_size)
}

// ============ Tests ============
