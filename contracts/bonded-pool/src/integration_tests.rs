//! Integration Tests
//!
//! End-to-end tests that drive the validator through whole pool
//! lifetimes: successive spends, adversarial transaction shapes, and
//! the diagnostics operators see when a spend is refused.

#[cfg(test)]
mod tests {
    use crate::*;
    use bonded_common::constants::limits::MIN_STAKE;
    use bonded_common::data::Data;
    use bonded_common::errors::PoolError;
    use bonded_common::trace::PoolTrace;
    use bonded_common::types::{Address, PubKeyHash, ScriptHash, ScriptPurpose, TxInInfo, TxOut, TxOutRef};
    use bonded_common::value::{AssetClass, Value};

    const UNIT: u64 = MIN_STAKE;

    fn admin() -> PubKeyHash {
        [1u8; 28]
    }

    fn alice() -> PubKeyHash {
        [2u8; 28]
    }

    fn bob() -> PubKeyHash {
        [4u8; 28]
    }

    fn pool_script() -> ScriptHash {
        [9u8; 28]
    }

    fn pool_asset() -> AssetClass {
        AssetClass::bonded([5u8; 28])
    }

    fn genesis_pool() -> PoolDatum {
        PoolDatum::new(admin(), pool_asset())
    }

    /// Next pool state after a bookkeeping change
    fn advanced(pool: &PoolDatum, entries: EntryList, total_size: u64) -> PoolDatum {
        PoolDatum {
            entries,
            total_size,
            ..pool.clone()
        }
    }

    /// One spend: the pool input holds its declared size, the
    /// continuation holds it moved by `gain` and declares `declared`.
    /// Signed by the admin; participant actions ignore the signature.
    fn spend_context(pool: &PoolDatum, declared: &PoolDatum, gain: i128) -> PoolContext {
        let own_ref = TxOutRef::new([7u8; 32], 0);
        let held = Value::singleton(pool_asset(), pool.total_size as i128);
        let own_out = TxOut::new(Address::script(pool_script()), held.clone())
            .with_datum_hash(pool.encode().hash().unwrap());

        let declared_raw = declared.encode();
        let declared_hash = declared_raw.hash().unwrap();
        let continuing = TxOut::new(Address::script(pool_script()), held.add(pool_asset(), gain))
            .with_datum_hash(declared_hash);

        let mut view = TransactionView::new();
        view.inputs.push(TxInInfo::new(own_ref, own_out));
        view.outputs.push(continuing);
        view.datums.push((declared_hash, declared_raw));
        view.signatories.push(pool.admin_key);

        PoolContext::new(view, ScriptPurpose::Spending(own_ref))
    }

    /// Closing spend: everything the pool held is paid to the admin
    fn close_context(pool: &PoolDatum) -> PoolContext {
        let own_ref = TxOutRef::new([7u8; 32], 0);
        let held = Value::singleton(pool_asset(), pool.total_size as i128);
        let own_out = TxOut::new(Address::script(pool_script()), held.clone())
            .with_datum_hash(pool.encode().hash().unwrap());

        let mut view = TransactionView::new();
        view.inputs.push(TxInInfo::new(own_ref, own_out));
        view.outputs.push(TxOut::new(Address::pubkey(admin()), held));
        view.signatories.push(pool.admin_key);

        PoolContext::new(view, ScriptPurpose::Spending(own_ref))
    }

    fn run_action(
        pool: &PoolDatum,
        declared: &PoolDatum,
        gain: i128,
        action: &PoolRedeemer,
    ) -> PoolResult<()> {
        let mut ctx = spend_context(pool, declared, gain);
        validate(&mut ctx, &action.encode(), &pool.encode())
    }

    // ============================================================================
    // Pool Lifecycle
    // ============================================================================

    #[test]
    fn test_full_pool_lifecycle() {
        let pool = genesis_pool();

        // 1. Alice bonds 30
        let entries = pool.entries.with_deposit(&alice(), 30 * UNIT).unwrap();
        let next = advanced(&pool, entries, 30 * UNIT);
        let action = PoolRedeemer::Deposit {
            key: alice(),
            amount: 30 * UNIT,
        };
        assert!(run_action(&pool, &next, (30 * UNIT) as i128, &action).is_ok());
        let pool = next;

        // 2. Bob bonds 50
        let entries = pool.entries.with_deposit(&bob(), 50 * UNIT).unwrap();
        let next = advanced(&pool, entries, 80 * UNIT);
        let action = PoolRedeemer::Deposit {
            key: bob(),
            amount: 50 * UNIT,
        };
        assert!(run_action(&pool, &next, (50 * UNIT) as i128, &action).is_ok());
        let pool = next;

        // 3. Alice takes 10 back out
        let entries = pool.entries.with_withdrawal(&alice(), 10 * UNIT).unwrap();
        let next = advanced(&pool, entries, 70 * UNIT);
        let action = PoolRedeemer::Withdraw {
            key: alice(),
            amount: 10 * UNIT,
        };
        assert!(run_action(&pool, &next, -((10 * UNIT) as i128), &action).is_ok());
        let pool = next;

        // 4. The admin moves 8 in and credits it to Bob as a reward
        let entries = EntryList::from_entries(vec![
            StakeEntry::new(alice(), 20 * UNIT),
            StakeEntry::new(bob(), 58 * UNIT),
        ]);
        let next = advanced(&pool, entries, 78 * UNIT);
        assert!(run_action(&pool, &next, (8 * UNIT) as i128, &PoolRedeemer::AdminUpdate).is_ok());
        let pool = next;

        // 5. Alice leaves entirely
        let entries = pool.entries.with_withdrawal(&alice(), 20 * UNIT).unwrap();
        let next = advanced(&pool, entries, 58 * UNIT);
        let action = PoolRedeemer::Withdraw {
            key: alice(),
            amount: 20 * UNIT,
        };
        assert!(run_action(&pool, &next, -((20 * UNIT) as i128), &action).is_ok());
        let pool = next;

        // 6. The admin dissolves the pool and pays Bob's stake out
        let mut ctx = close_context(&pool);
        let result = validate(&mut ctx, &PoolRedeemer::Close.encode(), &pool.encode());
        assert!(result.is_ok(), "close should succeed: {:?}", result);
    }

    #[test]
    fn test_validates_through_wire_encoding() {
        let pool = advanced(
            &genesis_pool(),
            EntryList::from_entries(vec![StakeEntry::new(alice(), 30 * UNIT)]),
            30 * UNIT,
        );
        let entries = pool.entries.with_deposit(&bob(), 20 * UNIT).unwrap();
        let next = advanced(&pool, entries, 50 * UNIT);

        // The datum as it crosses the wire: CBOR bytes, then raw data
        let wire = pool.encode().to_cbor().unwrap();
        let datum = Data::from_cbor(&wire).unwrap();

        let action = PoolRedeemer::Deposit {
            key: bob(),
            amount: 20 * UNIT,
        };
        let mut ctx = spend_context(&pool, &next, (20 * UNIT) as i128);
        assert!(validate(&mut ctx, &action.encode(), &datum).is_ok());
    }

    // ============================================================================
    // Adversarial Scenarios
    // ============================================================================

    #[test]
    fn test_stale_declared_state_is_rejected() {
        let pool = genesis_pool();
        let entries = pool.entries.with_deposit(&alice(), 30 * UNIT).unwrap();
        let next = advanced(&pool, entries, 30 * UNIT);
        let action = PoolRedeemer::Deposit {
            key: alice(),
            amount: 30 * UNIT,
        };
        assert!(run_action(&pool, &next, (30 * UNIT) as i128, &action).is_ok());

        // Replaying the accepted declaration against the advanced pool
        // no longer matches the recomputed list
        let result = run_action(&next, &next, (30 * UNIT) as i128, &action);
        assert!(matches!(result, Err(PoolError::ElementNotFound { .. })));
    }

    #[test]
    fn test_deposit_cannot_debit_other_participants() {
        let pool = advanced(
            &genesis_pool(),
            EntryList::from_entries(vec![
                StakeEntry::new(alice(), 30 * UNIT),
                StakeEntry::new(bob(), 50 * UNIT),
            ]),
            80 * UNIT,
        );
        // Alice's deposit quietly shaves 10 off Bob's record
        let declared = advanced(
            &pool,
            EntryList::from_entries(vec![
                StakeEntry::new(alice(), 50 * UNIT),
                StakeEntry::new(bob(), 40 * UNIT),
            ]),
            90 * UNIT,
        );
        let action = PoolRedeemer::Deposit {
            key: alice(),
            amount: 20 * UNIT,
        };
        let result = run_action(&pool, &declared, (20 * UNIT) as i128, &action);
        assert!(matches!(result, Err(PoolError::ElementNotFound { key }) if key == bob()));
    }

    #[test]
    fn test_withdraw_cannot_take_more_than_released() {
        let pool = advanced(
            &genesis_pool(),
            EntryList::from_entries(vec![
                StakeEntry::new(alice(), 30 * UNIT),
                StakeEntry::new(bob(), 50 * UNIT),
            ]),
            80 * UNIT,
        );
        // Bookkeeping says 10, the transaction pockets 15
        let entries = pool.entries.with_withdrawal(&alice(), 10 * UNIT).unwrap();
        let declared = advanced(&pool, entries, 70 * UNIT);
        let action = PoolRedeemer::Withdraw {
            key: alice(),
            amount: 10 * UNIT,
        };
        let result = run_action(&pool, &declared, -((15 * UNIT) as i128), &action);
        assert!(matches!(
            result,
            Err(PoolError::TokenNameOrAmountPredicateFailed { expected, moved })
                if expected == -((10 * UNIT) as i128) && moved == -((15 * UNIT) as i128)
        ));
    }

    #[test]
    fn test_participant_cannot_impersonate_admin() {
        let pool = advanced(
            &genesis_pool(),
            EntryList::from_entries(vec![StakeEntry::new(alice(), 30 * UNIT)]),
            30 * UNIT,
        );
        let declared = advanced(
            &pool,
            EntryList::from_entries(vec![StakeEntry::new(bob(), 30 * UNIT)]),
            30 * UNIT,
        );
        let mut ctx = spend_context(&pool, &declared, 0);
        ctx.view.signatories = vec![bob()];

        let result = validate(&mut ctx, &PoolRedeemer::AdminUpdate.encode(), &pool.encode());
        assert!(matches!(
            result,
            Err(PoolError::NotSignedByAdmin { admin: a }) if a == admin()
        ));
    }

    #[test]
    fn test_admin_repairs_unrecognized_entry_node() {
        let broken = PoolDatum {
            admin_key: admin(),
            total_size: 40 * UNIT,
            asset_class: pool_asset(),
            entries: EntryList::from_nodes(vec![
                EntryNode::Entry(StakeEntry::new(alice(), 40 * UNIT)),
                EntryNode::Unknown(7),
            ]),
        };

        // Participants are locked out by the unrecognized node
        let declared = advanced(
            &broken,
            EntryList::from_entries(vec![StakeEntry::new(alice(), 50 * UNIT)]),
            50 * UNIT,
        );
        let action = PoolRedeemer::Deposit {
            key: alice(),
            amount: 10 * UNIT,
        };
        let result = run_action(&broken, &declared, (10 * UNIT) as i128, &action);
        assert!(matches!(result, Err(PoolError::UnmatchedConstructor { tag: 7 })));

        // The admin can restore a clean list carrying the same size
        let repaired = advanced(
            &broken,
            EntryList::from_entries(vec![StakeEntry::new(alice(), 40 * UNIT)]),
            40 * UNIT,
        );
        assert!(run_action(&broken, &repaired, 0, &PoolRedeemer::AdminUpdate).is_ok());
    }

    // ============================================================================
    // Ordering, Determinism, and Diagnostics
    // ============================================================================

    #[test]
    fn test_first_failure_decides() {
        let pool = advanced(
            &genesis_pool(),
            EntryList::from_entries(vec![StakeEntry::new(alice(), 30 * UNIT)]),
            30 * UNIT,
        );

        // Unsigned admin update with no continuation: signature first
        let mut ctx = spend_context(&pool, &pool, 0);
        ctx.view.signatories.clear();
        ctx.view.outputs.clear();
        let result = validate(&mut ctx, &PoolRedeemer::AdminUpdate.encode(), &pool.encode());
        assert!(matches!(result, Err(PoolError::NotSignedByAdmin { .. })));

        // Signed but still no continuation: the locator fires next
        let mut ctx = spend_context(&pool, &pool, 0);
        ctx.view.outputs.clear();
        let result = validate(&mut ctx, &PoolRedeemer::AdminUpdate.encode(), &pool.encode());
        assert!(matches!(result, Err(PoolError::ContinuingOutputNotFound)));

        // A participant flow without a continuation never reaches the
        // asset predicates, so no trace is emitted
        let mut ctx = spend_context(&pool, &pool, 0);
        ctx.view.outputs.clear();
        let action = PoolRedeemer::Deposit {
            key: bob(),
            amount: 10 * UNIT,
        };
        let result = validate(&mut ctx, &action.encode(), &pool.encode());
        assert!(matches!(result, Err(PoolError::ContinuingOutputNotFound)));
        assert!(ctx.traces.is_empty());
    }

    #[test]
    fn test_validation_is_deterministic() {
        let pool = advanced(
            &genesis_pool(),
            EntryList::from_entries(vec![StakeEntry::new(alice(), 30 * UNIT)]),
            30 * UNIT,
        );
        let entries = pool.entries.with_deposit(&bob(), 20 * UNIT).unwrap();
        let next = advanced(&pool, entries, 50 * UNIT);
        let action = PoolRedeemer::Deposit {
            key: bob(),
            amount: 20 * UNIT,
        };

        let mut first = spend_context(&pool, &next, (20 * UNIT) as i128);
        let mut second = spend_context(&pool, &next, (20 * UNIT) as i128);
        let result_first = validate(&mut first, &action.encode(), &pool.encode());
        let result_second = validate(&mut second, &action.encode(), &pool.encode());

        assert_eq!(result_first, result_second);
        assert_eq!(first.traces.traces(), second.traces.traces());
        assert_eq!(
            first.traces.traces(),
            &[PoolTrace::CurrencySymbolOk, PoolTrace::TokenNameAndAmountOk]
        );
    }

    #[test]
    fn test_errors_carry_codes_and_diagnostics() {
        let pool = advanced(
            &genesis_pool(),
            EntryList::from_entries(vec![StakeEntry::new(alice(), 30 * UNIT)]),
            30 * UNIT,
        );

        let mut ctx = spend_context(&pool, &pool, 0);
        ctx.view.signatories.clear();
        let err = validate(&mut ctx, &PoolRedeemer::AdminUpdate.encode(), &pool.encode())
            .unwrap_err();
        assert_eq!(err.code(), "E030_NOT_SIGNED_BY_ADMIN");
        assert_eq!(err.diagnostic(), "transaction not signed by admin");
        assert!(!err.is_decode_failure());

        let err = validate(&mut spend_context(&pool, &pool, 0), &Data::int(3), &pool.encode())
            .unwrap_err();
        assert!(err.is_decode_failure());
        assert_eq!(
            err.diagnostic(),
            "Pattern match failure in 'do' block at src/BondedPool.hs:171:9-27"
        );

        let mut ctx = spend_context(&pool, &pool, 0);
        ctx.view.outputs.clear();
        let err = validate(&mut ctx, &PoolRedeemer::AdminUpdate.encode(), &pool.encode())
            .unwrap_err();
        assert_eq!(err.code(), "E020_NO_CONTINUING_OUTPUT");
        assert_eq!(err.diagnostic(), "could not find datum hash in txOut");
    }
}
