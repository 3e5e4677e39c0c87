//! Admission of top-level transactions.

use alloy_primitives::U256;
use tracing::debug;

use crate::{
    EnergyLimitRules, FvmSpecId, RejectionReason, StateError, StateReader, StateView, Transaction,
    TransactionResult,
};

/// Checks whether `transaction` may execute against `state`.
///
/// The checks run in a fixed order and the first failure wins:
/// 1. the energy limit lies within `rules` for the transaction kind;
/// 2. contract creation is still admitted under `spec`;
/// 3. the declared nonce equals the sender's nonce;
/// 4. the sender can cover `energy_limit * energy_price + value`.
///
/// # Returns
///
/// [`TransactionResult::Success`] carrying the full energy limit when every check passes,
/// [`TransactionResult::Rejected`] otherwise. Nothing is written to `state` either way.
pub fn check_transaction<S: StateReader + ?Sized>(
    state: &S,
    transaction: &Transaction,
    rules: &EnergyLimitRules,
    spec: FvmSpecId,
) -> Result<TransactionResult, StateError> {
    let rejected = |reason| {
        debug!(target: "fvm::validation", tx = %transaction.hash, ?reason, "Transaction rejected");
        Ok(TransactionResult::Rejected { reason, energy_limit: transaction.energy_limit })
    };

    if !rules.is_valid(transaction.energy_limit, transaction.is_create()) {
        return rejected(RejectionReason::InvalidEnergyLimit);
    }
    if transaction.is_create() && spec.rejects_deployments() {
        return rejected(RejectionReason::RejectDeploy);
    }
    if state.nonce(&transaction.sender)? != transaction.nonce {
        return rejected(RejectionReason::InvalidNonce);
    }
    let balance = state.balance(&transaction.sender)?;
    if transaction.max_cost().is_none_or(|cost| balance < cost) {
        return rejected(RejectionReason::InsufficientBalance);
    }

    Ok(TransactionResult::success(transaction.energy_limit))
}

/// Increments the sender's nonce and debits `energy_limit * energy_price` from its balance.
///
/// Runs once per admitted transaction, before any code. The charge is for the full limit;
/// settling unused energy is left to the caller.
pub fn increment_nonce_and_deduct_energy_cost(
    state: &mut dyn StateView,
    transaction: &Transaction,
) -> Result<(), StateError> {
    let cost = U256::from(transaction.energy_limit) * U256::from(transaction.energy_price);
    state.increment_nonce(transaction.sender)?;
    state.sub_balance(transaction.sender, cost)
}

#[cfg(test)]
mod tests {
    use alloy_primitives::{address, Address, TxKind};
    use rstest::rstest;

    use super::*;
    use crate::{
        constants::energy_limit::*,
        test_utils::{MemoryDatabase, TxBuilder, SENDER},
        RootState,
    };

    const RECIPIENT: Address = address!("0x0000000000000000000000000000000000000b0b");

    fn funded(balance: u64) -> RootState<MemoryDatabase> {
        MemoryDatabase::default().account_balance(SENDER, U256::from(balance)).into_state()
    }

    fn check(state: &RootState<MemoryDatabase>, tx: &Transaction) -> TransactionResult {
        check_transaction(state, tx, &EnergyLimitRules::default(), FvmSpecId::FORK_040).unwrap()
    }

    #[rstest]
    #[case::below_min_call(TxKind::Call(RECIPIENT), MIN_NON_CREATE - 1, false)]
    #[case::min_call(TxKind::Call(RECIPIENT), MIN_NON_CREATE, true)]
    #[case::max_call(TxKind::Call(RECIPIENT), MAX_NON_CREATE, true)]
    #[case::above_max_call(TxKind::Call(RECIPIENT), MAX_NON_CREATE + 1, false)]
    #[case::below_min_create(TxKind::Create, MIN_CREATE - 1, false)]
    #[case::min_create(TxKind::Create, MIN_CREATE, true)]
    #[case::max_create(TxKind::Create, MAX_CREATE, true)]
    #[case::above_max_create(TxKind::Create, MAX_CREATE + 1, false)]
    fn test_energy_limit_bounds(#[case] kind: TxKind, #[case] limit: u64, #[case] admitted: bool) {
        let state = funded(u64::MAX);
        let tx = TxBuilder::default().kind(kind).energy_limit(limit).build();
        let expected = if admitted {
            TransactionResult::success(limit)
        } else {
            TransactionResult::Rejected {
                reason: RejectionReason::InvalidEnergyLimit,
                energy_limit: limit,
            }
        };
        assert_eq!(check(&state, &tx), expected);
    }

    #[rstest]
    #[case::too_low(3, 2)]
    #[case::too_high(3, 4)]
    fn test_nonce_must_match_exactly(#[case] account_nonce: u64, #[case] tx_nonce: u64) {
        let state = MemoryDatabase::default()
            .account_balance(SENDER, U256::from(u64::MAX))
            .account_nonce(SENDER, account_nonce)
            .into_state();
        let tx = TxBuilder::call(RECIPIENT).nonce(tx_nonce).build();
        assert_eq!(
            check(&state, &tx),
            TransactionResult::Rejected {
                reason: RejectionReason::InvalidNonce,
                energy_limit: tx.energy_limit
            }
        );
    }

    #[test]
    fn test_balance_covers_energy_and_value() {
        let tx = TxBuilder::call(RECIPIENT)
            .energy_limit(50_000)
            .energy_price(2)
            .value(U256::from(7))
            .build();
        assert!(check(&funded(100_007), &tx).is_success());
        assert_eq!(
            check(&funded(100_006), &tx),
            TransactionResult::Rejected {
                reason: RejectionReason::InsufficientBalance,
                energy_limit: 50_000
            }
        );
    }

    #[test]
    fn test_overflowing_cost_is_insufficient_balance() {
        let tx = TxBuilder::call(RECIPIENT).energy_price(u64::MAX).value(U256::MAX).build();
        assert_eq!(
            check(&funded(u64::MAX), &tx).code(),
            crate::ResultCode::Rejected(RejectionReason::InsufficientBalance)
        );
    }

    #[test]
    fn test_deployments_rejected_after_signature_swap() {
        let state = funded(u64::MAX);
        let tx = TxBuilder::create().build();
        let rules = EnergyLimitRules::default();
        assert!(check_transaction(&state, &tx, &rules, FvmSpecId::FORK_040).unwrap().is_success());
        assert_eq!(
            check_transaction(&state, &tx, &rules, FvmSpecId::SIGNATURE_SWAP).unwrap(),
            TransactionResult::Rejected {
                reason: RejectionReason::RejectDeploy,
                energy_limit: tx.energy_limit
            }
        );
    }

    #[test]
    fn test_energy_limit_checked_before_nonce() {
        let state = funded(0);
        let tx = TxBuilder::call(RECIPIENT).nonce(9).energy_limit(1).build();
        assert_eq!(
            check(&state, &tx).code(),
            crate::ResultCode::Rejected(RejectionReason::InvalidEnergyLimit)
        );
    }

    #[test]
    fn test_checks_do_not_mutate_state() {
        let state = funded(1);
        let tx = TxBuilder::call(RECIPIENT).build();
        assert!(check(&state, &tx).is_rejected());
        assert!(state.journal().is_empty());
    }

    #[test]
    fn test_pre_charge() {
        let mut state = funded(1_000_000);
        let tx = TxBuilder::call(RECIPIENT).energy_limit(30_000).energy_price(3).build();
        increment_nonce_and_deduct_energy_cost(&mut state, &tx).unwrap();
        assert_eq!(state.nonce(&SENDER).unwrap(), 1);
        assert_eq!(state.balance(&SENDER).unwrap(), U256::from(1_000_000 - 90_000));
    }
}
