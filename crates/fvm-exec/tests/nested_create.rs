//! Tests for `CREATE` frames opened by running contracts.

use alloy_primitives::{address, bytes, Address, Bytes, U256};
use fvm_exec::{test_utils::*, *};

const FACTORY: Address = address!("0x00000000000000000000000000000000000fac70");
const FACTORY_CODE: Bytes = bytes!("f0");
const INIT_CODE: Bytes = bytes!("60806040");
const RUNTIME_CODE: Bytes = bytes!("6080604052");

fn child() -> Address {
    FACTORY.create(0)
}

fn db() -> MemoryDatabase {
    MemoryDatabase::default()
        .account_balance(SENDER, U256::from(1_000_000))
        .account_balance(FACTORY, U256::from(50))
        .account_code(FACTORY, FACTORY_CODE)
}

/// A factory that creates one child with `init_code` and `value`, and logs the encoded result.
fn factory(init_code: Bytes, value: u64) -> MockInterpreter {
    MockInterpreter::default().with_script(FACTORY_CODE, move |host| {
        let message = CallMessage {
            data: init_code.clone(),
            value: U256::from(value),
            ..nested_message(&*host, CallKind::Create, Address::ZERO)
        };
        let result = host.call(message)?;
        host.log(FACTORY, vec![], result.encode());
        Ok(TransactionResult::success(host.context().energy))
    })
}

fn run(interpreter: MockInterpreter, state: &mut RootState<MemoryDatabase>) -> ExecutionOutcome {
    let executor = FvmExecutor::new(interpreter, VmConfig::default());
    let outcome = executor.execute(state, &TxBuilder::call(FACTORY).build(), &block(1)).unwrap();
    assert!(outcome.result.is_success());
    outcome
}

fn child_result(outcome: &ExecutionOutcome) -> TransactionResult {
    TransactionResult::decode(&outcome.side_effects.logs()[0].data.data).unwrap()
}

#[test]
fn test_nested_create_deploys_code() {
    let interpreter = factory(INIT_CODE, 20).with_script(INIT_CODE, |host| {
        assert_eq!(host.context().destination, FACTORY.create(0));
        assert_eq!(host.context().kind, CallKind::Create);
        Ok(TransactionResult::Success { energy_remaining: 5_000, output: RUNTIME_CODE })
    });
    let mut state = db().into_state();

    let outcome = run(interpreter, &mut state);

    assert_eq!(
        child_result(&outcome),
        TransactionResult::Success {
            energy_remaining: 5_000,
            output: Bytes::copy_from_slice(child().as_slice()),
        }
    );
    assert_eq!(state.code(&child()).unwrap(), RUNTIME_CODE);
    assert_eq!(state.nonce(&child()).unwrap(), 1);
    assert_eq!(state.balance(&child()).unwrap(), U256::from(20));
    assert_eq!(state.nonce(&FACTORY).unwrap(), 1);
    assert_eq!(state.balance(&FACTORY).unwrap(), U256::from(30));

    let records = outcome.side_effects.internal_transactions();
    let summary: Vec<_> =
        records.iter().map(|r| (r.to, r.nonce, r.index, r.note.as_str(), r.rejected)).collect();
    assert_eq!(
        summary,
        vec![
            (Some(child()), 0, 0, InternalTransaction::CREATE, false),
            (None, 1, 1, InternalTransaction::CREATE, false),
        ]
    );
}

#[test]
fn test_nested_create_without_init_code() {
    let mut state = db().into_state();

    let outcome = run(factory(Bytes::new(), 0), &mut state);

    assert!(child_result(&outcome).is_success());
    assert!(state.has_account(&child()).unwrap());
    assert_eq!(state.nonce(&child()).unwrap(), 1);
    assert!(state.code(&child()).unwrap().is_empty());
}

/// Without init code there is no code to deposit, so even a frame holding less than the deposit
/// cost succeeds with all its energy.
#[test]
fn test_nested_create_without_init_code_skips_code_deposit() {
    let interpreter = MockInterpreter::default().with_script(FACTORY_CODE, |host| {
        let message = CallMessage {
            energy_limit: 500,
            ..nested_message(&*host, CallKind::Create, Address::ZERO)
        };
        let result = host.call(message)?;
        host.log(FACTORY, vec![], result.encode());
        Ok(TransactionResult::success(host.context().energy))
    });
    let mut state = db().into_state();

    let outcome = run(interpreter, &mut state);

    assert_eq!(
        child_result(&outcome),
        TransactionResult::Success {
            energy_remaining: 500,
            output: Bytes::copy_from_slice(child().as_slice()),
        }
    );
    assert_eq!(state.nonce(&child()).unwrap(), 1);
    assert_eq!(state.nonce(&FACTORY).unwrap(), 1);
    assert!(outcome.side_effects.internal_transactions().iter().all(|r| !r.rejected));
}

/// Nested creations always treat any existing account as a collision, even after the 040
/// upgrade.
#[test]
fn test_nested_create_collision() {
    let mut state = db().account_balance(child(), U256::from(1)).into_state();
    let config = VmConfig::default()
        .with_hardforks(ForkActivations { fork_040: Some(0), ..Default::default() });
    let executor = FvmExecutor::new(factory(INIT_CODE, 20), config);

    let tx = TxBuilder::call(FACTORY).build();
    let outcome = executor.execute(&mut state, &tx, &block(1)).unwrap();

    assert_eq!(child_result(&outcome), TransactionResult::failure());
    assert_eq!(state.balance(&child()).unwrap(), U256::from(1));
    assert_eq!(state.nonce(&child()).unwrap(), 0);
    assert_eq!(state.nonce(&FACTORY).unwrap(), 0);
    assert_eq!(state.balance(&FACTORY).unwrap(), U256::from(50));
    assert!(executor.interpreter().invocations().iter().all(|run| run.code != INIT_CODE));
    assert!(outcome.side_effects.internal_transactions().iter().all(|r| r.rejected));
    assert_eq!(outcome.side_effects.internal_transactions().len(), 2);
}

#[test]
fn test_nested_code_deposit_shortfall_rolls_back() {
    let interpreter = factory(INIT_CODE, 20).with_script(INIT_CODE, |_| {
        Ok(TransactionResult::Success { energy_remaining: 999, output: RUNTIME_CODE })
    });
    let mut state = db().into_state();

    let outcome = run(interpreter, &mut state);

    assert_eq!(child_result(&outcome), TransactionResult::failure());
    assert!(!state.has_account(&child()).unwrap());
    assert_eq!(state.nonce(&FACTORY).unwrap(), 0);
    assert_eq!(state.balance(&FACTORY).unwrap(), U256::from(50));
    let rejected: Vec<_> =
        outcome.side_effects.internal_transactions().iter().map(|r| r.rejected).collect();
    assert_eq!(rejected, vec![true, true]);
}

#[test]
fn test_failed_init_code_discards_its_logs() {
    let interpreter = factory(INIT_CODE, 0).with_script(INIT_CODE, |host| {
        host.log(FACTORY.create(0), vec![], bytes!("ff"));
        Ok(TransactionResult::Revert { energy_remaining: 10, output: bytes!("0bad") })
    });
    let mut state = db().into_state();

    let outcome = run(interpreter, &mut state);

    assert_eq!(
        child_result(&outcome),
        TransactionResult::Revert { energy_remaining: 10, output: bytes!("0bad") }
    );
    assert_eq!(outcome.side_effects.logs().len(), 1);
    assert!(!state.has_account(&child()).unwrap());
}
