//! Execution of top-level transactions.
//!
//! [`FvmExecutor`] is the entry point of the crate. For each transaction it:
//!
//! 1. runs the admission checks of [`check_transaction`], returning the rejection untouched if
//!    one applies;
//! 2. pre-charges the sender with [`increment_nonce_and_deduct_energy_cost`];
//! 3. opens the root frame in a tracked view over the caller's state and runs it, either as a
//!    plain call or as a contract creation;
//! 4. flushes the view if the root frame succeeded and rolls it back otherwise.
//!
//! The pre-charge of step 2 lands directly in the caller's state and survives a failed frame.

use alloy_primitives::{Address, Bytes};
use tracing::{debug, info, trace};

use crate::{
    check_transaction, increment_nonce_and_deduct_energy_cost, merge_frame, state::transfer,
    BlockContext, CallDispatcher, ContractAddressScheme, ExecutionContext, ExecutionError,
    FvmSpecId, Interpreter, NestedState, NoPrecompiles, PrecompileSet, RlpContractAddress,
    SideEffects, StateReader, StateView, Transaction, TransactionResult, VmConfig,
};

/// What executing one transaction produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionOutcome {
    /// The result of the root frame, or the rejection.
    pub result: TransactionResult,
    /// Side effects of the root frame, merged the same way a nested frame's are.
    pub side_effects: SideEffects,
    /// The address a creation targeted, whether or not it succeeded.
    pub contract_address: Option<Address>,
    /// Energy consumed, `energy_limit - remaining`. Zero for rejected transactions.
    pub energy_used: u64,
}

impl ExecutionOutcome {
    fn rejected(result: TransactionResult) -> Self {
        Self {
            result,
            side_effects: SideEffects::default(),
            contract_address: None,
            energy_used: 0,
        }
    }
}

/// Executes transactions on top of an external interpreter.
///
/// # Type Parameters
///
/// - `I`: the bytecode [`Interpreter`]
/// - `P`: the [`PrecompileSet`] consulted before the interpreter on every call
/// - `A`: the [`ContractAddressScheme`] deriving contract addresses
#[derive(Debug, Clone)]
pub struct FvmExecutor<I, P = NoPrecompiles, A = RlpContractAddress> {
    interpreter: I,
    precompiles: P,
    addresses: A,
    config: VmConfig,
}

impl<I: Interpreter> FvmExecutor<I> {
    /// Creates an executor without precompiles that derives addresses from `(sender, nonce)`.
    pub fn new(interpreter: I, config: VmConfig) -> Self {
        Self { interpreter, precompiles: NoPrecompiles, addresses: RlpContractAddress, config }
    }
}

impl<I, P, A> FvmExecutor<I, P, A> {
    /// Replaces the precompile set.
    pub fn with_precompiles<Q: PrecompileSet>(self, precompiles: Q) -> FvmExecutor<I, Q, A> {
        FvmExecutor {
            interpreter: self.interpreter,
            precompiles,
            addresses: self.addresses,
            config: self.config,
        }
    }

    /// Replaces the contract address derivation.
    pub fn with_address_scheme<B: ContractAddressScheme>(
        self,
        addresses: B,
    ) -> FvmExecutor<I, P, B> {
        FvmExecutor {
            interpreter: self.interpreter,
            precompiles: self.precompiles,
            addresses,
            config: self.config,
        }
    }

    /// Returns the configuration.
    pub const fn config(&self) -> &VmConfig {
        &self.config
    }

    /// Returns the interpreter.
    pub const fn interpreter(&self) -> &I {
        &self.interpreter
    }
}

impl<I, P, A> FvmExecutor<I, P, A>
where
    I: Interpreter,
    P: PrecompileSet,
    A: ContractAddressScheme,
{
    /// Executes `transaction` in `block` against `state`.
    ///
    /// A rejected transaction leaves `state` untouched. Otherwise the sender's nonce bump and
    /// energy pre-charge are always applied, and the root frame's changes are applied only if
    /// it succeeded.
    ///
    /// # Errors
    ///
    /// Fails only if the state backend or the interpreter fails. Every protocol-level failure is
    /// reported through [`ExecutionOutcome::result`].
    pub fn execute(
        &self,
        state: &mut dyn StateView,
        transaction: &Transaction,
        block: &BlockContext,
    ) -> Result<ExecutionOutcome, ExecutionError> {
        let spec = self.config.spec_id_at_block(block.number);
        let admission = check_transaction(&*state, transaction, &self.config.energy_limits, spec)?;
        if admission.is_rejected() {
            return Ok(ExecutionOutcome::rejected(admission));
        }
        increment_nonce_and_deduct_energy_cost(state, transaction)?;

        let contract_address = transaction
            .is_create()
            .then(|| self.addresses.contract_address(&transaction.sender, transaction.nonce));
        let mut context =
            ExecutionContext::for_transaction(transaction, block.clone(), contract_address);
        let dispatcher = CallDispatcher::new(
            &self.interpreter,
            &self.precompiles,
            &self.addresses,
            &self.config,
            spec,
        );

        let mut track = NestedState::track(state);
        let result = match contract_address {
            Some(address) => {
                self.create(&dispatcher, spec, &mut context, &mut track, transaction, address)?
            }
            None => self.call(&dispatcher, &mut context, &mut track, transaction)?,
        };

        let succeeded = result.is_success();
        if succeeded {
            track.flush()?;
        } else {
            context.side_effects.mark_all_rejected();
            track.rollback();
        }

        let mut side_effects = SideEffects::default();
        merge_frame(&mut side_effects, context.side_effects, succeeded);
        let energy_used = transaction.energy_limit.saturating_sub(result.energy_remaining());
        info!(
            target: "fvm::executor",
            hash = %transaction.hash,
            code = result.code().as_i32(),
            energy_used,
            "Transaction executed"
        );
        Ok(ExecutionOutcome { result, side_effects, contract_address, energy_used })
    }

    fn call(
        &self,
        dispatcher: &CallDispatcher<'_>,
        context: &mut ExecutionContext,
        state: &mut dyn StateView,
        transaction: &Transaction,
    ) -> Result<TransactionResult, ExecutionError> {
        transfer(state, transaction.sender, context.destination, transaction.value)?;
        let code = state.code(&context.destination)?;
        if code.is_empty() {
            trace!(target: "fvm::executor", to = %context.destination, "Plain value transfer");
            return Ok(TransactionResult::success(transaction.energy_limit));
        }
        dispatcher.run_code(&code, context, state)
    }

    fn create(
        &self,
        dispatcher: &CallDispatcher<'_>,
        spec: FvmSpecId,
        context: &mut ExecutionContext,
        state: &mut dyn StateView,
        transaction: &Transaction,
        address: Address,
    ) -> Result<TransactionResult, ExecutionError> {
        if is_address_collision(&*state, &address, spec)? {
            debug!(target: "fvm::executor", %address, "Contract address collision");
            return Ok(TransactionResult::failure());
        }

        // An adopted account keeps whatever balance it already held.
        let old_balance = state.balance(&address)?;
        state.create_account(address)?;
        state.increment_nonce(address)?;
        state.add_balance(address, old_balance)?;
        transfer(state, transaction.sender, address, transaction.value)?;

        if transaction.data.is_empty() {
            return Ok(TransactionResult::success(transaction.energy_limit));
        }
        // Top-level deployments pay no code deposit; only nested creations do.
        let result = dispatcher.run_code(&transaction.data, context, state)?;
        Ok(match result {
            TransactionResult::Success { energy_remaining, output } => {
                state.put_code(address, output)?;
                TransactionResult::Success {
                    energy_remaining,
                    output: Bytes::copy_from_slice(address.as_slice()),
                }
            }
            other => other,
        })
    }
}

/// Returns `true` if a top-level creation may not deploy to `address`.
///
/// Before the 040 upgrade any recorded state blocks the address. From the upgrade on, only a
/// non-zero nonce, code or storage does; an account holding nothing but balance is adopted.
pub fn is_address_collision<S: StateReader + ?Sized>(
    state: &S,
    address: &Address,
    spec: FvmSpecId,
) -> Result<bool, ExecutionError> {
    if !spec.is_fork_040_enabled() {
        return Ok(state.has_account(address)?);
    }
    Ok(state.nonce(address)? != 0
        || !state.code(address)?.is_empty()
        || state.has_storage(address)?)
}
