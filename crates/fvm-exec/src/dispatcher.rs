//! Dispatch of nested frames requested by the interpreter.

use core::cell::RefCell;

use alloy_primitives::{Address, Bytes, U256};
use tracing::{debug, trace};

use crate::{
    merge_frame, state::transfer, CallKind, CallMessage, ContractAddressScheme, ExecutionContext,
    ExecutionError, FrameHost, FrameInfo, FrameStack, FvmSpecId, InternalTransaction,
    Interpreter, MessageError, NestedState, PrecompileSet, StateReader, StateView,
    TransactionResult, VmConfig,
};

/// Runs frames of one transaction.
///
/// The dispatcher owns the transaction's [`FrameStack`] and selects the interpreter entry point
/// once, from the [`FvmSpecId`] it was built with. It is created per transaction; frames of
/// different transactions never share one.
#[derive(derive_more::Debug)]
pub struct CallDispatcher<'d> {
    #[debug(ignore)]
    interpreter: &'d dyn Interpreter,
    #[debug(ignore)]
    precompiles: &'d dyn PrecompileSet,
    #[debug(ignore)]
    addresses: &'d dyn ContractAddressScheme,
    config: &'d VmConfig,
    spec: FvmSpecId,
    frames: RefCell<FrameStack>,
}

impl<'d> CallDispatcher<'d> {
    /// Creates a dispatcher with an empty frame stack.
    pub fn new(
        interpreter: &'d dyn Interpreter,
        precompiles: &'d dyn PrecompileSet,
        addresses: &'d dyn ContractAddressScheme,
        config: &'d VmConfig,
        spec: FvmSpecId,
    ) -> Self {
        Self {
            interpreter,
            precompiles,
            addresses,
            config,
            spec,
            frames: RefCell::new(FrameStack::default()),
        }
    }

    /// Returns the fork rules the dispatcher runs under.
    pub const fn spec(&self) -> FvmSpecId {
        self.spec
    }

    /// Returns the contract address `sender` creates with `nonce`.
    pub fn contract_address(&self, sender: &Address, nonce: u64) -> Address {
        self.addresses.contract_address(sender, nonce)
    }

    /// Builds an internal transaction issued by the frame `issuer`, reserving the next
    /// transaction-wide position for it.
    #[allow(clippy::too_many_arguments)]
    pub fn internal_transaction(
        &self,
        issuer: &ExecutionContext,
        nonce: u64,
        from: Address,
        to: Option<Address>,
        value: U256,
        data: Bytes,
        note: &str,
    ) -> InternalTransaction {
        InternalTransaction {
            parent_hash: issuer.transaction_hash,
            depth: issuer.depth,
            index: self.frames.borrow_mut().next_internal_index(),
            nonce,
            from,
            to,
            value,
            data,
            note: note.to_string(),
            rejected: false,
        }
    }

    /// Hands `code` to the interpreter entry point of the current era.
    ///
    /// The frame is on the [`FrameStack`] exactly while the interpreter runs it.
    pub fn run_code(
        &self,
        code: &Bytes,
        context: &mut ExecutionContext,
        state: &mut dyn StateView,
    ) -> Result<TransactionResult, ExecutionError> {
        self.frames.borrow_mut().push(FrameInfo::from(&*context));
        trace!(
            target: "fvm::dispatch",
            depth = context.depth,
            address = %context.destination,
            "Entering interpreter"
        );
        let mut host = FrameHost::new(self, context, state);
        let result = if self.spec.is_fork_040_enabled() {
            self.interpreter.run_v1(code, &mut host)
        } else {
            self.interpreter.run(code, &mut host)
        };
        let frame = self.frames.borrow_mut().pop();
        trace!(target: "fvm::dispatch", ?frame, ?result, "Left interpreter");
        result
    }

    /// Runs the nested frame requested by `message` on behalf of the frame `parent`.
    ///
    /// The nested frame's ledger is folded into `parent`'s when it finishes: entirely on
    /// success, internal transactions only otherwise.
    pub fn dispatch(
        &self,
        parent: &mut ExecutionContext,
        state: &mut dyn StateView,
        message: CallMessage,
    ) -> Result<TransactionResult, ExecutionError> {
        let expected = parent.depth.saturating_add(1);
        if message.depth != expected {
            return Err(MessageError::UnexpectedDepth { expected, found: message.depth }.into());
        }
        let mut context = ExecutionContext::from_message(&message, parent);

        if context.depth >= self.config.max_call_depth {
            debug!(target: "fvm::dispatch", depth = context.depth, "Call depth limit reached");
            return Ok(TransactionResult::failure());
        }
        if state.balance(&context.sender)? < context.value {
            debug!(
                target: "fvm::dispatch",
                sender = %context.sender,
                value = %context.value,
                "Insufficient balance for nested frame"
            );
            return Ok(TransactionResult::failure());
        }

        let result = match context.kind {
            CallKind::Create => self.create(parent, state, &mut context)?,
            CallKind::Call | CallKind::CallCode | CallKind::DelegateCall => {
                self.call(parent, state, &mut context)?
            }
        };
        merge_frame(&mut parent.side_effects, context.side_effects, result.is_success());
        Ok(result)
    }

    fn call(
        &self,
        parent: &mut ExecutionContext,
        state: &mut dyn StateView,
        context: &mut ExecutionContext,
    ) -> Result<TransactionResult, ExecutionError> {
        let code_address = context.destination;
        if context.kind.runs_in_caller_context() {
            context.destination = parent.destination;
        }

        let mut track = NestedState::track(state);

        let nonce = track.nonce(&context.sender)?;
        let record = self.internal_transaction(
            parent,
            nonce,
            context.sender,
            Some(context.destination),
            context.value,
            context.data.clone(),
            InternalTransaction::CALL,
        );
        context.transaction_hash = record.hash();
        let position = parent.side_effects.add_internal_transaction(record);

        if !context.kind.runs_in_caller_context() {
            transfer(&mut track, context.sender, context.destination, context.value)?;
        }

        let result = if let Some(precompile) = self.precompiles.resolve(&context.destination) {
            precompile.execute(&context.data, context.energy, context, &mut track)?
        } else {
            let code = track.code(&code_address)?;
            if code.is_empty() {
                TransactionResult::success(context.energy)
            } else {
                self.run_code(&code, context, &mut track)?
            }
        };

        if result.is_success() {
            track.flush()?;
        } else {
            parent.side_effects.mark_rejected(position);
            context.side_effects.mark_all_rejected();
            track.rollback();
        }
        Ok(result)
    }

    fn create(
        &self,
        parent: &mut ExecutionContext,
        state: &mut dyn StateView,
        context: &mut ExecutionContext,
    ) -> Result<TransactionResult, ExecutionError> {
        let mut track = NestedState::track(state);

        let sender = context.sender;
        let nonce = track.nonce(&sender)?;
        let new_address = self.contract_address(&sender, nonce);
        let record = self.internal_transaction(
            parent,
            nonce,
            sender,
            Some(new_address),
            context.value,
            context.data.clone(),
            InternalTransaction::CREATE,
        );
        context.transaction_hash = record.hash();
        context.destination = new_address;
        let position = parent.side_effects.add_internal_transaction(record);

        // Collision is judged on the state before the account is materialized below.
        let already_exists = track.has_account(&new_address)?;
        let old_balance = track.balance(&new_address)?;
        track.create_account(new_address)?;
        track.increment_nonce(new_address)?;
        track.add_balance(new_address, old_balance)?;

        transfer(&mut track, sender, new_address, context.value)?;
        track.increment_nonce(sender)?;

        let record = self.internal_transaction(
            parent,
            track.nonce(&sender)?,
            sender,
            None,
            context.value,
            context.data.clone(),
            InternalTransaction::CREATE,
        );
        context.side_effects.add_internal_transaction(record);

        let result = if already_exists {
            debug!(target: "fvm::dispatch", address = %new_address, "Contract address collision");
            TransactionResult::failure()
        } else if context.data.is_empty() {
            TransactionResult::Success {
                energy_remaining: context.energy,
                output: Bytes::copy_from_slice(new_address.as_slice()),
            }
        } else {
            let init_code = context.data.clone();
            match self.run_code(&init_code, context, &mut track)? {
                TransactionResult::Success { energy_remaining, .. }
                    if energy_remaining < self.config.code_deposit_energy =>
                {
                    debug!(
                        target: "fvm::dispatch",
                        energy_remaining,
                        "Code deposit not affordable"
                    );
                    TransactionResult::failure()
                }
                TransactionResult::Success { energy_remaining, output } => {
                    track.put_code(new_address, output)?;
                    TransactionResult::Success {
                        energy_remaining,
                        output: Bytes::copy_from_slice(new_address.as_slice()),
                    }
                }
                other => other,
            }
        };

        if result.is_success() {
            track.flush()?;
        } else {
            parent.side_effects.mark_rejected(position);
            context.side_effects.mark_all_rejected();
            track.rollback();
        }
        Ok(result)
    }
}
