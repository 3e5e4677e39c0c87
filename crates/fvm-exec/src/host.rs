//! The callback surface the interpreter uses to reach the executor.

use alloy_primitives::{Address, Bytes, Log, B256, U256};
use tracing::trace;

use crate::{
    state::transfer, topics_from_bytes, CallDispatcher, CallMessage, ExecutionContext,
    ExecutionError, InternalTransaction, StateError, StateView, StorageKey, StorageValue,
    TransactionResult,
};

/// Services requests from the interpreter on behalf of the frame it is running.
///
/// Every method acts on the frame the host was handed out for: its context, its ledger and its
/// view of account state.
pub trait Host {
    /// Returns the running frame's context.
    fn context(&self) -> &ExecutionContext;

    /// Returns `true` if any state is recorded for `address`.
    fn exists(&self, address: &Address) -> Result<bool, StateError>;

    /// Returns the balance of `address`.
    fn balance(&self, address: &Address) -> Result<U256, StateError>;

    /// Returns the code of `address`.
    fn code(&self, address: &Address) -> Result<Bytes, StateError>;

    /// Returns a storage word of `address`.
    fn storage(&self, address: &Address, key: StorageKey) -> Result<StorageValue, StateError>;

    /// Writes a storage word of `address`.
    fn put_storage(
        &mut self,
        address: Address,
        key: StorageKey,
        value: StorageValue,
    ) -> Result<(), StateError>;

    /// Returns the hash of block `number`, or the zero hash if it is unknown.
    fn block_hash(&self, number: u64) -> Result<B256, StateError>;

    /// Appends a log entry to the running frame's ledger.
    fn log(&mut self, address: Address, topics: Vec<B256>, data: Bytes);

    /// Appends a log entry whose topics arrive as concatenated 32-byte words.
    fn log_encoded(&mut self, address: Address, topics: &[u8], data: Bytes) {
        self.log(address, topics_from_bytes(topics), data);
    }

    /// Destroys `owner`, moving its whole balance to `beneficiary`.
    fn self_destruct(&mut self, owner: Address, beneficiary: Address) -> Result<(), StateError>;

    /// Runs a nested frame and returns its result.
    fn call(&mut self, message: CallMessage) -> Result<TransactionResult, ExecutionError>;

    /// Runs a nested frame requested in the wire layout and returns the encoded result.
    fn call_encoded(&mut self, message: &[u8]) -> Result<Bytes, ExecutionError> {
        let message = CallMessage::decode(message)?;
        Ok(self.call(message)?.encode())
    }
}

/// The [`Host`] bound to one running frame.
#[derive(derive_more::Debug)]
pub struct FrameHost<'a, 'd> {
    #[debug(ignore)]
    dispatcher: &'a CallDispatcher<'d>,
    context: &'a mut ExecutionContext,
    #[debug(ignore)]
    state: &'a mut dyn StateView,
}

impl<'a, 'd> FrameHost<'a, 'd> {
    /// Binds a host to the frame described by `context`, running against `state`.
    pub fn new(
        dispatcher: &'a CallDispatcher<'d>,
        context: &'a mut ExecutionContext,
        state: &'a mut dyn StateView,
    ) -> Self {
        Self { dispatcher, context, state }
    }
}

impl Host for FrameHost<'_, '_> {
    fn context(&self) -> &ExecutionContext {
        self.context
    }

    fn exists(&self, address: &Address) -> Result<bool, StateError> {
        self.state.has_account(address)
    }

    fn balance(&self, address: &Address) -> Result<U256, StateError> {
        self.state.balance(address)
    }

    fn code(&self, address: &Address) -> Result<Bytes, StateError> {
        self.state.code(address)
    }

    fn storage(&self, address: &Address, key: StorageKey) -> Result<StorageValue, StateError> {
        self.state.storage(address, key)
    }

    fn put_storage(
        &mut self,
        address: Address,
        key: StorageKey,
        value: StorageValue,
    ) -> Result<(), StateError> {
        self.state.put_storage(address, key, value)
    }

    fn block_hash(&self, number: u64) -> Result<B256, StateError> {
        self.state.block_hash(number)
    }

    fn log(&mut self, address: Address, topics: Vec<B256>, data: Bytes) {
        self.context.side_effects.add_log(Log::new_unchecked(address, topics, data));
    }

    fn self_destruct(&mut self, owner: Address, beneficiary: Address) -> Result<(), StateError> {
        let balance = self.state.balance(&owner)?;
        let nonce = self.state.nonce(&owner)?;
        let record = self.dispatcher.internal_transaction(
            self.context,
            nonce,
            owner,
            Some(beneficiary),
            balance,
            Bytes::new(),
            InternalTransaction::SELF_DESTRUCT,
        );
        self.context.side_effects.add_internal_transaction(record);

        // The balance stays put when a contract names itself as beneficiary.
        if owner != beneficiary {
            transfer(&mut *self.state, owner, beneficiary, balance)?;
        }
        self.context.side_effects.add_deleted_address(owner);
        trace!(target: "fvm::host", %owner, %beneficiary, %balance, "Self-destructed");
        Ok(())
    }

    fn call(&mut self, message: CallMessage) -> Result<TransactionResult, ExecutionError> {
        self.dispatcher.dispatch(self.context, &mut *self.state, message)
    }
}
