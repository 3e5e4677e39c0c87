//! Account state views.
//!
//! Every frame runs against a [`TrackedState`] opened over its parent's view. A successful frame
//! [`flush`](TrackedState::flush)es its changes into the parent; a failed one
//! [`rollback`](TrackedState::rollback)s, leaving the parent untouched.

use alloy_primitives::{Address, Bytes, B256, U256};
use auto_impl::auto_impl;
pub use revm::primitives::{StorageKey, StorageValue};

use crate::StateError;

mod database;
pub use database::*;

mod journal;
pub use journal::*;

mod tracked;
pub use tracked::*;

/// Read access to account state.
///
/// Reading an account that does not exist yields its default (zero balance, nonce zero, empty
/// code, zero storage) without creating it.
#[auto_impl(&, &mut, Box)]
pub trait StateReader {
    /// Returns `true` if any state is recorded for `address`.
    fn has_account(&self, address: &Address) -> Result<bool, StateError>;

    /// Returns the balance of `address`.
    fn balance(&self, address: &Address) -> Result<U256, StateError>;

    /// Returns the nonce of `address`.
    fn nonce(&self, address: &Address) -> Result<u64, StateError>;

    /// Returns the code of `address`.
    fn code(&self, address: &Address) -> Result<Bytes, StateError>;

    /// Returns the storage word at `key` of `address`.
    fn storage(&self, address: &Address, key: StorageKey) -> Result<StorageValue, StateError>;

    /// Returns `true` if `address` holds any non-zero storage word.
    fn has_storage(&self, address: &Address) -> Result<bool, StateError>;

    /// Returns the hash of block `number`, or the zero hash if it is unknown.
    fn block_hash(&self, number: u64) -> Result<B256, StateError>;
}

/// Read-write access to account state.
///
/// Every write materializes the account it touches.
#[auto_impl(&mut, Box)]
pub trait StateView: StateReader {
    /// Resets `address` to an empty account: zero balance, nonce zero, no code, no storage.
    fn create_account(&mut self, address: Address) -> Result<(), StateError>;

    /// Credits `amount` to `address`.
    fn add_balance(&mut self, address: Address, amount: U256) -> Result<(), StateError>;

    /// Debits `amount` from `address`.
    fn sub_balance(&mut self, address: Address, amount: U256) -> Result<(), StateError>;

    /// Increments the nonce of `address` by one.
    fn increment_nonce(&mut self, address: Address) -> Result<(), StateError>;

    /// Replaces the code of `address`.
    fn put_code(&mut self, address: Address, code: Bytes) -> Result<(), StateError>;

    /// Writes a storage word of `address`.
    fn put_storage(
        &mut self,
        address: Address,
        key: StorageKey,
        value: StorageValue,
    ) -> Result<(), StateError>;

    /// Applies the changes of a flushed child view.
    fn commit(&mut self, journal: StateJournal) -> Result<(), StateError>;
}

/// Moves `amount` from `from` to `to`.
pub fn transfer(
    state: &mut dyn StateView,
    from: Address,
    to: Address,
    amount: U256,
) -> Result<(), StateError> {
    state.sub_balance(from, amount)?;
    state.add_balance(to, amount)
}
