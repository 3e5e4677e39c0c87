use alloy_primitives::{Address, Bytes, B256, U256};
use revm::{
    database::{AccountState, CacheDB, EmptyDB},
    primitives::KECCAK_EMPTY,
    state::AccountInfo,
    DatabaseRef,
};

use super::{StateReader, StorageKey, StorageValue, TrackedState};
use crate::StateError;

/// A [`DatabaseRef`] that can tell whether an account holds any storage.
///
/// [`DatabaseRef`] only reads single words, which is not enough to decide whether a deployment
/// collides with an account that has storage but neither nonce nor code.
pub trait StorageIndexRef: DatabaseRef {
    /// Returns `true` if `address` holds any non-zero storage word.
    fn has_storage_ref(&self, address: Address) -> Result<bool, Self::Error>;
}

impl StorageIndexRef for EmptyDB {
    fn has_storage_ref(&self, _address: Address) -> Result<bool, Self::Error> {
        Ok(false)
    }
}

impl<ExtDB: StorageIndexRef> StorageIndexRef for CacheDB<ExtDB> {
    fn has_storage_ref(&self, address: Address) -> Result<bool, Self::Error> {
        let Some(account) = self.cache.accounts.get(&address) else {
            return self.db.has_storage_ref(address);
        };
        if account.storage.values().any(|value| !value.is_zero()) {
            return Ok(true);
        }
        match account.account_state {
            AccountState::NotExisting | AccountState::StorageCleared => Ok(false),
            _ => self.db.has_storage_ref(address),
        }
    }
}

/// Exposes a `revm` database as the read-only bottom layer of the state.
#[derive(Debug, Clone, Default, derive_more::Deref)]
pub struct RevmDatabase<DB>(pub DB);

/// The root view of a transaction: every change lands in its journal.
pub type RootState<DB> = TrackedState<RevmDatabase<DB>>;

impl<DB: StorageIndexRef> RevmDatabase<DB>
where
    DB::Error: core::fmt::Display,
{
    /// Wraps `db` into a fresh [`RootState`].
    pub fn into_state(self) -> RootState<DB> {
        TrackedState::new(self)
    }

    fn account(&self, address: &Address) -> Result<Option<AccountInfo>, StateError> {
        self.0.basic_ref(*address).map_err(backend)
    }
}

fn backend(err: impl core::fmt::Display) -> StateError {
    StateError::Backend(err.to_string())
}

impl<DB: StorageIndexRef> StateReader for RevmDatabase<DB>
where
    DB::Error: core::fmt::Display,
{
    fn has_account(&self, address: &Address) -> Result<bool, StateError> {
        Ok(self.account(address)?.is_some())
    }

    fn balance(&self, address: &Address) -> Result<U256, StateError> {
        Ok(self.account(address)?.map(|info| info.balance).unwrap_or_default())
    }

    fn nonce(&self, address: &Address) -> Result<u64, StateError> {
        Ok(self.account(address)?.map(|info| info.nonce).unwrap_or_default())
    }

    fn code(&self, address: &Address) -> Result<Bytes, StateError> {
        let Some(info) = self.account(address)? else { return Ok(Bytes::new()) };
        if let Some(code) = info.code {
            return Ok(code.original_bytes());
        }
        if info.code_hash == KECCAK_EMPTY {
            return Ok(Bytes::new());
        }
        Ok(self.0.code_by_hash_ref(info.code_hash).map_err(backend)?.original_bytes())
    }

    fn storage(&self, address: &Address, key: StorageKey) -> Result<StorageValue, StateError> {
        self.0.storage_ref(*address, key).map_err(backend)
    }

    fn has_storage(&self, address: &Address) -> Result<bool, StateError> {
        self.0.has_storage_ref(*address).map_err(backend)
    }

    fn block_hash(&self, number: u64) -> Result<B256, StateError> {
        self.0.block_hash_ref(number).map_err(backend)
    }
}
