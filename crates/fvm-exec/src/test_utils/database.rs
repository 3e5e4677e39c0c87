use core::convert::Infallible;

use alloy_primitives::{Address, Bytes, B256, U256};
use delegate::delegate;
use revm::{
    database::{AccountState, CacheDB, DbAccount, EmptyDB},
    primitives::{StorageKey, StorageValue},
    state::{AccountInfo, Bytecode},
    DatabaseRef,
};

use crate::{RevmDatabase, RootState, StorageIndexRef};

/// An in-memory account store to seed executor tests with.
///
/// Every setter materializes the account it touches, so an address given only a balance still
/// reports [`has_account`](crate::StateReader::has_account).
#[derive(Debug, Default, Clone, derive_more::Deref, derive_more::DerefMut)]
pub struct MemoryDatabase {
    #[deref]
    #[deref_mut]
    db: CacheDB<EmptyDB>,
}

impl MemoryDatabase {
    /// Opens a [`RootState`] over the seeded accounts.
    pub fn into_state(self) -> RootState<Self> {
        RevmDatabase(self).into_state()
    }

    fn modify_account(&mut self, address: Address, f: impl FnOnce(&mut DbAccount)) {
        let Ok(account) = self.db.load_account(address);
        f(account);
        account.account_state = AccountState::None;
    }

    /// Sets the code of `address`.
    pub fn set_account_code(&mut self, address: Address, code: Bytes) {
        let bytecode = Bytecode::new_legacy(code);
        self.modify_account(address, |account| {
            account.info.code_hash = bytecode.hash_slow();
            account.info.code = Some(bytecode);
        });
    }

    /// Sets the balance of `address`.
    pub fn set_account_balance(&mut self, address: Address, balance: U256) {
        self.modify_account(address, |account| account.info.balance = balance);
    }

    /// Sets the nonce of `address`.
    pub fn set_account_nonce(&mut self, address: Address, nonce: u64) {
        self.modify_account(address, |account| account.info.nonce = nonce);
    }

    /// Sets a storage word of `address`.
    pub fn set_account_storage(&mut self, address: Address, key: StorageKey, value: StorageValue) {
        self.modify_account(address, |account| {
            account.storage.insert(key, value);
        });
    }

    /// Builder form of [`Self::set_account_code`].
    pub fn account_code(mut self, address: Address, code: Bytes) -> Self {
        self.set_account_code(address, code);
        self
    }

    /// Builder form of [`Self::set_account_balance`].
    pub fn account_balance(mut self, address: Address, balance: U256) -> Self {
        self.set_account_balance(address, balance);
        self
    }

    /// Builder form of [`Self::set_account_nonce`].
    pub fn account_nonce(mut self, address: Address, nonce: u64) -> Self {
        self.set_account_nonce(address, nonce);
        self
    }

    /// Builder form of [`Self::set_account_storage`].
    pub fn account_storage(
        mut self,
        address: Address,
        key: StorageKey,
        value: StorageValue,
    ) -> Self {
        self.set_account_storage(address, key, value);
        self
    }
}

impl DatabaseRef for MemoryDatabase {
    type Error = Infallible;

    delegate! {
        to self.db {
            fn basic_ref(&self, address: Address) -> Result<Option<AccountInfo>, Self::Error>;
            fn code_by_hash_ref(&self, code_hash: B256) -> Result<Bytecode, Self::Error>;
            fn storage_ref(&self, address: Address, index: StorageKey) -> Result<StorageValue, Self::Error>;
            fn block_hash_ref(&self, number: u64) -> Result<B256, Self::Error>;
        }
    }
}

impl StorageIndexRef for MemoryDatabase {
    fn has_storage_ref(&self, address: Address) -> Result<bool, Self::Error> {
        self.db.has_storage_ref(address)
    }
}
