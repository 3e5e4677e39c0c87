use alloy_primitives::{map::HashMap, Address, Bytes, U256};

use super::{StorageKey, StorageValue};

/// The pending changes of one account in a [`StateJournal`].
///
/// Fields left `None` fall through to the layer below unless [`created`](Self::created) is
/// set, in which case the layer below is masked entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountChange {
    /// The account was reset to empty at this layer.
    pub created: bool,
    /// The new balance.
    pub balance: Option<U256>,
    /// The new nonce.
    pub nonce: Option<u64>,
    /// The new code.
    pub code: Option<Bytes>,
    /// Written storage words.
    pub storage: HashMap<StorageKey, StorageValue>,
}

impl AccountChange {
    /// A change that resets the account to empty.
    pub fn created() -> Self {
        Self { created: true, ..Default::default() }
    }

    /// Layers `newer` on top of `self`.
    fn absorb(&mut self, newer: Self) {
        if newer.created {
            *self = newer;
            return;
        }
        if newer.balance.is_some() {
            self.balance = newer.balance;
        }
        if newer.nonce.is_some() {
            self.nonce = newer.nonce;
        }
        if newer.code.is_some() {
            self.code = newer.code;
        }
        self.storage.extend(newer.storage);
    }
}

/// Account changes accumulated by a state view and not yet committed below it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateJournal {
    accounts: HashMap<Address, AccountChange>,
}

impl StateJournal {
    /// Returns `true` if no account was touched.
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Returns the pending change of `address`.
    pub fn get(&self, address: &Address) -> Option<&AccountChange> {
        self.accounts.get(address)
    }

    /// Returns the pending change of `address`, materializing an empty one.
    pub fn entry(&mut self, address: Address) -> &mut AccountChange {
        self.accounts.entry(address).or_default()
    }

    /// Resets `address` to an empty account.
    pub fn create(&mut self, address: Address) {
        self.accounts.insert(address, AccountChange::created());
    }

    /// Layers a child journal on top of this one.
    pub fn absorb(&mut self, child: Self) {
        for (address, change) in child.accounts {
            match self.accounts.get_mut(&address) {
                Some(existing) => existing.absorb(change),
                None => {
                    self.accounts.insert(address, change);
                }
            }
        }
    }

    /// Iterates over the touched accounts.
    pub fn iter(&self) -> impl Iterator<Item = (&Address, &AccountChange)> {
        self.accounts.iter()
    }
}

impl IntoIterator for StateJournal {
    type Item = (Address, AccountChange);
    type IntoIter = <HashMap<Address, AccountChange> as IntoIterator>::IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        self.accounts.into_iter()
    }
}
