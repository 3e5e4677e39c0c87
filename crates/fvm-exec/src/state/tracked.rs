use alloy_primitives::{Address, Bytes, B256, U256};
use tracing::trace;

use super::{StateJournal, StateReader, StateView, StorageKey, StorageValue};
use crate::StateError;

/// A [`StateJournal`] layered over a base view.
///
/// Reads consult the journal first and fall through to the base. Writes only touch the journal
/// until the view is [`flush`](Self::flush)ed.
///
/// A nested frame's view is opened over `&mut dyn StateView`, so arbitrarily deep call chains
/// share one concrete type.
#[derive(Debug)]
pub struct TrackedState<B> {
    base: B,
    journal: StateJournal,
}

/// The view a nested frame runs against.
pub type NestedState<'a> = TrackedState<&'a mut dyn StateView>;

impl<B: StateReader> TrackedState<B> {
    /// Opens an empty journal over `base`.
    pub fn new(base: B) -> Self {
        Self { base, journal: StateJournal::default() }
    }

    /// Returns the pending changes.
    pub const fn journal(&self) -> &StateJournal {
        &self.journal
    }

    /// Returns the base view.
    pub const fn base(&self) -> &B {
        &self.base
    }

    /// Consumes the view and returns its pending changes.
    pub fn into_journal(self) -> StateJournal {
        self.journal
    }

    /// Discards the pending changes.
    pub fn rollback(self) {
        let accounts = self.journal.iter().count();
        trace!(target: "fvm::state", accounts, "Rolling back tracked state");
    }
}

impl<B: StateView> TrackedState<B> {
    /// Commits the pending changes into the base view.
    pub fn flush(mut self) -> Result<(), StateError> {
        let accounts = self.journal.iter().count();
        trace!(target: "fvm::state", accounts, "Flushing tracked state");
        self.base.commit(self.journal)
    }
}

impl<'a> NestedState<'a> {
    /// Opens a nested view over `parent`.
    pub fn track(parent: &'a mut dyn StateView) -> Self {
        Self::new(parent)
    }
}

impl<B: StateReader> StateReader for TrackedState<B> {
    fn has_account(&self, address: &Address) -> Result<bool, StateError> {
        if self.journal.get(address).is_some() {
            return Ok(true);
        }
        self.base.has_account(address)
    }

    fn balance(&self, address: &Address) -> Result<U256, StateError> {
        match self.journal.get(address) {
            Some(change) if change.balance.is_some() || change.created => {
                Ok(change.balance.unwrap_or_default())
            }
            _ => self.base.balance(address),
        }
    }

    fn nonce(&self, address: &Address) -> Result<u64, StateError> {
        match self.journal.get(address) {
            Some(change) if change.nonce.is_some() || change.created => {
                Ok(change.nonce.unwrap_or_default())
            }
            _ => self.base.nonce(address),
        }
    }

    fn code(&self, address: &Address) -> Result<Bytes, StateError> {
        match self.journal.get(address) {
            Some(change) if change.code.is_some() || change.created => {
                Ok(change.code.clone().unwrap_or_default())
            }
            _ => self.base.code(address),
        }
    }

    fn storage(&self, address: &Address, key: StorageKey) -> Result<StorageValue, StateError> {
        if let Some(change) = self.journal.get(address) {
            if let Some(value) = change.storage.get(&key) {
                return Ok(*value);
            }
            if change.created {
                return Ok(StorageValue::ZERO);
            }
        }
        self.base.storage(address, key)
    }

    fn has_storage(&self, address: &Address) -> Result<bool, StateError> {
        if let Some(change) = self.journal.get(address) {
            if change.storage.values().any(|value| !value.is_zero()) {
                return Ok(true);
            }
            if change.created {
                return Ok(false);
            }
        }
        self.base.has_storage(address)
    }

    fn block_hash(&self, number: u64) -> Result<B256, StateError> {
        self.base.block_hash(number)
    }
}

impl<B: StateReader> StateView for TrackedState<B> {
    fn create_account(&mut self, address: Address) -> Result<(), StateError> {
        self.journal.create(address);
        Ok(())
    }

    fn add_balance(&mut self, address: Address, amount: U256) -> Result<(), StateError> {
        let balance = self
            .balance(&address)?
            .checked_add(amount)
            .ok_or(StateError::BalanceOverflow(address))?;
        self.journal.entry(address).balance = Some(balance);
        Ok(())
    }

    fn sub_balance(&mut self, address: Address, amount: U256) -> Result<(), StateError> {
        let balance = self.balance(&address)?;
        let remaining = balance
            .checked_sub(amount)
            .ok_or(StateError::BalanceUnderflow { address, balance, amount })?;
        self.journal.entry(address).balance = Some(remaining);
        Ok(())
    }

    fn increment_nonce(&mut self, address: Address) -> Result<(), StateError> {
        let nonce =
            self.nonce(&address)?.checked_add(1).ok_or(StateError::NonceOverflow(address))?;
        self.journal.entry(address).nonce = Some(nonce);
        Ok(())
    }

    fn put_code(&mut self, address: Address, code: Bytes) -> Result<(), StateError> {
        self.journal.entry(address).code = Some(code);
        Ok(())
    }

    fn put_storage(
        &mut self,
        address: Address,
        key: StorageKey,
        value: StorageValue,
    ) -> Result<(), StateError> {
        self.journal.entry(address).storage.insert(key, value);
        Ok(())
    }

    fn commit(&mut self, journal: StateJournal) -> Result<(), StateError> {
        self.journal.absorb(journal);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::{address, bytes};

    use super::*;
    use crate::test_utils::MemoryDatabase;

    const ALICE: Address = address!("0x0000000000000000000000000000000000a11ce0");
    const BOB: Address = address!("0x0000000000000000000000000000000000000b0b");

    #[test]
    fn test_reads_do_not_materialize_accounts() {
        let mut root = MemoryDatabase::default().into_state();
        let nested = NestedState::track(&mut root);
        assert_eq!(nested.balance(&BOB).unwrap(), U256::ZERO);
        assert_eq!(nested.code(&BOB).unwrap(), Bytes::new());
        assert!(!nested.has_account(&BOB).unwrap());
        assert!(nested.journal().is_empty());
    }

    #[test]
    fn test_flush_commits_into_parent() {
        let mut root =
            MemoryDatabase::default().account_balance(ALICE, U256::from(10)).into_state();
        let mut nested = NestedState::track(&mut root);
        nested.sub_balance(ALICE, U256::from(4)).unwrap();
        nested.add_balance(BOB, U256::from(4)).unwrap();
        nested.put_storage(BOB, U256::from(1), U256::from(9)).unwrap();
        nested.flush().unwrap();

        assert_eq!(root.balance(&ALICE).unwrap(), U256::from(6));
        assert_eq!(root.balance(&BOB).unwrap(), U256::from(4));
        assert_eq!(root.storage(&BOB, U256::from(1)).unwrap(), U256::from(9));
        assert!(root.has_storage(&BOB).unwrap());
    }

    #[test]
    fn test_rollback_leaves_parent_untouched() {
        let mut root =
            MemoryDatabase::default().account_balance(ALICE, U256::from(10)).into_state();
        let mut nested = NestedState::track(&mut root);
        nested.sub_balance(ALICE, U256::from(4)).unwrap();
        nested.increment_nonce(ALICE).unwrap();
        nested.rollback();

        assert_eq!(root.balance(&ALICE).unwrap(), U256::from(10));
        assert_eq!(root.nonce(&ALICE).unwrap(), 0);
        assert!(root.journal().is_empty());
    }

    #[test]
    fn test_nested_views_stack() {
        let mut root =
            MemoryDatabase::default().account_balance(ALICE, U256::from(10)).into_state();
        {
            let mut outer = NestedState::track(&mut root);
            outer.put_code(ALICE, bytes!("60")).unwrap();
            {
                let mut inner = NestedState::track(&mut outer);
                inner.add_balance(ALICE, U256::from(5)).unwrap();
                assert_eq!(inner.code(&ALICE).unwrap(), bytes!("60"));
                inner.flush().unwrap();
            }
            {
                let mut discarded = NestedState::track(&mut outer);
                discarded.add_balance(ALICE, U256::from(100)).unwrap();
                discarded.rollback();
            }
            outer.flush().unwrap();
        }
        assert_eq!(root.balance(&ALICE).unwrap(), U256::from(15));
        assert_eq!(root.code(&ALICE).unwrap(), bytes!("60"));
    }

    #[test]
    fn test_create_account_masks_previous_state() {
        let mut root = MemoryDatabase::default()
            .account_balance(ALICE, U256::from(10))
            .account_nonce(ALICE, 4)
            .account_code(ALICE, bytes!("6000"))
            .into_state();
        root.create_account(ALICE).unwrap();
        assert!(root.has_account(&ALICE).unwrap());
        assert_eq!(root.balance(&ALICE).unwrap(), U256::ZERO);
        assert_eq!(root.nonce(&ALICE).unwrap(), 0);
        assert!(root.code(&ALICE).unwrap().is_empty());
    }

    #[test]
    fn test_underflow_is_reported() {
        let mut root =
            MemoryDatabase::default().account_balance(ALICE, U256::from(1)).into_state();
        assert_eq!(
            root.sub_balance(ALICE, U256::from(2)),
            Err(StateError::BalanceUnderflow {
                address: ALICE,
                balance: U256::from(1),
                amount: U256::from(2)
            })
        );
    }
}
