use alloy_primitives::{address, Address, Bytes, TxKind, B256, U256};

use crate::{BlockContext, CallFlags, CallKind, CallMessage, Host, Transaction};

/// The sender used by [`TxBuilder`] unless overridden.
pub const SENDER: Address = address!("0x00000000000000000000000000000000000a11ce");

/// Builds [`Transaction`]s with admissible defaults: a call from [`SENDER`] with nonce zero, no
/// value, an energy limit of 100 000 and an energy price of one.
#[derive(Debug, Clone)]
pub struct TxBuilder {
    transaction: Transaction,
}

impl Default for TxBuilder {
    fn default() -> Self {
        Self {
            transaction: Transaction {
                hash: B256::repeat_byte(0x11),
                sender: SENDER,
                kind: TxKind::Call(Address::ZERO),
                nonce: 0,
                value: U256::ZERO,
                data: Bytes::new(),
                energy_limit: 100_000,
                energy_price: 1,
            },
        }
    }
}

impl TxBuilder {
    /// Starts a call to `to`.
    pub fn call(to: Address) -> Self {
        Self::default().kind(TxKind::Call(to))
    }

    /// Starts a contract creation with a creation-sized energy limit.
    pub fn create() -> Self {
        Self::default().kind(TxKind::Create).energy_limit(1_000_000)
    }

    /// Sets the transaction kind.
    pub fn kind(mut self, kind: TxKind) -> Self {
        self.transaction.kind = kind;
        self
    }

    /// Sets the sender.
    pub fn sender(mut self, sender: Address) -> Self {
        self.transaction.sender = sender;
        self
    }

    /// Sets the nonce.
    pub fn nonce(mut self, nonce: u64) -> Self {
        self.transaction.nonce = nonce;
        self
    }

    /// Sets the value.
    pub fn value(mut self, value: U256) -> Self {
        self.transaction.value = value;
        self
    }

    /// Sets the call data or init code.
    pub fn data(mut self, data: Bytes) -> Self {
        self.transaction.data = data;
        self
    }

    /// Sets the energy limit.
    pub fn energy_limit(mut self, energy_limit: u64) -> Self {
        self.transaction.energy_limit = energy_limit;
        self
    }

    /// Sets the energy price.
    pub fn energy_price(mut self, energy_price: u64) -> Self {
        self.transaction.energy_price = energy_price;
        self
    }

    /// Finishes the transaction.
    pub fn build(self) -> Transaction {
        self.transaction
    }
}

/// A block at `number` with a fixed miner and timestamp.
pub fn block(number: u64) -> BlockContext {
    BlockContext {
        miner: address!("0x00000000000000000000000000000000000d1ce5"),
        number,
        timestamp: 1_700_000_000,
        energy_limit: 15_000_000,
        difficulty: U256::from(1),
    }
}

/// A [`CallMessage`] from the frame `host` is running, one level deeper, forwarding all of its
/// energy.
pub fn nested_message(host: &dyn Host, kind: CallKind, destination: Address) -> CallMessage {
    let context = host.context();
    CallMessage {
        destination,
        caller: context.destination,
        energy_limit: context.energy,
        value: U256::ZERO,
        data: Bytes::new(),
        depth: context.depth + 1,
        kind,
        flags: CallFlags::empty(),
    }
}
