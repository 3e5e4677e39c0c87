use alloy_primitives::{Address, Bytes, B256, U256};

use crate::{BlockContext, CallFlags, CallKind, CallMessage, SideEffects, Transaction};

/// Everything a single frame knows about itself, plus the ledger it accumulates.
///
/// Fields inherited from the originating transaction (origin, energy price, block data and the
/// originating hash) are identical in every frame of that transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionContext {
    /// The hash identifying this frame; for nested frames, the hash of the internal transaction
    /// that opened it.
    pub transaction_hash: B256,
    /// The hash of the top-level transaction.
    pub origin_transaction_hash: B256,
    /// The account whose context the code runs in.
    pub destination: Address,
    /// The address of the contract a top-level creation deploys.
    pub contract_address: Option<Address>,
    /// The top-level signer.
    pub origin: Address,
    /// The immediate caller.
    pub sender: Address,
    /// The energy price of the top-level transaction.
    pub energy_price: u64,
    /// The energy available to this frame.
    pub energy: u64,
    /// The value transferred into this frame.
    pub value: U256,
    /// Call data or init code.
    pub data: Bytes,
    /// The nesting depth; zero for the top-level frame.
    pub depth: u32,
    /// The kind of this frame.
    pub kind: CallKind,
    /// Interpreter flags.
    pub flags: CallFlags,
    /// The block the transaction executes in.
    pub block: BlockContext,
    /// Side effects accumulated by this frame and its successful descendants.
    pub side_effects: SideEffects,
}

impl ExecutionContext {
    /// Builds the top-level frame of `transaction`.
    ///
    /// # Arguments
    ///
    /// * `transaction` - The admitted transaction.
    /// * `block` - The block it executes in.
    /// * `contract_address` - The derived contract address when `transaction` is a creation.
    ///
    /// # Returns
    ///
    /// A depth-zero frame whose energy is the transaction's limit minus its intrinsic cost.
    pub fn for_transaction(
        transaction: &Transaction,
        block: BlockContext,
        contract_address: Option<Address>,
    ) -> Self {
        let (destination, kind) = match transaction.kind.to() {
            Some(to) => (*to, CallKind::Call),
            None => (contract_address.unwrap_or_default(), CallKind::Create),
        };
        Self {
            transaction_hash: transaction.hash,
            origin_transaction_hash: transaction.hash,
            destination,
            contract_address,
            origin: transaction.sender,
            sender: transaction.sender,
            energy_price: transaction.energy_price,
            energy: transaction.energy_limit.saturating_sub(transaction.intrinsic_energy()),
            value: transaction.value,
            data: transaction.data.clone(),
            depth: 0,
            kind,
            flags: CallFlags::empty(),
            block,
            side_effects: SideEffects::default(),
        }
    }

    /// Builds the frame requested by `message`, inheriting transaction-wide fields from
    /// `parent`. The new frame starts with an empty ledger.
    pub fn from_message(message: &CallMessage, parent: &Self) -> Self {
        Self {
            transaction_hash: parent.transaction_hash,
            origin_transaction_hash: parent.origin_transaction_hash,
            destination: message.destination,
            contract_address: None,
            origin: parent.origin,
            sender: message.caller,
            energy_price: parent.energy_price,
            energy: message.energy_limit,
            value: message.value,
            data: message.data.clone(),
            depth: message.depth,
            kind: message.kind,
            flags: message.flags,
            block: parent.block.clone(),
            side_effects: SideEffects::default(),
        }
    }
}
