//! The side-effect ledger every frame accumulates.

use std::collections::BTreeSet;

use alloy_primitives::{keccak256, Address, Bytes, Log, B256, U256};
use serde::{Deserialize, Serialize};

use crate::constants::wire::TOPIC_SIZE;

/// A record of a value or control transfer performed by contract code.
///
/// Internal transactions are never deleted. A frame that fails marks its records
/// [`rejected`](Self::rejected) instead, so observers can still see what was attempted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InternalTransaction {
    /// The hash of the frame that issued this transfer.
    pub parent_hash: B256,
    /// The depth of the frame that issued this transfer.
    pub depth: u32,
    /// Position of this record in the transaction's final ledger.
    pub index: u32,
    /// The sender's nonce when the record was taken.
    pub nonce: u64,
    /// The sender.
    pub from: Address,
    /// The receiver; `None` for a creation whose address is not yet materialized.
    pub to: Option<Address>,
    /// The value moved.
    pub value: U256,
    /// Call data or init code.
    pub data: Bytes,
    /// `"call"`, `"create"` or `"selfdestruct"`.
    pub note: String,
    /// Set when the issuing frame did not succeed.
    pub rejected: bool,
}

impl InternalTransaction {
    /// Note of a record produced by a nested call.
    pub const CALL: &'static str = "call";
    /// Note of a record produced by a nested creation.
    pub const CREATE: &'static str = "create";
    /// Note of a record produced by a self-destruct.
    pub const SELF_DESTRUCT: &'static str = "selfdestruct";

    /// Returns the hash identifying this record: `keccak256(parent_hash ‖ depth ‖ index)`.
    ///
    /// A nested frame adopts it as its own transaction hash.
    pub fn hash(&self) -> B256 {
        let mut preimage = [0u8; 32 + 4 + 4];
        preimage[..32].copy_from_slice(self.parent_hash.as_slice());
        preimage[32..36].copy_from_slice(&self.depth.to_be_bytes());
        preimage[36..].copy_from_slice(&self.index.to_be_bytes());
        keccak256(preimage)
    }

    /// Flags the record as belonging to a failed frame.
    pub fn mark_rejected(&mut self) {
        self.rejected = true;
    }
}

/// Internal transactions, deleted accounts and logs produced by one frame and its successful
/// descendants.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideEffects {
    internal_transactions: Vec<InternalTransaction>,
    deleted_addresses: BTreeSet<Address>,
    logs: Vec<Log>,
}

impl SideEffects {
    /// Appends an internal transaction and returns its position in this ledger.
    pub fn add_internal_transaction(&mut self, transaction: InternalTransaction) -> usize {
        self.internal_transactions.push(transaction);
        self.internal_transactions.len() - 1
    }

    /// Marks the internal transaction at `position` in this ledger as rejected.
    pub fn mark_rejected(&mut self, position: usize) {
        if let Some(transaction) = self.internal_transactions.get_mut(position) {
            transaction.mark_rejected();
        }
    }

    /// Marks every internal transaction in this ledger as rejected.
    pub fn mark_all_rejected(&mut self) {
        self.internal_transactions.iter_mut().for_each(InternalTransaction::mark_rejected);
    }

    /// Schedules `address` for deletion.
    pub fn add_deleted_address(&mut self, address: Address) {
        self.deleted_addresses.insert(address);
    }

    /// Appends a log entry.
    pub fn add_log(&mut self, log: Log) {
        self.logs.push(log);
    }

    /// Returns the internal transactions in creation order.
    pub fn internal_transactions(&self) -> &[InternalTransaction] {
        &self.internal_transactions
    }

    /// Returns the accounts scheduled for deletion.
    pub const fn deleted_addresses(&self) -> &BTreeSet<Address> {
        &self.deleted_addresses
    }

    /// Returns the log entries in emission order.
    pub fn logs(&self) -> &[Log] {
        &self.logs
    }

    /// Absorbs every side effect of a successful child frame.
    pub fn merge(&mut self, child: Self) {
        self.internal_transactions.extend(child.internal_transactions);
        self.deleted_addresses.extend(child.deleted_addresses);
        self.logs.extend(child.logs);
    }

    /// Absorbs only the internal transactions of a failed child frame.
    pub fn merge_internal_transactions(&mut self, child: Self) {
        self.internal_transactions.extend(child.internal_transactions);
    }
}

/// Folds a finished child frame's ledger into its parent's.
///
/// A successful child contributes everything. A failed child contributes only its internal
/// transactions, which are already marked rejected; its logs and deletions are dropped.
pub fn merge_frame(parent: &mut SideEffects, child: SideEffects, succeeded: bool) {
    if succeeded {
        parent.merge(child);
    } else {
        parent.merge_internal_transactions(child);
    }
}

/// Splits concatenated 32-byte topic words. A short trailing word is zero-padded.
pub fn topics_from_bytes(topics: &[u8]) -> Vec<B256> {
    topics
        .chunks(TOPIC_SIZE)
        .map(|chunk| {
            let mut word = B256::ZERO;
            word[..chunk.len()].copy_from_slice(chunk);
            word
        })
        .collect()
}
