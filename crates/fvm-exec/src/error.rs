//! Fatal errors of the executor.
//!
//! These report broken infrastructure: an unreadable backing store, a garbled message from the
//! interpreter, an arithmetic overflow that admission should have ruled out. Consensus outcomes
//! such as `FAILURE` or `REVERT` are never errors; they are
//! [`TransactionResult`](crate::TransactionResult) values.

use alloy_primitives::{Address, U256};

/// An error raised by an account state view.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StateError {
    /// A debit exceeded the account's balance.
    #[error("balance underflow at {address}: balance {balance}, debit {amount}")]
    BalanceUnderflow {
        /// The debited account.
        address: Address,
        /// The balance before the debit.
        balance: U256,
        /// The attempted debit.
        amount: U256,
    },
    /// A credit overflowed the account's balance.
    #[error("balance overflow at {0}")]
    BalanceOverflow(Address),
    /// The account's nonce cannot be incremented further.
    #[error("nonce overflow at {0}")]
    NonceOverflow(Address),
    /// The backing store failed.
    #[error("state backend error: {0}")]
    Backend(String),
}

/// An error raised while decoding a frame-bridging message or result.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MessageError {
    /// The input ended before the named field.
    #[error("message truncated while reading {field}: need {needed} bytes, {remaining} remaining")]
    Truncated {
        /// The field being read.
        field: &'static str,
        /// Bytes the field needs.
        needed: usize,
        /// Bytes left in the input.
        remaining: usize,
    },
    /// Bytes remained after the last field.
    #[error("{0} trailing bytes after message")]
    TrailingBytes(usize),
    /// The call kind is not one of the known kinds.
    #[error("unknown call kind {0}")]
    UnknownCallKind(u32),
    /// The value does not fit the 16-byte wire field.
    #[error("value {0} exceeds the 16-byte wire field")]
    ValueOverflow(U256),
    /// The nested frame's depth is not one more than its caller's.
    #[error("nested frame depth {found}, expected {expected}")]
    UnexpectedDepth {
        /// The caller's depth plus one.
        expected: u32,
        /// The depth carried by the message.
        found: u32,
    },
}

/// A fatal error that aborts the whole transaction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExecutionError {
    /// The account state view failed.
    #[error(transparent)]
    State(#[from] StateError),
    /// A frame-bridging message could not be decoded.
    #[error(transparent)]
    Message(#[from] MessageError),
    /// The interpreter failed for reasons outside the executed program.
    #[error("interpreter error: {0}")]
    Interpreter(String),
}
