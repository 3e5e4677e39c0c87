use alloy_primitives::Bytes;
use serde::{Deserialize, Serialize};

use crate::{message::Reader, MessageError};

/// The outcome of a frame or of a whole transaction.
///
/// Only [`TransactionResult::Success`] and [`TransactionResult::Revert`] return unspent energy
/// from executed code; a halted frame consumes everything it was given. A rejected transaction
/// never ran, so its whole limit is returned.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionResult {
    /// The frame completed.
    Success {
        /// Energy left when the frame completed.
        energy_remaining: u64,
        /// Return data, or the new contract's address for a successful creation.
        output: Bytes,
    },
    /// The frame reverted explicitly.
    Revert {
        /// Energy left when the frame reverted.
        energy_remaining: u64,
        /// Revert data.
        output: Bytes,
    },
    /// The frame halted and consumed all of its energy.
    Halt {
        /// Why the frame halted.
        reason: HaltReason,
    },
    /// The transaction failed admission and was not executed.
    Rejected {
        /// Why the transaction was rejected.
        reason: RejectionReason,
        /// The transaction's energy limit, returned untouched.
        energy_limit: u64,
    },
}

/// Why a frame halted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HaltReason {
    /// Generic failure: depth limit, insufficient balance, address collision, code deposit.
    Failure,
    /// The frame ran out of energy.
    OutOfEnergy,
    /// An undefined instruction was executed.
    BadInstruction,
    /// A jump targeted an invalid destination.
    BadJumpDestination,
    /// The stack exceeded its limit.
    StackOverflow,
    /// An instruction popped from an empty stack.
    StackUnderflow,
    /// A static frame attempted a state modification.
    StaticModeError,
    /// The interpreter refused to run the code.
    VmRejected,
    /// The interpreter failed internally.
    VmInternalError,
    /// A failure code specific to the interpreter.
    Other(i32),
}

/// Why a transaction failed admission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RejectionReason {
    /// The energy limit is outside the bounds for the transaction kind.
    InvalidEnergyLimit,
    /// Contract deployment is no longer admitted.
    RejectDeploy,
    /// The declared nonce differs from the sender's nonce.
    InvalidNonce,
    /// The sender cannot cover `energy_limit * energy_price + value`.
    InsufficientBalance,
}

/// The flat result code of a [`TransactionResult`], as seen on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResultCode {
    /// See [`TransactionResult::Success`].
    Success,
    /// See [`TransactionResult::Revert`].
    Revert,
    /// See [`TransactionResult::Halt`].
    Halt(HaltReason),
    /// See [`TransactionResult::Rejected`].
    Rejected(RejectionReason),
}

impl ResultCode {
    /// Returns the wire value of the code.
    pub const fn as_i32(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::Halt(HaltReason::Failure) => 1,
            Self::Halt(HaltReason::OutOfEnergy) => 2,
            Self::Halt(HaltReason::BadInstruction) => 3,
            Self::Halt(HaltReason::BadJumpDestination) => 4,
            Self::Halt(HaltReason::StackOverflow) => 5,
            Self::Halt(HaltReason::StackUnderflow) => 6,
            Self::Revert => 7,
            Self::Halt(HaltReason::StaticModeError) => 8,
            Self::Rejected(RejectionReason::InvalidNonce) => -1,
            Self::Rejected(RejectionReason::InvalidEnergyLimit) => -2,
            Self::Rejected(RejectionReason::InsufficientBalance) => -3,
            Self::Rejected(RejectionReason::RejectDeploy) => -4,
            Self::Halt(HaltReason::VmRejected) => -100,
            Self::Halt(HaltReason::VmInternalError) => -101,
            Self::Halt(HaltReason::Other(code)) => code,
        }
    }

    /// Parses a wire value. Unknown values are interpreter-specific halt codes.
    pub const fn from_i32(code: i32) -> Self {
        match code {
            0 => Self::Success,
            1 => Self::Halt(HaltReason::Failure),
            2 => Self::Halt(HaltReason::OutOfEnergy),
            3 => Self::Halt(HaltReason::BadInstruction),
            4 => Self::Halt(HaltReason::BadJumpDestination),
            5 => Self::Halt(HaltReason::StackOverflow),
            6 => Self::Halt(HaltReason::StackUnderflow),
            7 => Self::Revert,
            8 => Self::Halt(HaltReason::StaticModeError),
            -1 => Self::Rejected(RejectionReason::InvalidNonce),
            -2 => Self::Rejected(RejectionReason::InvalidEnergyLimit),
            -3 => Self::Rejected(RejectionReason::InsufficientBalance),
            -4 => Self::Rejected(RejectionReason::RejectDeploy),
            -100 => Self::Halt(HaltReason::VmRejected),
            -101 => Self::Halt(HaltReason::VmInternalError),
            other => Self::Halt(HaltReason::Other(other)),
        }
    }
}

impl TransactionResult {
    /// A successful result holding `energy_remaining` and no output.
    pub const fn success(energy_remaining: u64) -> Self {
        Self::Success { energy_remaining, output: Bytes::new() }
    }

    /// The generic failure.
    pub const fn failure() -> Self {
        Self::Halt { reason: HaltReason::Failure }
    }

    /// Returns the flat result code.
    pub const fn code(&self) -> ResultCode {
        match self {
            Self::Success { .. } => ResultCode::Success,
            Self::Revert { .. } => ResultCode::Revert,
            Self::Halt { reason } => ResultCode::Halt(*reason),
            Self::Rejected { reason, .. } => ResultCode::Rejected(*reason),
        }
    }

    /// Returns `true` if the frame completed.
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Returns `true` if the transaction failed admission.
    pub const fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }

    /// Returns the energy not consumed.
    pub const fn energy_remaining(&self) -> u64 {
        match self {
            Self::Success { energy_remaining, .. } | Self::Revert { energy_remaining, .. } => {
                *energy_remaining
            }
            Self::Halt { .. } => 0,
            Self::Rejected { energy_limit, .. } => *energy_limit,
        }
    }

    /// Returns the output data; empty for halted and rejected results.
    pub fn output(&self) -> &Bytes {
        static EMPTY: Bytes = Bytes::new();
        match self {
            Self::Success { output, .. } | Self::Revert { output, .. } => output,
            Self::Halt { .. } | Self::Rejected { .. } => &EMPTY,
        }
    }

    /// Builds a result from its flat parts, dropping the parts the code cannot carry.
    pub fn from_parts(code: ResultCode, energy_remaining: u64, output: Bytes) -> Self {
        match code {
            ResultCode::Success => Self::Success { energy_remaining, output },
            ResultCode::Revert => Self::Revert { energy_remaining, output },
            ResultCode::Halt(reason) => Self::Halt { reason },
            ResultCode::Rejected(reason) => {
                Self::Rejected { reason, energy_limit: energy_remaining }
            }
        }
    }

    /// Encodes the result for the interpreter: code (i32) ‖ energy remaining (u64) ‖ output
    /// length (u32) ‖ output, all big-endian.
    pub fn encode(&self) -> Bytes {
        let output = self.output();
        let mut buf = Vec::with_capacity(4 + 8 + 4 + output.len());
        buf.extend_from_slice(&self.code().as_i32().to_be_bytes());
        buf.extend_from_slice(&self.energy_remaining().to_be_bytes());
        buf.extend_from_slice(&(output.len() as u32).to_be_bytes());
        buf.extend_from_slice(output);
        buf.into()
    }

    /// Decodes a result produced by [`TransactionResult::encode`].
    pub fn decode(bytes: &[u8]) -> Result<Self, MessageError> {
        let mut reader = Reader::new(bytes);
        let code = ResultCode::from_i32(reader.read_u32("result code")? as i32);
        let energy_remaining = reader.read_u64("energy remaining")?;
        let output = reader.read_prefixed("output")?;
        reader.finish()?;
        Ok(Self::from_parts(code, energy_remaining, output))
    }
}
