use alloy_primitives::{Address, BlockNumber, Bytes, TxKind, B256, U256};
use serde::{Deserialize, Serialize};

use crate::{constants::intrinsic, MessageError};

/// A signed top-level transaction as submitted to the executor.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Transaction {
    /// The hash of the transaction.
    pub hash: B256,
    /// The signer.
    pub sender: Address,
    /// The destination, or [`TxKind::Create`] for a contract creation.
    pub kind: TxKind,
    /// The sender's nonce as declared by the transaction.
    pub nonce: u64,
    /// The value transferred to the destination.
    pub value: U256,
    /// Call data, or init code for a creation.
    pub data: Bytes,
    /// The maximum energy the transaction may consume.
    pub energy_limit: u64,
    /// The price paid per unit of energy.
    pub energy_price: u64,
}

impl Transaction {
    /// Returns `true` if the transaction creates a contract.
    pub fn is_create(&self) -> bool {
        self.kind.is_create()
    }

    /// Returns the energy charged before any code runs.
    ///
    /// Every transaction pays a base cost and every data byte is charged by whether it is zero;
    /// creations pay an additional flat cost.
    pub fn intrinsic_energy(&self) -> u64 {
        let zeros = self.data.iter().filter(|byte| **byte == 0).count() as u64;
        let non_zeros = self.data.len() as u64 - zeros;
        let mut cost = intrinsic::TRANSACTION +
            zeros * intrinsic::ZERO_DATA_BYTE +
            non_zeros * intrinsic::NON_ZERO_DATA_BYTE;
        if self.is_create() {
            cost += intrinsic::CREATE;
        }
        cost
    }

    /// Returns the up-front cost the sender must cover: `energy_limit * energy_price + value`.
    ///
    /// `None` if the sum does not fit in 256 bits, which no balance can cover.
    pub fn max_cost(&self) -> Option<U256> {
        U256::from(self.energy_limit)
            .checked_mul(U256::from(self.energy_price))?
            .checked_add(self.value)
    }
}

/// Block-level data inherited by every frame of a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BlockContext {
    /// The block producer.
    pub miner: Address,
    /// The block number.
    pub number: BlockNumber,
    /// The block timestamp.
    pub timestamp: u64,
    /// The block energy limit.
    pub energy_limit: u64,
    /// The block difficulty.
    pub difficulty: U256,
}

/// The kind of a frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CallKind {
    /// Runs the destination's code in the destination's context.
    #[default]
    Call,
    /// Runs the destination's code in the caller's context, keeping the caller's caller and value.
    DelegateCall,
    /// Runs the destination's code in the caller's context.
    CallCode,
    /// Runs init code and deploys its output at a new address.
    Create,
}

impl CallKind {
    /// Returns the wire code of the kind.
    pub const fn code(self) -> u32 {
        match self {
            Self::Call => 0,
            Self::DelegateCall => 1,
            Self::CallCode => 2,
            Self::Create => 3,
        }
    }

    /// Returns `true` if the frame runs foreign code in the caller's own context.
    pub const fn runs_in_caller_context(self) -> bool {
        matches!(self, Self::DelegateCall | Self::CallCode)
    }
}

impl TryFrom<u32> for CallKind {
    type Error = MessageError;

    fn try_from(code: u32) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::Call),
            1 => Ok(Self::DelegateCall),
            2 => Ok(Self::CallCode),
            3 => Ok(Self::Create),
            other => Err(MessageError::UnknownCallKind(other)),
        }
    }
}

bitflags::bitflags! {
    /// Interpreter flags carried by a frame.
    ///
    /// The executor forwards them untouched; bits it does not name are retained.
    #[derive(
        Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
    )]
    pub struct CallFlags: u32 {
        /// The frame may not modify state.
        const STATIC = 1 << 0;

        const _ = !0;
    }
}
