use alloy_primitives::Bytes;

use crate::{
    ExecutionContext, ExecutionError, HaltReason, PrecompiledContract, StateView,
    TransactionResult,
};

/// A precompiled contract that returns its input for a flat energy fee.
#[derive(Debug, Clone, Copy, Default)]
pub struct EchoPrecompile {
    /// The flat fee.
    pub cost: u64,
}

impl PrecompiledContract for EchoPrecompile {
    fn execute(
        &self,
        input: &Bytes,
        energy_limit: u64,
        _context: &ExecutionContext,
        _state: &mut dyn StateView,
    ) -> Result<TransactionResult, ExecutionError> {
        let Some(energy_remaining) = energy_limit.checked_sub(self.cost) else {
            return Ok(TransactionResult::Halt { reason: HaltReason::OutOfEnergy });
        };
        Ok(TransactionResult::Success { energy_remaining, output: input.clone() })
    }
}
