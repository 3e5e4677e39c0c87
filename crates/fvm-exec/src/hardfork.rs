use alloy_hardforks::{hardfork, ForkCondition};
use alloy_primitives::BlockNumber;

use crate::FvmSpecId;

hardfork! {
    /// The protocol upgrades that change how transactions are executed.
    #[derive(serde::Serialize, serde::Deserialize)]
    FvmHardfork {
        /// Switches the interpreter entry point and the top-level collision rule.
        Fork040,
        /// Stops admitting contract-creation transactions.
        SignatureSwap,
    }
}

/// Activation conditions of every [`FvmHardfork`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FvmHardforkConfig {
    fork_040: ForkCondition,
    signature_swap: ForkCondition,
}

impl Default for FvmHardforkConfig {
    /// No upgrade is ever activated.
    fn default() -> Self {
        Self { fork_040: ForkCondition::Never, signature_swap: ForkCondition::Never }
    }
}

impl FvmHardforkConfig {
    /// Sets the activation condition of `fork`.
    pub fn with(mut self, fork: FvmHardfork, condition: ForkCondition) -> Self {
        match fork {
            FvmHardfork::Fork040 => self.fork_040 = condition,
            FvmHardfork::SignatureSwap => self.signature_swap = condition,
        }
        self
    }

    /// Returns the [`FvmSpecId`] in effect at block `number`.
    ///
    /// Upgrades are cumulative: once [`FvmHardfork::SignatureSwap`] is active the 040 rules apply
    /// too, even if [`FvmHardfork::Fork040`] was scheduled later or never.
    pub fn spec_id_at_block(&self, number: BlockNumber) -> FvmSpecId {
        if self.signature_swap.active_at_block(number) {
            FvmSpecId::SIGNATURE_SWAP
        } else if self.fork_040.active_at_block(number) {
            FvmSpecId::FORK_040
        } else {
            FvmSpecId::GENESIS
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_id_follows_activation_blocks() {
        let config = FvmHardforkConfig::default()
            .with(FvmHardfork::Fork040, ForkCondition::Block(10))
            .with(FvmHardfork::SignatureSwap, ForkCondition::Block(20));
        assert_eq!(config.spec_id_at_block(0), FvmSpecId::GENESIS);
        assert_eq!(config.spec_id_at_block(9), FvmSpecId::GENESIS);
        assert_eq!(config.spec_id_at_block(10), FvmSpecId::FORK_040);
        assert_eq!(config.spec_id_at_block(20), FvmSpecId::SIGNATURE_SWAP);
    }

    #[test]
    fn test_default_activates_nothing() {
        assert_eq!(FvmHardforkConfig::default().spec_id_at_block(u64::MAX), FvmSpecId::GENESIS);
    }

    #[test]
    fn test_signature_swap_implies_fork_040() {
        let config = FvmHardforkConfig::default()
            .with(FvmHardfork::Fork040, ForkCondition::Block(20))
            .with(FvmHardfork::SignatureSwap, ForkCondition::Block(10));
        assert_eq!(config.spec_id_at_block(9), FvmSpecId::GENESIS);
        let spec = config.spec_id_at_block(10);
        assert_eq!(spec, FvmSpecId::SIGNATURE_SWAP);
        assert!(spec.is_fork_040_enabled());
    }
}
