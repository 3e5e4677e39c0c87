//! Runtime configuration of the executor.

use alloy_hardforks::ForkCondition;
use alloy_primitives::BlockNumber;
use serde::{Deserialize, Serialize};

use crate::{
    constants::{energy_limit, frame},
    FvmHardfork, FvmHardforkConfig, FvmSpecId,
};

/// Configuration of a [`FvmExecutor`](crate::FvmExecutor).
///
/// Every field falls back to its protocol default when absent from the serialized form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VmConfig {
    /// Bounds on the energy limit a transaction may declare.
    pub energy_limits: EnergyLimitRules,
    /// Depth at which nested frames fail.
    pub max_call_depth: u32,
    /// Energy a successful creation must retain for its code to be deposited.
    pub code_deposit_energy: u64,
    /// Block numbers at which protocol upgrades activate.
    pub hardforks: ForkActivations,
}

impl Default for VmConfig {
    fn default() -> Self {
        Self {
            energy_limits: EnergyLimitRules::default(),
            max_call_depth: frame::MAX_CALL_DEPTH,
            code_deposit_energy: frame::CODE_DEPOSIT_ENERGY,
            hardforks: ForkActivations::default(),
        }
    }
}

impl VmConfig {
    /// Sets the activation blocks of the protocol upgrades.
    pub const fn with_hardforks(mut self, hardforks: ForkActivations) -> Self {
        self.hardforks = hardforks;
        self
    }

    /// Returns the [`FvmSpecId`] in effect at block `number`.
    pub fn spec_id_at_block(&self, number: BlockNumber) -> FvmSpecId {
        FvmHardforkConfig::from(&self.hardforks).spec_id_at_block(number)
    }
}

/// Inclusive bounds on the energy limit of a transaction, per transaction kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnergyLimitRules {
    /// Lowest limit admitted for a call or transfer.
    pub min_non_create: u64,
    /// Highest limit admitted for a call or transfer.
    pub max_non_create: u64,
    /// Lowest limit admitted for a contract creation.
    pub min_create: u64,
    /// Highest limit admitted for a contract creation.
    pub max_create: u64,
}

impl Default for EnergyLimitRules {
    fn default() -> Self {
        Self {
            min_non_create: energy_limit::MIN_NON_CREATE,
            max_non_create: energy_limit::MAX_NON_CREATE,
            min_create: energy_limit::MIN_CREATE,
            max_create: energy_limit::MAX_CREATE,
        }
    }
}

impl EnergyLimitRules {
    /// Returns `true` if `limit` lies within the bounds for the given transaction kind.
    pub const fn is_valid(&self, limit: u64, is_create: bool) -> bool {
        if is_create {
            self.min_create <= limit && limit <= self.max_create
        } else {
            self.min_non_create <= limit && limit <= self.max_non_create
        }
    }
}

/// Activation block of every protocol upgrade. `None` means the upgrade never activates.
///
/// Upgrades are cumulative, so a `signature_swap` block earlier than `fork_040` brings the 040
/// rules forward to it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForkActivations {
    /// Activation block of [`FvmHardfork::Fork040`].
    pub fork_040: Option<BlockNumber>,
    /// Activation block of [`FvmHardfork::SignatureSwap`].
    pub signature_swap: Option<BlockNumber>,
}

impl From<&ForkActivations> for FvmHardforkConfig {
    fn from(activations: &ForkActivations) -> Self {
        let condition =
            |block: Option<BlockNumber>| block.map_or(ForkCondition::Never, ForkCondition::Block);
        Self::default()
            .with(FvmHardfork::Fork040, condition(activations.fork_040))
            .with(FvmHardfork::SignatureSwap, condition(activations.signature_swap))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_protocol_constants() {
        let config = VmConfig::default();
        assert_eq!(config.max_call_depth, 128);
        assert_eq!(config.code_deposit_energy, 1_000);
        assert!(config.energy_limits.is_valid(21_000, false));
        assert!(!config.energy_limits.is_valid(21_000, true));
        assert_eq!(config.spec_id_at_block(1_000_000), FvmSpecId::GENESIS);
    }

    #[test]
    fn test_activations_select_spec() {
        let config = VmConfig::default()
            .with_hardforks(ForkActivations { fork_040: Some(5), signature_swap: Some(8) });
        assert_eq!(config.spec_id_at_block(4), FvmSpecId::GENESIS);
        assert_eq!(config.spec_id_at_block(5), FvmSpecId::FORK_040);
        assert_eq!(config.spec_id_at_block(8), FvmSpecId::SIGNATURE_SWAP);
    }
}
