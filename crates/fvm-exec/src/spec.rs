//! Definitions of the fast virtual machine versions (`FvmSpecId`).

use core::{
    fmt::{self, Display},
    str::FromStr,
};
pub use revm::primitives::hardfork::UnknownHardfork;
use serde::{Deserialize, Serialize};

/// Fast virtual machine spec id, defining the protocol upgrades in effect for a block.
///
/// Upgrades are cumulative: a later version enables every rule of the earlier ones.
/// - [`FvmSpecId::GENESIS`]: the original interpreter entry point and collision rule.
/// - [`FvmSpecId::FORK_040`]: the post-040 interpreter entry point and the relaxed top-level
///   creation collision rule.
/// - [`FvmSpecId::SIGNATURE_SWAP`]: contract-creation transactions are no longer admitted.
#[repr(u8)]
#[derive(
    Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[allow(non_camel_case_types, clippy::upper_case_acronyms)]
pub enum FvmSpecId {
    /// The version before any upgrade.
    GENESIS,
    /// The version of the *040* upgrade.
    #[default]
    FORK_040,
    /// The version of the *signature-scheme swap* upgrade.
    SIGNATURE_SWAP,
}

/// String identifiers for fast virtual machine versions.
pub mod name {
    /// The string identifier for the *Genesis* version.
    pub const GENESIS: &str = "Genesis";
    /// The string identifier for the *040* version.
    pub const FORK_040: &str = "Fork040";
    /// The string identifier for the *signature-scheme swap* version.
    pub const SIGNATURE_SWAP: &str = "SignatureSwap";
}

impl FvmSpecId {
    /// Checks if one given [`FvmSpecId`] is enabled in the current [`FvmSpecId`].
    ///
    /// Versions are backward compatible, so a lower version is always enabled in a higher
    /// version.
    pub const fn is_enabled(self, other: Self) -> bool {
        other as u8 <= self as u8
    }

    /// Returns `true` if the post-040 interpreter entry point and rules apply.
    pub const fn is_fork_040_enabled(self) -> bool {
        self.is_enabled(Self::FORK_040)
    }

    /// Returns `true` if contract-creation transactions are rejected.
    pub const fn rejects_deployments(self) -> bool {
        self.is_enabled(Self::SIGNATURE_SWAP)
    }
}

impl From<FvmSpecId> for &'static str {
    fn from(spec_id: FvmSpecId) -> Self {
        match spec_id {
            FvmSpecId::GENESIS => name::GENESIS,
            FvmSpecId::FORK_040 => name::FORK_040,
            FvmSpecId::SIGNATURE_SWAP => name::SIGNATURE_SWAP,
        }
    }
}

impl FromStr for FvmSpecId {
    type Err = UnknownHardfork;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            name::GENESIS => Ok(Self::GENESIS),
            name::FORK_040 => Ok(Self::FORK_040),
            name::SIGNATURE_SWAP => Ok(Self::SIGNATURE_SWAP),
            _ => Err(UnknownHardfork),
        }
    }
}

impl Display for FvmSpecId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s: &'static str = (*self).into();
        write!(f, "{s}")
    }
}
