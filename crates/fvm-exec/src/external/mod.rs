//! Capabilities the executor consumes but does not implement.
//!
//! The bytecode interpreter, the precompiled contracts and the contract address derivation are
//! supplied by the embedder. Each is a narrow trait so tests can substitute scripted versions.

use alloy_primitives::{Address, Bytes};
use auto_impl::auto_impl;

use crate::{ExecutionError, Host, TransactionResult};

mod precompiles;
pub use precompiles::*;

/// The bytecode interpreter.
///
/// It has one entry point per protocol era; the executor picks one per transaction and uses it
/// for every frame of that transaction. Nested calls re-enter the executor through `host`.
#[auto_impl(&, Box, Arc)]
pub trait Interpreter {
    /// Runs `code` with the rules in force before the 040 upgrade.
    fn run(&self, code: &Bytes, host: &mut dyn Host) -> Result<TransactionResult, ExecutionError>;

    /// Runs `code` with the rules in force from the 040 upgrade on.
    fn run_v1(&self, code: &Bytes, host: &mut dyn Host)
        -> Result<TransactionResult, ExecutionError>;
}

/// Derives the address of a contract created by `sender`.
#[auto_impl(&, Box, Arc)]
pub trait ContractAddressScheme {
    /// Returns the address of the contract `sender` creates with `nonce`.
    fn contract_address(&self, sender: &Address, nonce: u64) -> Address;
}

/// The default address derivation: `keccak256(rlp([sender, nonce]))[12..]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RlpContractAddress;

impl ContractAddressScheme for RlpContractAddress {
    fn contract_address(&self, sender: &Address, nonce: u64) -> Address {
        sender.create(nonce)
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::address;

    use super::*;

    #[test]
    fn test_rlp_contract_address() {
        let sender = address!("0x6ac7ea33f8831ea9dcc53393aaa88b25a785dbf0");
        assert_eq!(
            RlpContractAddress.contract_address(&sender, 0),
            address!("0xcd234a471b72ba2f1ccf0a70fcaba648a5eecd8d")
        );
        assert_eq!(
            RlpContractAddress.contract_address(&sender, 1),
            address!("0x343c43a37d37dff08ae8c4a11544c718abb4fcf8")
        );
    }
}
