use std::sync::Arc;

use alloy_primitives::{map::HashMap, Address, Bytes};
use auto_impl::auto_impl;

use crate::{ExecutionContext, ExecutionError, StateView, TransactionResult};

/// A contract implemented natively rather than in bytecode.
#[auto_impl(&, Box, Arc)]
pub trait PrecompiledContract {
    /// Executes the contract.
    ///
    /// # Arguments
    ///
    /// * `input` - The call data.
    /// * `energy_limit` - The energy handed to the frame.
    /// * `context` - The frame the contract runs in.
    /// * `state` - The frame's view of account state.
    fn execute(
        &self,
        input: &Bytes,
        energy_limit: u64,
        context: &ExecutionContext,
        state: &mut dyn StateView,
    ) -> Result<TransactionResult, ExecutionError>;
}

/// Resolves addresses to precompiled contracts.
#[auto_impl(&, Box, Arc)]
pub trait PrecompileSet {
    /// Returns the contract registered at `address`, if any.
    fn resolve(&self, address: &Address) -> Option<&dyn PrecompiledContract>;
}

/// A [`PrecompileSet`] with no contracts.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPrecompiles;

impl PrecompileSet for NoPrecompiles {
    fn resolve(&self, _address: &Address) -> Option<&dyn PrecompiledContract> {
        None
    }
}

/// A [`PrecompileSet`] backed by a map from address to contract.
#[derive(Clone, Default, derive_more::Debug)]
pub struct PrecompilesMap {
    #[debug(ignore)]
    contracts: HashMap<Address, Arc<dyn PrecompiledContract + Send + Sync>>,
}

impl PrecompilesMap {
    /// Registers `contract` at `address`, replacing any previous registration.
    pub fn insert(
        &mut self,
        address: Address,
        contract: impl PrecompiledContract + Send + Sync + 'static,
    ) -> &mut Self {
        self.contracts.insert(address, Arc::new(contract));
        self
    }
}

impl PrecompileSet for PrecompilesMap {
    fn resolve(&self, address: &Address) -> Option<&dyn PrecompiledContract> {
        self.contracts.get(address).map(|contract| contract.as_ref() as &dyn PrecompiledContract)
    }
}
