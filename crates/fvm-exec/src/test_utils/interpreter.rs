use std::{cell::RefCell, sync::Arc};

use alloy_primitives::{map::HashMap, Bytes};

use crate::{ExecutionError, Host, Interpreter, TransactionResult};

/// A closure standing in for the bytecode of one contract.
pub type Script =
    Arc<dyn Fn(&mut dyn Host) -> Result<TransactionResult, ExecutionError> + Send + Sync>;

/// The interpreter entry point a frame was handed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryPoint {
    /// [`Interpreter::run`].
    Legacy,
    /// [`Interpreter::run_v1`].
    V1,
}

/// One frame the [`MockInterpreter`] was asked to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// The entry point used.
    pub entry: EntryPoint,
    /// The code handed over.
    pub code: Bytes,
    /// The depth of the frame.
    pub depth: u32,
    /// The energy the frame started with.
    pub energy: u64,
}

/// A scripted interpreter.
///
/// Code registered with [`with_script`](Self::with_script) runs its closure against the host.
/// Any other code returns the fixed result of the entry point it reached, or succeeds with the
/// frame's whole energy if none is set.
#[derive(Clone, Default, derive_more::Debug)]
pub struct MockInterpreter {
    legacy_result: Option<TransactionResult>,
    v1_result: Option<TransactionResult>,
    #[debug(ignore)]
    scripts: HashMap<Bytes, Script>,
    invocations: RefCell<Vec<Invocation>>,
}

impl MockInterpreter {
    /// Returns `result` from both entry points for unscripted code.
    pub fn with_result(self, result: TransactionResult) -> Self {
        self.with_results(result.clone(), result)
    }

    /// Returns `legacy` from [`Interpreter::run`] and `v1` from [`Interpreter::run_v1`] for
    /// unscripted code.
    pub fn with_results(mut self, legacy: TransactionResult, v1: TransactionResult) -> Self {
        self.legacy_result = Some(legacy);
        self.v1_result = Some(v1);
        self
    }

    /// Runs `script` whenever `code` is handed over.
    pub fn with_script(
        mut self,
        code: Bytes,
        script: impl Fn(&mut dyn Host) -> Result<TransactionResult, ExecutionError>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        self.scripts.insert(code, Arc::new(script));
        self
    }

    /// Returns every frame run so far, in order.
    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations.borrow().clone()
    }

    fn execute(
        &self,
        entry: EntryPoint,
        code: &Bytes,
        host: &mut dyn Host,
    ) -> Result<TransactionResult, ExecutionError> {
        let context = host.context();
        self.invocations.borrow_mut().push(Invocation {
            entry,
            code: code.clone(),
            depth: context.depth,
            energy: context.energy,
        });
        if let Some(script) = self.scripts.get(code) {
            return script(host);
        }
        let fixed = match entry {
            EntryPoint::Legacy => &self.legacy_result,
            EntryPoint::V1 => &self.v1_result,
        };
        Ok(fixed.clone().unwrap_or_else(|| TransactionResult::success(host.context().energy)))
    }
}

impl Interpreter for MockInterpreter {
    fn run(&self, code: &Bytes, host: &mut dyn Host) -> Result<TransactionResult, ExecutionError> {
        self.execute(EntryPoint::Legacy, code, host)
    }

    fn run_v1(
        &self,
        code: &Bytes,
        host: &mut dyn Host,
    ) -> Result<TransactionResult, ExecutionError> {
        self.execute(EntryPoint::V1, code, host)
    }
}
