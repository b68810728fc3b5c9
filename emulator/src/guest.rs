use crate::config::RuntimeConfig;
use crate::errors::ExecutionError;
use crate::phantom::{FunctionDesc, PhantomRegistry};
use crate::segment::{Continuation, Segment, SegmentInput};
use crate::state::{ExecutionArg, State};
use serde::Serialize;

/// Name of the guest entry function.
pub const ENTRY: &str = "zkmain";

/// A guest program executed against the host primitives.
pub trait Guest {
    type Output: Serialize;

    fn name(&self) -> &str;

    /// Function table of the guest. Phantom patterns are matched against it.
    fn functions(&self) -> Vec<FunctionDesc> {
        vec![FunctionDesc::new(ENTRY)]
    }

    fn zkmain(&self, state: &mut State) -> Result<Self::Output, ExecutionError>;
}

pub struct ExecutionResult<T> {
    pub output: T,
    pub segment: Segment,
}

/// Host side of the contract, built once from a [`RuntimeConfig`].
#[derive(Debug, Clone)]
pub struct Runtime {
    config: RuntimeConfig,
    phantom: PhantomRegistry,
}

impl Runtime {
    pub fn new(config: RuntimeConfig) -> anyhow::Result<Self> {
        let phantom = PhantomRegistry::new(&config.phantom_functions)?;
        Ok(Self { config, phantom })
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Validates the guest's function table against the phantom patterns.
    pub fn registry_for<G: Guest>(&self, guest: &G) -> Result<PhantomRegistry, ExecutionError> {
        let mut registry = self.phantom.clone();
        registry.register(&guest.functions())?;
        Ok(registry)
    }

    /// Runs `guest` as a single-segment computation.
    pub fn execute<G: Guest>(
        &self,
        guest: &G,
        arg: ExecutionArg,
    ) -> Result<ExecutionResult<G::Output>, ExecutionError> {
        let mut continuation = Continuation::new(self, guest, 1, arg.context_inputs)?;
        continuation.run_segment(SegmentInput {
            public_inputs: arg.public_inputs,
            private_inputs: arg.private_inputs,
        })
    }

    /// Runs `inputs.len()` segments of `guest` in order.
    pub fn execute_segments<G: Guest>(
        &self,
        guest: &G,
        context_inputs: Vec<u64>,
        inputs: Vec<SegmentInput>,
    ) -> Result<Vec<ExecutionResult<G::Output>>, ExecutionError> {
        let mut continuation = Continuation::new(self, guest, inputs.len(), context_inputs)?;
        inputs
            .into_iter()
            .map(|input| continuation.run_segment(input))
            .collect()
    }
}
