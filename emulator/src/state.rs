use crate::constraint::{ConstraintEnforcer, ConstraintResult};
use crate::context::{ContinuationContext, SegmentPosition, SlotSchema};
use crate::errors::ExecutionError;
use crate::memory::{Memory, MemoryOperation};
use crate::phantom::{PhantomRegistry, PhantomSandbox};
use crate::segment::{context_digest, Segment};
use crate::tape::{words_to_bytes, InputTapes, Visibility, WORD_BYTES};
use crate::trace::{HostOp, Trace};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Values handed to one segment before it starts.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Default)]
pub struct ExecutionArg {
    pub public_inputs: Vec<u64>,
    pub private_inputs: Vec<u64>,
    pub context_inputs: Vec<u64>,
}

/// Everything a single run owns. Every host primitive goes through a
/// `&mut State`, so two runs never share tapes, context or trace.
pub struct State {
    pub segment_id: u32,

    /// guest global memory, changed only through `store`
    memory: Box<Memory>,

    tapes: InputTapes,
    context: ContinuationContext,
    constraints: ConstraintEnforcer,
    trace: Trace,

    phantom: PhantomSandbox,
    registry: PhantomRegistry,

    /// public words read plus everything passed to `wasm_output`, in call order.
    public_inputs_and_outputs: Vec<u64>,
    outputs: Vec<u64>,

    /// step counts every primitive call, traced or not.
    step: u64,

    /// first terminal error; once set every later call fails with it.
    terminal: Option<ExecutionError>,
}

impl Display for State {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "State {{ segment: {}, position: {:?}, step: {}, traced: {}, phantom depth: {}, \
            \n public reads: {}, private reads: {}, constraints: {}, terminal: {:?} \
            \n memory: {}, {} loads, {} stores \n}}",
            self.segment_id,
            self.context.position(),
            self.step,
            self.trace.len(),
            self.phantom.depth(),
            self.tapes.tape(Visibility::Public).reads(),
            self.tapes.tape(Visibility::Private).reads(),
            self.constraints.checked(),
            self.terminal,
            self.memory.usage(),
            self.memory.accesses(MemoryOperation::Read),
            self.memory.accesses(MemoryOperation::Write)
        )
    }
}

impl State {
    pub fn new(
        segment_id: u32,
        position: SegmentPosition,
        slots: SlotSchema,
        registry: PhantomRegistry,
        arg: ExecutionArg,
    ) -> Result<Box<Self>, ExecutionError> {
        let context = ContinuationContext::new(position, slots, arg.context_inputs)?;

        Ok(Box::new(Self {
            segment_id,
            memory: Box::new(Memory::new()),
            tapes: InputTapes::new(arg.public_inputs, arg.private_inputs),
            context,
            constraints: ConstraintEnforcer::new(),
            trace: Trace::new(),
            phantom: PhantomSandbox::default(),
            registry,
            public_inputs_and_outputs: Vec::new(),
            outputs: Vec::new(),
            step: 0,
            terminal: None,
        }))
    }

    /// Gate in front of every primitive: a finished run accepts nothing and a
    /// phantom region accepts no traced operation.
    fn enter(&mut self, op: HostOp) -> Result<(), ExecutionError> {
        if let Some(err) = &self.terminal {
            return Err(err.clone());
        }
        self.step += 1;
        log::debug!("host call {:?} at step {}", op, self.step);

        let checked = self.phantom.check(op);
        checked.map_err(|err| self.fail(err))
    }

    /// Marks the run as terminated. Anything a phantom region left in the
    /// trace is dropped.
    fn fail(&mut self, err: ExecutionError) -> ExecutionError {
        log::warn!("segment {} terminated: {}", self.segment_id, err);
        if let Some(checkpoint) = self.phantom.entry_checkpoint() {
            self.trace.rollback(checkpoint);
        }
        if self.terminal.is_none() {
            self.terminal = Some(err.clone());
        }
        err
    }

    fn record(&mut self, op: HostOp, args: &[u64], ret: Option<u64>) {
        if !self.phantom.is_in_phantom_function() {
            self.trace.push(op, args, ret);
        }
    }

    /// `wasm_input(is_public)`
    pub fn wasm_input(&mut self, is_public: bool) -> Result<u64, ExecutionError> {
        self.read_input(Visibility::from_flag(is_public))
    }

    pub fn read_input(&mut self, visibility: Visibility) -> Result<u64, ExecutionError> {
        self.enter(HostOp::WasmInput)?;
        let value = self
            .tapes
            .read(visibility)
            .map_err(|err| self.fail(err))?;
        self.consume_input(visibility, value);
        Ok(value)
    }

    /// Reads `n` bytes drawn from `ceil(n / 8)` whole words of one tape.
    pub fn read_bytes(
        &mut self,
        visibility: Visibility,
        n: usize,
    ) -> Result<Vec<u8>, ExecutionError> {
        self.enter(HostOp::WasmInput)?;
        let words = self
            .tapes
            .read_words(visibility, n.div_ceil(WORD_BYTES))
            .map_err(|err| self.fail(err))?;
        for word in words.iter() {
            self.consume_input(visibility, *word);
        }
        Ok(words_to_bytes(&words, n))
    }

    fn consume_input(&mut self, visibility: Visibility, value: u64) {
        if visibility.is_public() {
            self.public_inputs_and_outputs.push(value);
        }
        self.record(
            HostOp::WasmInput,
            &[visibility.is_public() as u64],
            Some(value),
        );
    }

    /// `wasm_output(value)`: publishes `value` as part of the instance.
    pub fn wasm_output(&mut self, value: u64) -> Result<(), ExecutionError> {
        self.enter(HostOp::WasmOutput)?;
        self.public_inputs_and_outputs.push(value);
        self.outputs.push(value);
        self.record(HostOp::WasmOutput, &[value], None);
        Ok(())
    }

    /// `require(cond)`
    pub fn require(&mut self, condition: bool) -> Result<(), ExecutionError> {
        self.enter(HostOp::Require)?;
        match self.constraints.require(condition) {
            ConstraintResult::Satisfied => {
                self.record(HostOp::Require, &[1], None);
                Ok(())
            }
            ConstraintResult::Violated => {
                let site = self.constraints.checked() - 1;
                Err(self.fail(ExecutionError::Violated { site }))
            }
        }
    }

    /// `wasm_read_context()`
    pub fn read_context(&mut self) -> Result<u64, ExecutionError> {
        self.enter(HostOp::ReadContext)?;
        let value = self.context.read().map_err(|err| self.fail(err))?;
        self.record(HostOp::ReadContext, &[], Some(value));
        Ok(value)
    }

    /// `wasm_write_context(value)`
    pub fn write_context(&mut self, value: u64) -> Result<(), ExecutionError> {
        self.enter(HostOp::WriteContext)?;
        self.context.write(value).map_err(|err| self.fail(err))?;
        self.record(HostOp::WriteContext, &[value], None);
        Ok(())
    }

    /// Loads are allowed inside phantom regions; they are just not traced there.
    pub fn load(&mut self, addr: u32) -> Result<u64, ExecutionError> {
        if let Some(err) = &self.terminal {
            return Err(err.clone());
        }
        self.step += 1;
        let value = self.memory.get_memory(addr);
        self.record(HostOp::MemoryLoad, &[addr as u64], Some(value));
        Ok(value)
    }

    pub fn store(&mut self, addr: u32, value: u64) -> Result<(), ExecutionError> {
        self.enter(HostOp::MemoryStore)?;
        self.memory.set_memory(addr, value);
        self.record(HostOp::MemoryStore, &[addr as u64, value], None);
        Ok(())
    }

    /// `wasm_dbg(value)`
    pub fn wasm_dbg(&mut self, value: u64) -> Result<(), ExecutionError> {
        self.enter(HostOp::Log)?;
        log::info!("{}", value);
        self.record(HostOp::Log, &[value], None);
        Ok(())
    }

    /// Runs `region` as the phantom function `name`.
    ///
    /// `name` has to be a designated phantom function of the guest. The
    /// region leaves no trace; its return value is handed back untouched.
    pub fn call_phantom<R, F>(&mut self, name: &str, region: F) -> Result<R, ExecutionError>
    where
        F: FnOnce(&mut State) -> Result<R, ExecutionError>,
    {
        if let Some(err) = &self.terminal {
            return Err(err.clone());
        }
        let target = self.registry.check_target(name);
        target.map_err(|err| self.fail(err))?;

        log::debug!("enter phantom {} at step {}", name, self.step);
        self.phantom.push_frame(name, self.trace.checkpoint());
        let result = region(&mut *self);
        let checkpoint = self.phantom.pop_frame();
        log::debug!("leave phantom {} at step {}", name, self.step);

        result.map_err(|err| {
            if let Some(checkpoint) = checkpoint {
                self.trace.rollback(checkpoint);
            }
            if self.terminal.is_none() {
                self.terminal = Some(err.clone());
            }
            err
        })
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn step(&self) -> u64 {
        self.step
    }

    pub fn is_in_phantom(&self) -> bool {
        self.phantom.is_in_phantom_function()
    }

    pub fn terminal_error(&self) -> Option<&ExecutionError> {
        self.terminal.as_ref()
    }

    pub fn trace(&self) -> &Trace {
        &self.trace
    }

    pub fn tapes(&self) -> &InputTapes {
        &self.tapes
    }

    pub fn constraints(&self) -> &ConstraintEnforcer {
        &self.constraints
    }

    pub fn position(&self) -> SegmentPosition {
        self.context.position()
    }

    pub fn public_inputs_and_outputs(&self) -> &[u64] {
        &self.public_inputs_and_outputs
    }

    pub fn outputs(&self) -> &[u64] {
        &self.outputs
    }

    /// Seals the run into a segment artifact.
    ///
    /// A terminated run never yields one, and neither does a segment that
    /// left context slots unread or unwritten.
    pub fn into_segment(
        self,
        output: Vec<u8>,
        pre_context_digest: [u8; 32],
    ) -> Result<Segment, ExecutionError> {
        if let Some(err) = self.terminal {
            return Err(err);
        }
        if let Some(site) = self.constraints.violated_at() {
            return Err(ExecutionError::Violated { site });
        }
        let position = self.context.position();
        let context_inputs = self.context.inputs().to_vec();
        let context_outputs = self.context.finalize()?;

        Ok(Segment {
            segment_id: self.segment_id,
            position,
            step: self.step,
            public_inputs_and_outputs: self.public_inputs_and_outputs,
            outputs: self.outputs,
            pre_context_digest,
            context_digest: context_digest(&context_outputs),
            context_inputs,
            context_outputs,
            trace_digest: self.trace.digest(),
            trace: self.trace,
            constraints: self.constraints.checked(),
            output,
        })
    }
}
