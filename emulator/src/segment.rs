use crate::context::SegmentPosition;
use crate::errors::ExecutionError;
use crate::guest::{ExecutionResult, Guest, Runtime};
use crate::phantom::PhantomRegistry;
use crate::state::{ExecutionArg, State};
use crate::trace::Trace;
use anyhow::{anyhow, Context as _};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::io::{Read, Write};

// pre_context_digest = sha256(context slots handed in)
// context_digest = sha256(context slots handed out)
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
pub struct Segment {
    pub segment_id: u32,
    pub position: SegmentPosition,
    pub step: u64,
    pub public_inputs_and_outputs: Vec<u64>,
    pub outputs: Vec<u64>,
    pub context_inputs: Vec<u64>,
    pub context_outputs: Vec<u64>,
    pub pre_context_digest: [u8; 32],
    pub context_digest: [u8; 32],
    pub trace: Trace,
    pub trace_digest: [u8; 32],
    /// satisfied `require` calls
    pub constraints: usize,
    /// bincode encoding of the guest's return value
    pub output: Vec<u8>,
}

impl Segment {
    pub fn read_output<T: DeserializeOwned>(&self) -> bincode::Result<T> {
        bincode::deserialize(&self.output)
    }
}

pub fn context_digest(slots: &[u64]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    for slot in slots {
        hasher.update(slot.to_le_bytes());
    }
    hasher.finalize().into()
}

/// Public and private tapes of one segment.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Default)]
pub struct SegmentInput {
    pub public_inputs: Vec<u64>,
    pub private_inputs: Vec<u64>,
}

/// Drives the segments of one logical computation strictly in order. The
/// context written by segment N is exactly what segment N+1 reads.
pub struct Continuation<'a, G: Guest> {
    runtime: &'a Runtime,
    guest: &'a G,
    registry: PhantomRegistry,
    total: usize,
    next: usize,
    context: Vec<u64>,
    pre_context_digest: [u8; 32],
}

impl<'a, G: Guest> Continuation<'a, G> {
    pub fn new(
        runtime: &'a Runtime,
        guest: &'a G,
        total: usize,
        context_inputs: Vec<u64>,
    ) -> Result<Self, ExecutionError> {
        runtime.config().context_schema.validate_sequence(total)?;
        let registry = runtime.registry_for(guest)?;

        Ok(Self {
            runtime,
            guest,
            registry,
            total,
            next: 0,
            pre_context_digest: context_digest(&context_inputs),
            context: context_inputs,
        })
    }

    pub fn is_finished(&self) -> bool {
        self.next == self.total
    }

    /// Context slots the next segment will read.
    pub fn context(&self) -> &[u64] {
        &self.context
    }

    pub fn run_segment(
        &mut self,
        input: SegmentInput,
    ) -> Result<ExecutionResult<G::Output>, ExecutionError> {
        if self.is_finished() {
            return Err(ExecutionError::SegmentsExhausted { total: self.total });
        }

        let position = SegmentPosition::of(self.next, self.total);
        let slots = self.runtime.config().context_schema.slots(position);
        let mut state = State::new(
            self.next as u32,
            position,
            slots,
            self.registry.clone(),
            ExecutionArg {
                public_inputs: input.public_inputs,
                private_inputs: input.private_inputs,
                context_inputs: self.context.clone(),
            },
        )?;

        log::debug!("run {} segment {}", self.guest.name(), self.next);
        let output = self.guest.zkmain(&mut state)?;
        let mut buf = Vec::new();
        bincode::serialize_into(&mut buf, &output).expect("serialization failed");

        let segment = (*state).into_segment(buf, self.pre_context_digest)?;
        log::info!(
            "{} segment {} ({:?}) done: {} steps, {} traced events",
            self.guest.name(),
            segment.segment_id,
            segment.position,
            segment.step,
            segment.trace.len()
        );

        self.context = segment.context_outputs.clone();
        self.pre_context_digest = segment.context_digest;
        self.next += 1;

        Ok(ExecutionResult { output, segment })
    }
}

/// Writes `segment` as json to `{output}/{segment_id}`.
pub fn write_segment<W: Write>(
    segment: &Segment,
    output: &str,
    new_writer: fn(&str) -> Option<W>,
) -> anyhow::Result<()> {
    let name = format!("{output}/{}", segment.segment_id);
    log::debug!("split: file {}", name);
    let mut f = new_writer(&name).ok_or_else(|| anyhow!("cannot create segment file {name}"))?;
    let data = serde_json::to_vec(segment)?;
    f.write_all(data.as_slice())?;
    Ok(())
}

pub fn load_segment<R: Read>(reader: R) -> anyhow::Result<Segment> {
    serde_json::from_reader(reader).context("invalid segment file")
}

/// Checks that consecutive segments hand the context over unchanged.
pub fn verify_chain(segments: &[Segment]) -> anyhow::Result<()> {
    for (index, segment) in segments.iter().enumerate() {
        if segment.segment_id as usize != index {
            return Err(anyhow!(
                "segment {} found at position {}",
                segment.segment_id,
                index
            ));
        }
        if context_digest(&segment.context_outputs) != segment.context_digest {
            return Err(anyhow!("segment {} context digest mismatch", index));
        }
        if segment.trace.digest() != segment.trace_digest {
            return Err(anyhow!("segment {} trace digest mismatch", index));
        }
    }

    for pair in segments.windows(2) {
        let (prev, next) = (&pair[0], &pair[1]);
        if prev.context_digest != next.pre_context_digest
            || prev.context_outputs != next.context_inputs
        {
            return Err(anyhow!(
                "segment {} does not continue segment {}",
                next.segment_id,
                prev.segment_id
            ));
        }
    }
    Ok(())
}
