use itertools::Itertools;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt::{Display, Formatter};

/// Host primitives a guest can invoke. The discriminants are the call ids
/// recorded in the trace.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostOp {
    WasmInput = 0x01,
    WasmOutput = 0x02,
    Require = 0x03,
    ReadContext = 0x04,
    WriteContext = 0x05,
    MemoryLoad = 0x06,
    MemoryStore = 0x07,
    Log = 0x08,
}

/// One traced primitive invocation.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TraceEvent {
    pub eid: u64,
    pub op: HostOp,
    pub args: Vec<u64>,
    pub ret: Option<u64>,
}

impl Display for TraceEvent {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{} {:?}({})", self.eid, self.op, self.args.iter().join(", "))?;
        if let Some(ret) = self.ret {
            write!(f, " ret={ret}")?;
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TraceCheckpoint {
    len: usize,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Trace {
    events: Vec<TraceEvent>,
}

impl Trace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, op: HostOp, args: &[u64], ret: Option<u64>) {
        let event = TraceEvent {
            eid: self.events.len() as u64,
            op,
            args: args.to_vec(),
            ret,
        };
        log::trace!("{}", event);
        self.events.push(event);
    }

    pub fn checkpoint(&self) -> TraceCheckpoint {
        TraceCheckpoint {
            len: self.events.len(),
        }
    }

    pub fn rollback(&mut self, checkpoint: TraceCheckpoint) {
        self.events.truncate(checkpoint.len);
    }

    pub fn events(&self) -> &[TraceEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn count(&self, op: HostOp) -> usize {
        self.events.iter().filter(|e| e.op == op).count()
    }

    /// sha256 over the bincode encoding of the events.
    pub fn digest(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        for event in self.events.iter() {
            // encoding a plain struct into a Vec cannot fail
            let buf = bincode::serialize(event).unwrap_or_default();
            hasher.update(buf);
        }
        hasher.finalize().into()
    }
}

impl Display for Trace {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.events.iter().join("\n"))
    }
}
