use crate::context::{ContextOp, SegmentPosition};
use crate::tape::Visibility;
use crate::trace::HostOp;
use std::fmt::{Display, Formatter};

/// Terminal failures of a guest run. None of them is retried by the runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionError {
    /// A tape was read past its last word.
    InputExhausted { visibility: Visibility, reads: usize },
    /// `require` was called with a false condition. `site` is the index of the call.
    Violated { site: usize },
    /// The segment did not follow the context schema of its position.
    ContextSchemaMismatch {
        position: SegmentPosition,
        op: ContextOp,
        expected: usize,
        actual: usize,
    },
    /// A phantom region attempted a traced or mutating operation.
    PhantomViolation { region: String, op: HostOp },
    /// The call site is not a designated phantom function.
    InvalidPhantomTarget { function: String, reason: PhantomTargetError },
    /// A continuation was asked for a segment past its last one.
    SegmentsExhausted { total: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhantomTargetError {
    NotDesignated,
    Inlined,
    Unknown,
}

impl ExecutionError {
    /// A violated constraint rejects the input, every other kind is a fault of the run.
    pub fn is_rejection(&self) -> bool {
        matches!(self, ExecutionError::Violated { .. })
    }
}

impl Display for PhantomTargetError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            PhantomTargetError::NotDesignated => write!(f, "not marked as phantom"),
            PhantomTargetError::Inlined => write!(f, "inlined functions have no call boundary"),
            PhantomTargetError::Unknown => write!(f, "not in the function table"),
        }
    }
}

impl Display for ExecutionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecutionError::InputExhausted { visibility, reads } => {
                write!(f, "{visibility} input exhausted after {reads} reads")
            }
            ExecutionError::Violated { site } => {
                write!(f, "constraint violated at call site {site}")
            }
            ExecutionError::ContextSchemaMismatch {
                position,
                op: ContextOp::ReadAfterWrite,
                actual,
                ..
            } => write!(
                f,
                "context read after {actual} write{} in {position:?} segment, reads must come first",
                if *actual == 1 { "" } else { "s" }
            ),
            ExecutionError::ContextSchemaMismatch {
                position,
                op,
                expected,
                actual,
            } => write!(
                f,
                "context schema mismatch in {position:?} segment: expected {expected} {op}s, got {actual}"
            ),
            ExecutionError::PhantomViolation { region, op } => {
                write!(f, "phantom region `{region}` attempted traced operation {op:?}")
            }
            ExecutionError::InvalidPhantomTarget { function, reason } => {
                write!(f, "`{function}` cannot run as phantom: {reason}")
            }
            ExecutionError::SegmentsExhausted { total } => {
                write!(f, "all {total} segments already ran")
            }
        }
    }
}

impl std::error::Error for ExecutionError {}
