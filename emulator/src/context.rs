use crate::errors::ExecutionError;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Where a segment sits in a continuation sequence.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentPosition {
    First,
    Middle,
    Last,
    /// The whole computation fits in one segment.
    Only,
}

impl SegmentPosition {
    pub fn of(index: usize, total: usize) -> Self {
        assert!(index < total, "segment {index} out of {total}");
        match (index, total) {
            (_, 1) => SegmentPosition::Only,
            (0, _) => SegmentPosition::First,
            (i, n) if i + 1 == n => SegmentPosition::Last,
            _ => SegmentPosition::Middle,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextOp {
    Read,
    Write,
    /// A read issued after the segment already wrote a slot.
    ReadAfterWrite,
}

impl Display for ContextOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ContextOp::Read => write!(f, "read"),
            ContextOp::Write => write!(f, "write"),
            ContextOp::ReadAfterWrite => write!(f, "read after write"),
        }
    }
}

/// Number of context reads and writes a segment performs.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SlotSchema {
    pub reads: usize,
    pub writes: usize,
}

impl SlotSchema {
    pub fn new(reads: usize, writes: usize) -> Self {
        Self { reads, writes }
    }
}

/// Context slot layout for every segment position.
///
/// Declared up front rather than inferred from the calls a guest makes, so
/// a segment that reads or writes the wrong number of slots is caught.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(default)]
pub struct ContextSchema {
    pub first: SlotSchema,
    pub middle: SlotSchema,
    pub last: SlotSchema,
    pub only: SlotSchema,
}

impl ContextSchema {
    /// Every position reads and writes the same number of slots.
    pub fn uniform(reads: usize, writes: usize) -> Self {
        let slots = SlotSchema::new(reads, writes);
        Self {
            first: slots,
            middle: slots,
            last: slots,
            only: slots,
        }
    }

    pub fn slots(&self, position: SegmentPosition) -> SlotSchema {
        match position {
            SegmentPosition::First => self.first,
            SegmentPosition::Middle => self.middle,
            SegmentPosition::Last => self.last,
            SegmentPosition::Only => self.only,
        }
    }

    /// Checks that what each segment writes is exactly what the next one reads.
    pub fn validate_sequence(&self, total: usize) -> Result<(), ExecutionError> {
        for index in 1..total {
            let prev = SegmentPosition::of(index - 1, total);
            let next = SegmentPosition::of(index, total);
            let (writes, reads) = (self.slots(prev).writes, self.slots(next).reads);
            if writes != reads {
                return Err(ExecutionError::ContextSchemaMismatch {
                    position: next,
                    op: ContextOp::Read,
                    expected: reads,
                    actual: writes,
                });
            }
        }
        Ok(())
    }
}

/// The context slots visible to one segment.
#[derive(Debug, Clone)]
pub struct ContinuationContext {
    position: SegmentPosition,
    schema: SlotSchema,
    inputs: Vec<u64>,
    read_ptr: usize,
    outputs: Vec<u64>,
    write_ptr: usize,
}

impl ContinuationContext {
    pub fn new(
        position: SegmentPosition,
        schema: SlotSchema,
        inputs: Vec<u64>,
    ) -> Result<Self, ExecutionError> {
        if inputs.len() != schema.reads {
            return Err(ExecutionError::ContextSchemaMismatch {
                position,
                op: ContextOp::Read,
                expected: schema.reads,
                actual: inputs.len(),
            });
        }

        Ok(Self {
            position,
            schema,
            inputs,
            read_ptr: 0,
            outputs: vec![0; schema.writes],
            write_ptr: 0,
        })
    }

    fn mismatch(&self, op: ContextOp, actual: usize) -> ExecutionError {
        let expected = match op {
            ContextOp::Read => self.schema.reads,
            ContextOp::Write => self.schema.writes,
            ContextOp::ReadAfterWrite => 0,
        };
        ExecutionError::ContextSchemaMismatch {
            position: self.position,
            op,
            expected,
            actual,
        }
    }

    pub fn position(&self) -> SegmentPosition {
        self.position
    }

    pub fn inputs(&self) -> &[u64] {
        &self.inputs
    }

    /// Slots read so far.
    pub fn reads(&self) -> usize {
        self.read_ptr
    }

    /// Slots written so far.
    pub fn writes(&self) -> usize {
        self.write_ptr
    }

    pub fn read(&mut self) -> Result<u64, ExecutionError> {
        // all reads of a segment happen before its first write
        if self.write_ptr > 0 {
            return Err(self.mismatch(ContextOp::ReadAfterWrite, self.write_ptr));
        }
        if self.read_ptr >= self.schema.reads {
            return Err(self.mismatch(ContextOp::Read, self.read_ptr + 1));
        }
        let value = self.inputs[self.read_ptr];
        self.read_ptr += 1;
        Ok(value)
    }

    pub fn write(&mut self, value: u64) -> Result<(), ExecutionError> {
        if self.write_ptr >= self.schema.writes {
            return Err(self.mismatch(ContextOp::Write, self.write_ptr + 1));
        }
        self.outputs[self.write_ptr] = value;
        self.write_ptr += 1;
        Ok(())
    }

    /// Consumes the segment's view and hands back the slots for the next segment.
    pub fn finalize(self) -> Result<Vec<u64>, ExecutionError> {
        if self.read_ptr != self.schema.reads {
            return Err(self.mismatch(ContextOp::Read, self.read_ptr));
        }
        if self.write_ptr != self.schema.writes {
            return Err(self.mismatch(ContextOp::Write, self.write_ptr));
        }
        Ok(self.outputs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positions() {
        assert_eq!(SegmentPosition::of(0, 1), SegmentPosition::Only);
        assert_eq!(SegmentPosition::of(0, 3), SegmentPosition::First);
        assert_eq!(SegmentPosition::of(1, 3), SegmentPosition::Middle);
        assert_eq!(SegmentPosition::of(2, 3), SegmentPosition::Last);
        assert_eq!(SegmentPosition::of(1, 2), SegmentPosition::Last);
    }

    #[test]
    fn read_then_write_in_order() {
        let mut ctx =
            ContinuationContext::new(SegmentPosition::Only, SlotSchema::new(2, 2), vec![2, 5])
                .unwrap();
        let sum = ctx.read().unwrap() + ctx.read().unwrap();
        ctx.write(sum).unwrap();
        ctx.write(sum).unwrap();
        assert_eq!(ctx.finalize().unwrap(), vec![7, 7]);
    }

    #[test]
    fn reading_past_schema_fails() {
        let mut ctx =
            ContinuationContext::new(SegmentPosition::First, SlotSchema::new(1, 0), vec![4])
                .unwrap();
        assert_eq!(ctx.read(), Ok(4));
        assert_eq!(
            ctx.read(),
            Err(ExecutionError::ContextSchemaMismatch {
                position: SegmentPosition::First,
                op: ContextOp::Read,
                expected: 1,
                actual: 2,
            })
        );
    }

    #[test]
    fn read_after_write_fails() {
        let mut ctx =
            ContinuationContext::new(SegmentPosition::Middle, SlotSchema::new(2, 1), vec![1, 2])
                .unwrap();
        ctx.read().unwrap();
        ctx.write(9).unwrap();
        let err = ctx.read().unwrap_err();
        assert_eq!(
            err,
            ExecutionError::ContextSchemaMismatch {
                position: SegmentPosition::Middle,
                op: ContextOp::ReadAfterWrite,
                expected: 0,
                actual: 1,
            }
        );
        assert_eq!(
            err.to_string(),
            "context read after 1 write in Middle segment, reads must come first"
        );
        assert_eq!(ctx.reads(), 1);
    }

    #[test]
    fn missing_writes_fail_on_finalize() {
        let mut ctx =
            ContinuationContext::new(SegmentPosition::Last, SlotSchema::new(0, 2), vec![]).unwrap();
        ctx.write(1).unwrap();
        assert!(matches!(
            ctx.finalize(),
            Err(ExecutionError::ContextSchemaMismatch {
                op: ContextOp::Write,
                expected: 2,
                actual: 1,
                ..
            })
        ));
    }

    #[test]
    fn wrong_input_count_is_rejected() {
        assert!(
            ContinuationContext::new(SegmentPosition::First, SlotSchema::new(2, 0), vec![1])
                .is_err()
        );
    }

    #[test]
    fn sequence_validation() {
        assert!(ContextSchema::uniform(2, 2).validate_sequence(4).is_ok());

        let schema = ContextSchema {
            first: SlotSchema::new(0, 3),
            middle: SlotSchema::new(3, 3),
            last: SlotSchema::new(2, 0),
            only: SlotSchema::default(),
        };
        assert!(schema.validate_sequence(1).is_ok());
        assert!(schema.validate_sequence(2).is_err());
        assert!(schema.validate_sequence(3).is_err());
    }
}
