use std::collections::BTreeMap;

pub const WORD_SIZE: usize = core::mem::size_of::<u64>();

/// Operation to memory access, Read/Write
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MemoryOperation {
    Read,
    Write,
}

/// Globally visible guest memory, addressed by word index. Unwritten words read as zero.
#[derive(Debug, Clone, Default)]
pub struct Memory {
    words: BTreeMap<u32, u64>,
    /// number of accesses per operation kind
    reads: u64,
    writes: u64,
}

impl Memory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_memory(&mut self, addr: u32) -> u64 {
        self.reads += 1;
        self.words.get(&addr).copied().unwrap_or(0)
    }

    pub fn set_memory(&mut self, addr: u32, value: u64) {
        self.writes += 1;
        self.words.insert(addr, value);
    }

    pub fn accesses(&self, op: MemoryOperation) -> u64 {
        match op {
            MemoryOperation::Read => self.reads,
            MemoryOperation::Write => self.writes,
        }
    }

    pub fn image(&self) -> &BTreeMap<u32, u64> {
        &self.words
    }

    pub fn usage(&self) -> String {
        format!("{} words", self.words.len())
    }
}
