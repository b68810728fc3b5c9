use crate::errors::ExecutionError;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt::{Display, Formatter};

pub const WORD_BYTES: usize = core::mem::size_of::<u64>();

/// Selects one of the two input tapes.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visibility {
    Public,
    Private,
}

impl Visibility {
    /// `wasm_input(1)` reads the public tape, `wasm_input(0)` the private one.
    pub fn from_flag(is_public: bool) -> Self {
        if is_public {
            Visibility::Public
        } else {
            Visibility::Private
        }
    }

    pub fn is_public(&self) -> bool {
        matches!(self, Visibility::Public)
    }
}

impl Display for Visibility {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Visibility::Public => write!(f, "public"),
            Visibility::Private => write!(f, "private"),
        }
    }
}

/// An ordered stream of words consumed front to back.
#[derive(Debug, Clone, Default)]
pub struct InputTape {
    words: VecDeque<u64>,
    cursor: usize,
}

impl InputTape {
    pub fn new(words: Vec<u64>) -> Self {
        Self {
            words: words.into(),
            cursor: 0,
        }
    }

    pub fn pop(&mut self) -> Option<u64> {
        let value = self.words.pop_front()?;
        self.cursor += 1;
        Some(value)
    }

    pub fn remaining(&self) -> usize {
        self.words.len()
    }

    /// Number of words read so far, i.e. the cursor position.
    pub fn reads(&self) -> usize {
        self.cursor
    }
}

/// The public and private tapes of one run. Kept as a tagged pair so a read
/// can never cross from one stream into the other.
#[derive(Debug, Clone, Default)]
pub struct InputTapes {
    public: InputTape,
    private: InputTape,
}

impl InputTapes {
    pub fn new(public_inputs: Vec<u64>, private_inputs: Vec<u64>) -> Self {
        Self {
            public: InputTape::new(public_inputs),
            private: InputTape::new(private_inputs),
        }
    }

    pub fn tape(&self, visibility: Visibility) -> &InputTape {
        match visibility {
            Visibility::Public => &self.public,
            Visibility::Private => &self.private,
        }
    }

    fn tape_mut(&mut self, visibility: Visibility) -> &mut InputTape {
        match visibility {
            Visibility::Public => &mut self.public,
            Visibility::Private => &mut self.private,
        }
    }

    pub fn read(&mut self, visibility: Visibility) -> Result<u64, ExecutionError> {
        let tape = self.tape_mut(visibility);
        tape.pop().ok_or_else(|| ExecutionError::InputExhausted {
            visibility,
            reads: tape.reads(),
        })
    }

    /// Reads `count` whole words, or nothing when fewer remain.
    pub fn read_words(
        &mut self,
        visibility: Visibility,
        count: usize,
    ) -> Result<Vec<u64>, ExecutionError> {
        let tape = self.tape_mut(visibility);
        if tape.remaining() < count {
            return Err(ExecutionError::InputExhausted {
                visibility,
                reads: tape.reads(),
            });
        }
        Ok((0..count).filter_map(|_| tape.pop()).collect())
    }

    /// Reads `ceil(n / 8)` words and returns their first `n` little-endian bytes.
    ///
    /// The bytes of the last word beyond `n` are dropped. Nothing is consumed
    /// when the tape holds fewer words than needed.
    pub fn read_bytes(&mut self, visibility: Visibility, n: usize) -> Result<Vec<u8>, ExecutionError> {
        let words = self.read_words(visibility, n.div_ceil(WORD_BYTES))?;
        Ok(words_to_bytes(&words, n))
    }
}

/// Little-endian concatenation of `words`, cut to `n` bytes.
pub fn words_to_bytes(words: &[u64], n: usize) -> Vec<u8> {
    let mut bytes = words
        .iter()
        .flat_map(|word| word.to_le_bytes())
        .collect::<Vec<u8>>();
    bytes.truncate(n);
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_in_order_then_exhausts() {
        let mut tapes = InputTapes::new(vec![7, 8, 9], vec![]);
        assert_eq!(tapes.read(Visibility::Public), Ok(7));
        assert_eq!(tapes.read(Visibility::Public), Ok(8));
        assert_eq!(tapes.read(Visibility::Public), Ok(9));
        assert_eq!(
            tapes.read(Visibility::Public),
            Err(ExecutionError::InputExhausted {
                visibility: Visibility::Public,
                reads: 3
            })
        );
    }

    #[test]
    fn tapes_are_independent() {
        let mut tapes = InputTapes::new(vec![1], vec![2, 3]);
        assert_eq!(tapes.read(Visibility::Private), Ok(2));
        assert_eq!(tapes.read(Visibility::Public), Ok(1));
        assert_eq!(tapes.read(Visibility::Private), Ok(3));
        assert!(tapes.read(Visibility::Public).is_err());
        assert_eq!(tapes.tape(Visibility::Private).reads(), 2);
        assert_eq!(tapes.tape(Visibility::Public).reads(), 1);
    }

    #[test]
    fn partial_word_is_discarded() {
        let first = u64::from_le_bytes([1, 2, 3, 4, 5, 6, 7, 8]);
        let second = u64::from_le_bytes([9, 10, 11, 12, 13, 14, 15, 16]);
        let mut tapes = InputTapes::new(vec![], vec![first, second, 99]);

        let bytes = tapes.read_bytes(Visibility::Private, 11).unwrap();
        assert_eq!(bytes, vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11]);
        // both words are gone even though only three bytes of the second were used
        assert_eq!(tapes.tape(Visibility::Private).reads(), 2);
        assert_eq!(tapes.read(Visibility::Private), Ok(99));
    }

    #[test]
    fn read_bytes_needs_whole_words() {
        let mut tapes = InputTapes::new(vec![1], vec![]);
        assert!(tapes.read_bytes(Visibility::Public, 9).is_err());
        assert_eq!(tapes.tape(Visibility::Public).remaining(), 1);
        assert_eq!(tapes.read_bytes(Visibility::Public, 0), Ok(vec![]));
        assert_eq!(tapes.read_bytes(Visibility::Public, 1), Ok(vec![1]));
    }
}
