use crate::syscalls::{require, wasm_input, wasm_output};
use crate::GuestResult;
use serde::de::DeserializeOwned;
use serde::Serialize;
use zkhost_emulator::tape::WORD_BYTES;
use zkhost_emulator::{State, Visibility};

/// Reads `byte_length` bytes packed little-endian into whole input words.
/// The unused tail of the last word is dropped.
pub fn read_bytes_from_u64(
    state: &mut State,
    byte_length: usize,
    is_public: bool,
) -> GuestResult<Vec<u8>> {
    state.read_bytes(Visibility::from_flag(is_public), byte_length)
}

/// Reads a length-prefixed byte vector: one word holding the byte length,
/// then the packed bytes.
pub fn read_vec(state: &mut State, is_public: bool) -> GuestResult<Vec<u8>> {
    let len = wasm_input(state, is_public)? as usize;
    log::debug!("read_vec: {} bytes", len);
    read_bytes_from_u64(state, len, is_public)
}

/// Reads a bincode encoded value written with [`read_vec`] framing.
///
/// Bytes that do not decode as `T` fail a `require`, so the run halts with
/// `Violated` instead of crashing the host.
pub fn read<T: DeserializeOwned>(state: &mut State, is_public: bool) -> GuestResult<T> {
    let vec = read_vec(state, is_public)?;
    match bincode::deserialize(&vec) {
        Ok(value) => Ok(value),
        Err(e) => {
            log::warn!("read: {} bytes do not decode: {}", vec.len(), e);
            require(state, false)?;
            unreachable!("require(false) always fails")
        }
    }
}

/// Publishes `value` through `wasm_output` using the same framing [`read`]
/// expects.
pub fn commit<T: Serialize>(state: &mut State, value: &T) -> GuestResult<()> {
    let mut buf = Vec::new();
    bincode::serialize_into(&mut buf, value).expect("serialization failed");
    wasm_output(state, buf.len() as u64)?;
    for word in to_words(&buf) {
        wasm_output(state, word)?;
    }
    Ok(())
}

/// Packs bytes into tape words, eight little-endian bytes per word. Host
/// tools use it to prepare `read_vec` input.
pub fn to_words(bytes: &[u8]) -> Vec<u64> {
    bytes
        .chunks(WORD_BYTES)
        .map(|chunk| {
            let mut data = [0u8; WORD_BYTES];
            data[..chunk.len()].copy_from_slice(chunk);
            u64::from_le_bytes(data)
        })
        .collect()
}

/// Frames a bincode encoding of `value` the way [`read`] consumes it.
pub fn to_input<T: Serialize>(value: &T) -> bincode::Result<Vec<u64>> {
    let buf = bincode::serialize(value)?;
    let mut words = vec![buf.len() as u64];
    words.extend(to_words(&buf));
    Ok(words)
}

#[cfg(test)]
mod tests {
    use super::*;
    use zkhost_emulator::context::{SegmentPosition, SlotSchema};
    use zkhost_emulator::phantom::PhantomRegistry;
    use zkhost_emulator::{ExecutionArg, ExecutionError};

    fn state(public_inputs: Vec<u64>, private_inputs: Vec<u64>) -> Box<State> {
        State::new(
            0,
            SegmentPosition::Only,
            SlotSchema::default(),
            PhantomRegistry::new(&[]).unwrap(),
            ExecutionArg {
                public_inputs,
                private_inputs,
                ..Default::default()
            },
        )
        .unwrap()
    }

    #[test]
    fn batch_input_bytes() {
        env_logger::try_init().unwrap_or_default();
        let mut s = state(vec![], vec![0x0100_0000_0000_0000]);
        let bytes = read_bytes_from_u64(&mut s, 8, false).unwrap();
        assert_eq!(bytes[7], 1);
        assert_eq!(bytes.len(), 8);
    }

    #[test]
    fn structured_private_input() {
        let value = (7u32, String::from("zkhost"), vec![1u64, 2, 3]);
        let mut s = state(vec![], to_input(&value).unwrap());
        let read_back: (u32, String, Vec<u64>) = read(&mut s, false).unwrap();
        assert_eq!(read_back, value);
        assert_eq!(s.tapes().tape(Visibility::Private).remaining(), 0);
    }

    #[test]
    fn malformed_input_is_a_violation() {
        env_logger::try_init().unwrap_or_default();
        // a String whose length prefix claims far more bytes than follow
        let mut s = state(vec![], vec![8, u64::MAX]);
        let err = read::<String>(&mut s, false).unwrap_err();
        assert_eq!(err, ExecutionError::Violated { site: 0 });
        assert_eq!(s.constraints().checked(), 1);
        // the sticky error keeps later reads from going through
        assert_eq!(read_vec(&mut s, false).unwrap_err(), err);
    }

    #[test]
    fn truncated_vec_consumes_nothing() {
        // length word claims 16 bytes but only one word follows
        let mut s = state(vec![16, 0xff], vec![]);
        let err = read_vec(&mut s, true).unwrap_err();
        assert!(matches!(err, ExecutionError::InputExhausted { .. }));
        assert_eq!(s.tapes().tape(Visibility::Public).reads(), 1);
    }

    #[test]
    fn commit_publishes_framed_words() {
        let mut s = state(vec![], vec![]);
        commit(&mut s, &42u64).unwrap();
        assert_eq!(s.public_inputs_and_outputs(), &[8, 42]);
    }
}
