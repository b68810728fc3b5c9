use crate::GuestResult;
use zkhost_emulator::{State, Visibility};

/// `wasm_input(is_public)`: the next word of the public tape when
/// `is_public` is set, of the private tape otherwise.
pub fn wasm_input(state: &mut State, is_public: bool) -> GuestResult<u64> {
    state.wasm_input(is_public)
}

pub fn read_public_input(state: &mut State) -> GuestResult<u64> {
    state.read_input(Visibility::Public)
}

pub fn read_private_input(state: &mut State) -> GuestResult<u64> {
    state.read_input(Visibility::Private)
}
