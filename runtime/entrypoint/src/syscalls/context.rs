use crate::GuestResult;
use zkhost_emulator::State;

pub fn wasm_read_context(state: &mut State) -> GuestResult<u64> {
    state.read_context()
}

pub fn wasm_write_context(state: &mut State, value: u64) -> GuestResult<()> {
    state.write_context(value)
}
