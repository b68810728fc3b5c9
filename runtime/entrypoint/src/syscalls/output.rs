use crate::GuestResult;
use zkhost_emulator::State;

pub fn wasm_output(state: &mut State, value: u64) -> GuestResult<()> {
    state.wasm_output(value)
}

pub fn wasm_dbg(state: &mut State, value: u64) -> GuestResult<()> {
    state.wasm_dbg(value)
}
