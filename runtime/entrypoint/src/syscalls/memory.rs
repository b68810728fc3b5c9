use crate::GuestResult;
use zkhost_emulator::State;

pub fn load(state: &mut State, addr: u32) -> GuestResult<u64> {
    state.load(addr)
}

pub fn store(state: &mut State, addr: u32, value: u64) -> GuestResult<()> {
    state.store(addr, value)
}

/// Stores `values` at consecutive addresses starting at `base`.
pub fn store_slice(state: &mut State, base: u32, values: &[u64]) -> GuestResult<()> {
    for (offset, value) in values.iter().enumerate() {
        state.store(base + offset as u32, *value)?;
    }
    Ok(())
}
