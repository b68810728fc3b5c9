use crate::GuestResult;
use zkhost_emulator::State;

/// Halts the run with `Violated` unless `cond` holds.
pub fn require(state: &mut State, cond: bool) -> GuestResult<()> {
    state.require(cond)
}
