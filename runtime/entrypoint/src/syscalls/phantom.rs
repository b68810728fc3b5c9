use crate::GuestResult;
use zkhost_emulator::State;

/// Calls the designated phantom function `name`, implemented by `f`.
///
/// Nothing `f` does is traced. Inside it only loads, nested phantom calls
/// and plain computation are allowed; any other primitive terminates the run.
pub fn phantom<R, F>(state: &mut State, name: &str, f: F) -> GuestResult<R>
where
    F: FnOnce(&mut State) -> GuestResult<R>,
{
    state.call_phantom(name, f)
}
