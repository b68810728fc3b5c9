use zkhost_runtime::io::read_bytes_from_u64;
use zkhost_runtime::syscalls::require;
use zkhost_runtime::{entrypoint, GuestResult, State};

pub fn zkmain(state: &mut State) -> GuestResult<i32> {
    let bytes = read_bytes_from_u64(state, 8, false)?;
    require(state, bytes[7] == 1)?;
    Ok(0)
}

entrypoint!(BatchInput, i32, zkmain);
