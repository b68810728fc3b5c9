use zkhost_runtime::syscalls::{read_private_input, read_public_input, require, wasm_output};
use zkhost_runtime::{entrypoint, GuestResult, State};

/// Shows knowledge of a non-trivial factorization of the public input
/// without revealing the factors.
pub fn zkmain(state: &mut State) -> GuestResult<u64> {
    let n = read_public_input(state)?;
    let p = read_private_input(state)?;
    let q = read_private_input(state)?;

    require(state, p > 1 && q > 1)?;
    require(state, p.checked_mul(q) == Some(n))?;
    wasm_output(state, n)?;
    Ok(n)
}

entrypoint!(Factors, u64, zkmain);
