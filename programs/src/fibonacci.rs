use zkhost_runtime::syscalls::{read_public_input, require, wasm_dbg, wasm_output};
use zkhost_runtime::{entrypoint, GuestResult, State};

// fib(93) is the largest that fits in a u64
pub const MAX_N: u64 = 93;

pub fn fibonacci(n: u64) -> u64 {
    let (mut a, mut b) = (0u64, 1u64);
    for _ in 0..n {
        (a, b) = (b, a.wrapping_add(b));
    }
    a
}

pub fn zkmain(state: &mut State) -> GuestResult<u64> {
    let n = read_public_input(state)?;
    require(state, n <= MAX_N)?;
    wasm_dbg(state, n)?;
    let value = fibonacci(n);
    wasm_output(state, value)?;
    Ok(value)
}

entrypoint!(Fibonacci, u64, zkmain);
