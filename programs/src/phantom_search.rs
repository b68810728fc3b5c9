//! Binary search done off the trace. The phantom `search` function finds the
//! index; the traced code only checks the element found there.

use zkhost_emulator::context::ContextSchema;
use zkhost_emulator::RuntimeConfig;
use zkhost_runtime::syscalls::{load, phantom, read_public_input, require, store_slice};
use zkhost_runtime::{entrypoint, GuestResult, State};

pub const ARRAY: [u64; 8] = [1, 3, 5, 8, 13, 21, 34, 55];
const BASE: u32 = 0x200;

pub fn config() -> RuntimeConfig {
    RuntimeConfig::new(ContextSchema::default(), vec!["^search$".to_string()])
}

// ARRAY.len() when v is absent
fn search(state: &mut State, v: u64) -> GuestResult<u64> {
    let (mut lo, mut hi) = (0u64, ARRAY.len() as u64);
    while lo < hi {
        let mid = (lo + hi) / 2;
        if load(state, BASE + mid as u32)? < v {
            lo = mid + 1;
        } else {
            hi = mid;
        }
    }
    if lo < ARRAY.len() as u64 && load(state, BASE + lo as u32)? == v {
        Ok(lo)
    } else {
        Ok(ARRAY.len() as u64)
    }
}

pub fn zkmain(state: &mut State) -> GuestResult<u64> {
    store_slice(state, BASE, &ARRAY)?;
    let v = read_public_input(state)?;
    let idx = phantom(state, "search", |s| search(s, v))?;

    require(state, idx < ARRAY.len() as u64)?;
    let found = load(state, BASE + idx as u32)?;
    require(state, found == v)?;
    Ok(idx)
}

entrypoint!(PhantomSearch, u64, zkmain, ["search"]);
