use zkhost_runtime::syscalls::{load, read_public_input, store_slice};
use zkhost_runtime::{entrypoint, GuestResult, State};

pub const ARRAY: [u64; 6] = [0, 1, 2, 3, 4, 5];
const BASE: u32 = 0x100;

fn bsearch(state: &mut State, v: u64) -> GuestResult<i64> {
    let (mut lo, mut hi) = (0i64, ARRAY.len() as i64 - 1);
    while lo <= hi {
        let mid = (lo + hi) / 2;
        let x = load(state, BASE + mid as u32)?;
        match x.cmp(&v) {
            std::cmp::Ordering::Equal => return Ok(mid),
            std::cmp::Ordering::Less => lo = mid + 1,
            std::cmp::Ordering::Greater => hi = mid - 1,
        }
    }
    Ok(-1)
}

/// Index of the public input in `ARRAY`, or -1.
pub fn zkmain(state: &mut State) -> GuestResult<i64> {
    store_slice(state, BASE, &ARRAY)?;
    let v = read_public_input(state)?;
    bsearch(state, v)
}

entrypoint!(BinarySearch, i64, zkmain);
