use zkhost_emulator::context::ContextSchema;
use zkhost_emulator::RuntimeConfig;
use zkhost_runtime::syscalls::{wasm_read_context, wasm_write_context};
use zkhost_runtime::{entrypoint, GuestResult, State};

/// Two slots in, two slots out, at every position.
pub fn config() -> RuntimeConfig {
    RuntimeConfig::new(ContextSchema::uniform(2, 2), vec![])
}

/// Writes the sum of both incoming slots to both outgoing slots.
pub fn zkmain(state: &mut State) -> GuestResult<u64> {
    let a = wasm_read_context(state)?;
    let b = wasm_read_context(state)?;
    let sum = a.wrapping_add(b);
    wasm_write_context(state, sum)?;
    wasm_write_context(state, sum)?;
    Ok(sum)
}

entrypoint!(Context, u64, zkmain);
