mod context;
mod input;
mod memory;
mod output;
mod phantom;
mod require;

pub use context::*;
pub use input::*;
pub use memory::*;
pub use output::*;
pub use phantom::*;
pub use require::*;

/// These codes MUST match `HostOp` in the emulator's trace. The test below
/// checks that they stay consistent.
///
/// Reads one word from an input tape.
pub const WASM_INPUT: u32 = 0x00_00_00_01;

/// Publishes one word.
pub const WASM_OUTPUT: u32 = 0x00_00_00_02;

/// Checks a guest condition.
pub const REQUIRE: u32 = 0x00_00_00_03;

/// Reads the next context slot.
pub const READ_CONTEXT: u32 = 0x00_00_00_04;

/// Writes the next context slot.
pub const WRITE_CONTEXT: u32 = 0x00_00_00_05;

pub const MEMORY_LOAD: u32 = 0x00_00_00_06;

pub const MEMORY_STORE: u32 = 0x00_00_00_07;

/// Prints a debug value on the host.
pub const LOG: u32 = 0x00_00_00_08;
