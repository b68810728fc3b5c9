//! Guest programs exercising the host primitives, runnable through the
//! `zkhost` binary.

pub mod batchinput;
pub mod binary_search;
pub mod context;
pub mod factors;
pub mod fibonacci;
pub mod phantom_search;

use zkhost_emulator::RuntimeConfig;

pub const PROGRAMS: &[&str] = &[
    "batchinput",
    "binary_search",
    "context",
    "factors",
    "fibonacci",
    "phantom_search",
];

/// Configuration a program runs with when none is given on the command line.
pub fn default_config(program: &str) -> RuntimeConfig {
    match program {
        "context" => context::config(),
        "phantom_search" => phantom_search::config(),
        _ => RuntimeConfig::default(),
    }
}
