//! Host runtime for guest programs whose execution is later proven.
//!
//! The guest reaches the host only through the primitives on [`state::State`]:
//! two input tapes, `require`, a positional continuation context, guest
//! memory and phantom (untraced) regions. A finished run is sealed into a
//! [`segment::Segment`]; a rejected run never is.

pub mod config;
pub mod constraint;
pub mod context;
pub mod errors;
pub mod guest;
pub mod memory;
pub mod phantom;
pub mod segment;
pub mod state;
pub mod tape;
pub mod trace;
pub mod utils;


pub use config::RuntimeConfig;
pub use errors::ExecutionError;
pub use guest::{ExecutionResult, Guest, Runtime};
pub use state::{ExecutionArg, State};
pub use tape::Visibility;
