//! Guest side of the host runtime: the primitive table a guest program calls
//! and the `entrypoint!` macro that turns a `zkmain` function into a guest.

pub mod io;
pub mod syscalls;

pub use zkhost_emulator::guest::ENTRY;
pub use zkhost_emulator::phantom::FunctionDesc;
pub use zkhost_emulator::{ExecutionError, Guest, State};

/// Result of every guest-facing primitive.
pub type GuestResult<T> = Result<T, ExecutionError>;

/// Declares a guest type `$guest` whose entry point is `$path`.
///
/// Functions listed after the entry point end up in the guest's function
/// table; phantom patterns are matched against them.
///
/// ```ignore
/// fn zkmain(state: &mut State) -> GuestResult<u64> { .. }
/// entrypoint!(Search, u64, zkmain, ["search"]);
/// ```
#[macro_export]
macro_rules! entrypoint {
    ($guest:ident, $output:ty, $path:path) => {
        $crate::entrypoint!($guest, $output, $path, []);
    };
    ($guest:ident, $output:ty, $path:path, [$($function:literal),* $(,)?]) => {
        pub struct $guest;

        impl $crate::Guest for $guest {
            type Output = $output;

            fn name(&self) -> &str {
                stringify!($guest)
            }

            fn functions(&self) -> Vec<$crate::FunctionDesc> {
                vec![
                    $crate::FunctionDesc::new($crate::ENTRY),
                    $($crate::FunctionDesc::new($function),)*
                ]
            }

            fn zkmain(
                &self,
                state: &mut $crate::State,
            ) -> Result<$output, $crate::ExecutionError> {
                $path(state)
            }
        }
    };
}
