//! Process-level helpers shared by the binaries.

pub mod shutdown;

pub use shutdown::shutdown_signal;
