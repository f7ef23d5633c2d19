//! Application-level configuration.
//!
//! - [`ExecutionParams`]: deadlines for the oracle round-trips and tool calls

pub mod execution_params;

pub use execution_params::ExecutionParams;
