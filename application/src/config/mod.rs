//! Application-level configuration.
//!
//! - [`ExecutionParams`]: process and probe timeouts

pub mod execution_params;

pub use execution_params::ExecutionParams;
