// review_gate/src/pipeline/mod.rs

//! The `Pipeline<TData, Err>` step runner: construction, handler registration and execution.

pub mod definition;
pub mod execution;
pub mod hooks;

pub use definition::Pipeline;
