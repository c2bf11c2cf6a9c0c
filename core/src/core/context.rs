// review_gate/src/core/context.rs

//! The `Handler<TData, Err>` type used for pipeline step handlers.

use crate::core::context_data::ContextData;
use crate::core::control::StepControl;
use std::future::Future;
use std::pin::Pin;

/// A step handler: an async function over a clone of the run's `ContextData<TData>`.
///
/// Handlers must:
/// 1. Take what they need from the context and drop the lock guard.
/// 2. Await their collaborators without holding any guard.
/// 3. Write results back under a fresh guard.
/// 4. Return `StepControl::Continue` to proceed or `StepControl::Stop` to halt.
pub type Handler<TData, Err> = Box<
  dyn Fn(ContextData<TData>) -> Pin<Box<dyn Future<Output = Result<StepControl, Err>> + Send>>
    + Send
    + Sync,
>;
