// review_gate/src/core/control.rs

//! Signals for controlling pipeline flow and the outcome of a pipeline run.

/// Returned by a step handler to say whether the run goes on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepControl {
  /// Continue with the remaining handlers of this step and the following steps.
  Continue,
  /// Halt the run. Nothing after this handler executes.
  ///
  /// Stopping is a normal outcome (an ineligible order, an already tracked case),
  /// not a failure.
  Stop,
}

/// Outcome of a full pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
  /// Every non-skipped step ran to completion.
  Completed,
  /// A handler returned `StepControl::Stop`.
  Stopped,
}
