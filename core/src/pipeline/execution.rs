// review_gate/src/pipeline/execution.rs

//! `Pipeline::run()`: executes steps and their handlers in order.

use crate::core::context::Handler;
use crate::core::context_data::ContextData;
use crate::core::control::{RunOutcome, StepControl};
use crate::core::step::StepDef;
use crate::error::ReviewError;
use crate::pipeline::definition::Pipeline;
use tracing::{event, instrument, span, Instrument, Level};

/// What a single step ended with.
enum StepOutcome {
  Ran,
  Skipped,
  Stopped,
}

impl<TData, Err> Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<ReviewError> + Send + Sync + 'static,
{
  /// Runs every step against `ctx_data`.
  ///
  /// Returns `Stopped` as soon as a handler asks to stop and the first handler
  /// error otherwise. A non-optional step with no handlers fails the run with
  /// `ReviewError::HandlerMissing` converted into `Err`.
  #[instrument(
    name = "Pipeline::run",
    skip_all,
    fields(
      context_type = %std::any::type_name::<TData>(),
      num_steps = self.steps.len(),
    ),
    err(Display)
  )]
  pub async fn run(&self, ctx_data: ContextData<TData>) -> Result<RunOutcome, Err> {
    event!(Level::DEBUG, "Pipeline execution starting.");

    for (step_idx, step_def) in self.steps.iter().enumerate() {
      // Entered guards are not Send, so the step body is instrumented instead.
      let step_span = span!(
        Level::DEBUG,
        "pipeline_step",
        step_name = step_def.name.as_str(),
        step_index = step_idx,
        optional = step_def.optional
      );
      let outcome = self.run_step(step_def, &ctx_data).instrument(step_span).await?;
      if let StepOutcome::Stopped = outcome {
        return Ok(RunOutcome::Stopped);
      }
    }

    event!(Level::DEBUG, "Pipeline execution completed.");
    Ok(RunOutcome::Completed)
  }

  async fn run_step(&self, step_def: &StepDef<TData>, ctx_data: &ContextData<TData>) -> Result<StepOutcome, Err> {
    let step_name = step_def.name.as_str();

    if let Some(skip_if) = &step_def.skip_if {
      if skip_if(ctx_data.clone()) {
        event!(Level::DEBUG, "Step skipped by its skip condition.");
        return Ok(StepOutcome::Skipped);
      }
    }

    let on_handlers = self.on.get(step_name).filter(|v| !v.is_empty());
    let after_handlers = self.after.get(step_name).filter(|v| !v.is_empty());

    if on_handlers.is_none() && after_handlers.is_none() {
      if step_def.optional {
        event!(Level::DEBUG, "Optional step has no handlers, skipping.");
        return Ok(StepOutcome::Skipped);
      }
      event!(Level::ERROR, "Non-optional step has no handlers.");
      return Err(Err::from(ReviewError::HandlerMissing {
        step_name: step_def.name.clone(),
      }));
    }

    for (phase, handlers) in [("on", on_handlers), ("after", after_handlers)] {
      let Some(handlers) = handlers else { continue };
      if run_phase(phase, handlers, ctx_data).await? == StepControl::Stop {
        event!(Level::DEBUG, phase, "Pipeline stopped by a handler.");
        return Ok(StepOutcome::Stopped);
      }
    }

    Ok(StepOutcome::Ran)
  }
}

async fn run_phase<TData, Err>(
  phase: &'static str,
  handlers: &[Handler<TData, Err>],
  ctx_data: &ContextData<TData>,
) -> Result<StepControl, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + Send + Sync + 'static,
{
  for (handler_idx, handler_fn) in handlers.iter().enumerate() {
    match handler_fn(ctx_data.clone()).await {
      Ok(StepControl::Continue) => {}
      Ok(StepControl::Stop) => return Ok(StepControl::Stop),
      Err(e) => {
        event!(Level::ERROR, phase, handler_index = handler_idx, error = %e, "Step handler failed.");
        return Err(e);
      }
    }
  }
  Ok(StepControl::Continue)
}
