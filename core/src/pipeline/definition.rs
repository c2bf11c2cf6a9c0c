// review_gate/src/pipeline/definition.rs

//! Contains the `Pipeline<TData, Err>` struct and its structural methods.

use crate::core::context::Handler;
use crate::core::step::{SkipCondition, StepDef};
use crate::error::ReviewError;
use std::collections::HashMap;

/// An ordered list of named steps over a shared `ContextData<TData>`.
///
/// `Err` is the error type handlers return. It must be constructible from
/// `ReviewError` so configuration problems (a required step with no handler)
/// can be reported through the same channel.
pub struct Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<ReviewError> + Send + Sync + 'static,
{
  pub(crate) steps: Vec<StepDef<TData>>,
  pub(crate) on: HashMap<String, Vec<Handler<TData, Err>>>,
  pub(crate) after: HashMap<String, Vec<Handler<TData, Err>>>,
}

impl<TData, Err> Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<ReviewError> + Send + Sync + 'static,
{
  /// Creates a pipeline from `(name, optional, skip_if)` tuples.
  pub fn new(step_defs: &[(&str, bool, Option<SkipCondition<TData>>)]) -> Self {
    let steps = step_defs
      .iter()
      .map(|(name, optional, skip_if)| StepDef {
        name: (*name).to_string(),
        optional: *optional,
        skip_if: skip_if.clone(),
      })
      .collect();

    Self::from_steps(steps)
  }

  pub fn from_steps(steps: Vec<StepDef<TData>>) -> Self {
    Self {
      steps,
      on: HashMap::new(),
      after: HashMap::new(),
    }
  }

  /// Step names in execution order.
  pub fn step_names(&self) -> Vec<&str> {
    self.steps.iter().map(|s| s.name.as_str()).collect()
  }

  pub(crate) fn has_step(&self, step_name: &str) -> bool {
    self.steps.iter().any(|s| s.name == step_name)
  }

  /// Panics if the step is unknown. Registering a handler against a misspelled
  /// step is a wiring bug, not a runtime condition.
  pub(crate) fn ensure_step_exists(&self, step_name: &str) {
    if !self.has_step(step_name) {
      panic!(
        "review-gate setup error: Step '{}' not found in pipeline definition.",
        step_name
      );
    }
  }

  pub fn insert_after_step(&mut self, existing_step_name: &str, step: StepDef<TData>) -> Result<(), ReviewError> {
    let idx = self
      .steps
      .iter()
      .position(|s| s.name == existing_step_name)
      .ok_or_else(|| ReviewError::StepNotFound {
        step_name: existing_step_name.to_string(),
      })?;
    if self.has_step(&step.name) {
      return Err(ReviewError::Configuration(format!(
        "step '{}' already exists in pipeline definition",
        step.name
      )));
    }
    self.steps.insert(idx + 1, step);
    Ok(())
  }

  pub fn remove_step(&mut self, step_name: &str) {
    if let Some(idx) = self.steps.iter().position(|s| s.name == step_name) {
      self.steps.remove(idx);
      self.on.remove(step_name);
      self.after.remove(step_name);
    }
  }

  pub fn set_skip_condition(&mut self, step_name: &str, skip_if: Option<SkipCondition<TData>>) {
    self.ensure_step_exists(step_name);
    if let Some(step) = self.steps.iter_mut().find(|s| s.name == step_name) {
      step.skip_if = skip_if;
    }
  }
}
