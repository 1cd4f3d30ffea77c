use serde::{Deserialize, Serialize};

/// What one pre-deploy attempt produced.
///
/// Built only through the constructors, each of which yields one terminal
/// shape: not configured (no name), not found, or completed with the exit
/// code of the task that ended the wait.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskResult {
  pub task_name: Option<String>,
  pub exit_code: Option<i32>,
  pub failed_to_find_task: bool,
}

/// Classification consumed by the outcome handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
  NotConfigured,
  NotFound,
  Succeeded,
  Failed { exit_code: i32 },
  /// A task is named but no exit code is known: skipped for a server-side
  /// build, or the process ended without one.
  Indeterminate,
}

impl TaskResult {
  pub fn not_configured() -> Self {
    Self::default()
  }

  /// Configured, but the build runs elsewhere.
  pub fn skipped(task_name: impl Into<String>) -> Self {
    Self {
      task_name: Some(task_name.into()),
      ..Self::default()
    }
  }

  pub fn not_found(task_name: impl Into<String>) -> Self {
    Self {
      task_name: Some(task_name.into()),
      exit_code: None,
      failed_to_find_task: true,
    }
  }

  pub fn completed(task_name: impl Into<String>, exit_code: Option<i32>) -> Self {
    Self {
      task_name: Some(task_name.into()),
      exit_code,
      failed_to_find_task: false,
    }
  }

  pub fn classify(&self) -> TaskOutcome {
    if self.failed_to_find_task {
      return TaskOutcome::NotFound;
    }
    match (self.task_name.as_ref(), self.exit_code) {
      (None, _) => TaskOutcome::NotConfigured,
      (Some(_), Some(0)) => TaskOutcome::Succeeded,
      (Some(_), Some(exit_code)) => TaskOutcome::Failed { exit_code },
      (Some(_), None) => TaskOutcome::Indeterminate,
    }
  }
}
