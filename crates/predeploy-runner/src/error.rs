//! Pre-deploy errors.

use predeploy_task::TaskError;

/// Errors that stop a deploy.
#[derive(Debug, thiserror::Error)]
pub enum PreDeployError {
  /// A task name is configured but no task matches it.
  #[error(
    "Did not find pre-deploy task \"{task_name}\". Change the \"{setting}\" setting or manually edit your task definitions."
  )]
  TaskNotFound { task_name: String, setting: String },

  /// The operator chose to stop the deploy.
  #[error("operation cancelled")]
  UserCancelled,

  /// The task registry failed to enumerate or start tasks.
  #[error("task registry error")]
  Registry(#[from] TaskError),

  /// The completion stream ended before the task reported back.
  #[error("task completion stream closed before the pre-deploy task finished")]
  CompletionStreamClosed,
}

impl PreDeployError {
  pub fn is_user_cancelled(&self) -> bool {
    matches!(self, PreDeployError::UserCancelled)
  }
}
