//! Operator-facing ports: output log, progress notification, prompts.
//!
//! The runner never talks to a terminal or an editor directly. Hosts plug in
//! their own implementations; tests plug in recording fakes.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

/// Host output log.
pub trait OutputChannel: Send + Sync {
  fn append_log(&self, line: &str);
}

/// Output channel that forwards lines to `tracing`.
#[derive(Debug, Clone, Default)]
pub struct TracingOutput;

impl OutputChannel for TracingOutput {
  fn append_log(&self, line: &str) {
    info!(target: "predeploy::output", "{}", line);
  }
}

/// Blocking-style progress notification.
pub trait ProgressReporter: Send + Sync {
  fn start(&self, title: &str);
  fn finish(&self, title: &str);
}

/// Progress reporter that shows nothing.
#[derive(Debug, Clone, Default)]
pub struct NoopProgress;

impl ProgressReporter for NoopProgress {
  fn start(&self, _title: &str) {}

  fn finish(&self, _title: &str) {}
}

/// An open progress notification. Closed when dropped.
pub(crate) struct ProgressGuard {
  reporter: Arc<dyn ProgressReporter>,
  title: String,
}

impl ProgressGuard {
  pub(crate) fn start(reporter: Arc<dyn ProgressReporter>, title: String) -> Self {
    reporter.start(&title);
    Self { reporter, title }
  }
}

impl Drop for ProgressGuard {
  fn drop(&mut self) {
    self.reporter.finish(&self.title);
  }
}

/// Choices offered when the pre-deploy task fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureAction {
  DeployAnyway,
  OpenSettings,
}

impl FailureAction {
  /// Every action, in display order.
  pub const ALL: [FailureAction; 2] = [FailureAction::DeployAnyway, FailureAction::OpenSettings];

  pub fn title(self) -> &'static str {
    match self {
      FailureAction::DeployAnyway => "Deploy Anyway",
      FailureAction::OpenSettings => "Open Settings",
    }
  }
}

/// Modal prompts and the settings UI.
#[async_trait]
pub trait Prompter: Send + Sync {
  /// Show a modal error with the given actions. `None` means dismissed.
  async fn prompt_task_failure(
    &self,
    message: &str,
    actions: &[FailureAction],
  ) -> Option<FailureAction>;

  /// Open the settings UI, focused on `setting_key` where supported.
  async fn open_settings(&self, setting_key: &str);
}
