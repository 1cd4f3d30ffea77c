//! The pre-deploy runner.

use std::path::Path;
use std::sync::Arc;

use predeploy_config::{ScmMode, SettingsStore, keys};
use predeploy_task::TaskRegistry;
use tracing::{debug, instrument, warn};

use crate::context::DeployContext;
use crate::error::PreDeployError;
use crate::launcher::run_task;
use crate::outcome::handle_outcome;
use crate::resolver::resolve_task;
use crate::result::TaskResult;
use crate::ui::{NoopProgress, OutputChannel, ProgressReporter, Prompter, TracingOutput};

/// Runs the configured pre-deploy task for a deploy target.
///
/// Holds the host collaborators. One runner can serve many deploys; every
/// call creates its own completion subscription.
pub struct PreDeployRunner {
  registry: Arc<dyn TaskRegistry>,
  settings: Arc<dyn SettingsStore>,
  prompter: Arc<dyn Prompter>,
  output: Arc<dyn OutputChannel>,
  progress: Arc<dyn ProgressReporter>,
}

impl PreDeployRunner {
  /// Create a runner that logs through `tracing` and shows no progress.
  pub fn new(
    registry: Arc<dyn TaskRegistry>,
    settings: Arc<dyn SettingsStore>,
    prompter: Arc<dyn Prompter>,
  ) -> Self {
    Self {
      registry,
      settings,
      prompter,
      output: Arc::new(TracingOutput),
      progress: Arc::new(NoopProgress),
    }
  }

  pub fn with_output(mut self, output: Arc<dyn OutputChannel>) -> Self {
    self.output = output;
    self
  }

  pub fn with_progress(mut self, progress: Arc<dyn ProgressReporter>) -> Self {
    self.progress = progress;
    self
  }

  /// Run the pre-deploy task and decide whether the deploy may proceed.
  ///
  /// Returns `Ok(())` to proceed. Fails with `TaskNotFound` when the
  /// configured task does not exist and with `UserCancelled` when the task
  /// failed and the operator did not choose to deploy anyway.
  pub async fn run_pre_deploy_task(
    &self,
    ctx: &mut DeployContext,
    deploy_path: &Path,
    scm_mode: ScmMode,
  ) -> Result<(), PreDeployError> {
    let result = self
      .try_run_pre_deploy_task(ctx, deploy_path, scm_mode)
      .await?;
    handle_outcome(self.prompter.as_ref(), ctx, &result).await
  }

  /// Run the pre-deploy task and report what happened without judging it.
  ///
  /// Task failure and a missing task are returned as data. Errors only come
  /// from the registry or the completion stream.
  #[instrument(
    name = "pre_deploy_task",
    skip(self, ctx),
    fields(deploy_path = %deploy_path.display(), scm_mode = %scm_mode)
  )]
  pub async fn try_run_pre_deploy_task(
    &self,
    ctx: &mut DeployContext,
    deploy_path: &Path,
    scm_mode: ScmMode,
  ) -> Result<TaskResult, PreDeployError> {
    let task_name = self
      .settings
      .get_config(keys::PRE_DEPLOY_TASK, deploy_path)
      .filter(|name| !name.trim().is_empty());
    ctx.pre_deploy_task = task_name.clone();

    let Some(task_name) = task_name else {
      debug!("no pre-deploy task configured");
      return Ok(TaskResult::not_configured());
    };

    if scm_mode.uses_server_build() {
      warn!(task = %task_name, "ignoring pre-deploy task, the server-side build runs it");
      self.output.append_log(&format!(
        "WARNING: Ignoring preDeployTask \"{}\" for non-zip deploy.",
        task_name
      ));
      return Ok(TaskResult::skipped(task_name));
    }

    let tasks = self.registry.list_tasks().await?;
    let Some(task) = resolve_task(&tasks, &task_name, deploy_path) else {
      debug!(task = %task_name, candidates = tasks.len(), "pre-deploy task not found");
      return Ok(TaskResult::not_found(task_name));
    };

    run_task(
      self.registry.as_ref(),
      self.progress.clone(),
      task,
      &task_name,
      deploy_path,
    )
    .await
  }
}
