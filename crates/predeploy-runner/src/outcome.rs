//! Outcome handling: turn a `TaskResult` into proceed or stop.

use predeploy_config::keys;
use tracing::{info, warn};

use crate::context::{DeployContext, FailureResponse};
use crate::error::PreDeployError;
use crate::result::{TaskOutcome, TaskResult};
use crate::ui::{FailureAction, Prompter};

pub(crate) async fn handle_outcome(
  prompter: &dyn Prompter,
  ctx: &mut DeployContext,
  result: &TaskResult,
) -> Result<(), PreDeployError> {
  let task_name = result.task_name.as_deref().unwrap_or_default();

  match result.classify() {
    TaskOutcome::NotFound => Err(PreDeployError::TaskNotFound {
      task_name: task_name.to_string(),
      setting: keys::qualified(keys::PRE_DEPLOY_TASK),
    }),
    TaskOutcome::Failed { exit_code } => {
      warn!(task = %task_name, exit_code, "pre-deploy task failed");
      resolve_failure(prompter, ctx, task_name).await
    }
    TaskOutcome::NotConfigured | TaskOutcome::Succeeded | TaskOutcome::Indeterminate => Ok(()),
  }
}

async fn resolve_failure(
  prompter: &dyn Prompter,
  ctx: &mut DeployContext,
  task_name: &str,
) -> Result<(), PreDeployError> {
  let message = format!(
    "Errors exist after running preDeployTask \"{}\". See task output for more info.",
    task_name
  );

  let choice = prompter
    .prompt_task_failure(&message, &FailureAction::ALL)
    .await;

  match choice {
    Some(FailureAction::DeployAnyway) => {
      ctx.pre_deploy_task_response = Some(FailureResponse::DeployAnyway);
      info!(task = %task_name, "deploying despite pre-deploy task failure");
      Ok(())
    }
    Some(FailureAction::OpenSettings) => {
      ctx.pre_deploy_task_response = Some(FailureResponse::OpenSettings);
      prompter
        .open_settings(&keys::qualified(keys::PRE_DEPLOY_TASK))
        .await;
      Err(PreDeployError::UserCancelled)
    }
    None => {
      ctx.pre_deploy_task_response = Some(FailureResponse::Cancel);
      Err(PreDeployError::UserCancelled)
    }
  }
}
