use serde::{Deserialize, Serialize};

/// How the operator answered a failed pre-deploy task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FailureResponse {
  DeployAnyway,
  OpenSettings,
  Cancel,
}

impl FailureResponse {
  pub fn as_str(self) -> &'static str {
    match self {
      FailureResponse::DeployAnyway => "deployAnyway",
      FailureResponse::OpenSettings => "openSettings",
      FailureResponse::Cancel => "cancel",
    }
  }
}

/// Per-deploy record of what the pre-deploy step saw and decided.
///
/// Created fresh for each deploy invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployContext {
  /// The configured task name, if any.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub pre_deploy_task: Option<String>,
  /// The operator's answer when the task failed.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub pre_deploy_task_response: Option<FailureResponse>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_response_names() {
    for response in [
      FailureResponse::DeployAnyway,
      FailureResponse::OpenSettings,
      FailureResponse::Cancel,
    ] {
      let json = serde_json::to_string(&response).unwrap();
      assert_eq!(json, format!("\"{}\"", response.as_str()));
    }
  }

  #[test]
  fn test_context_serializes_camel_case() {
    let ctx = DeployContext {
      pre_deploy_task: Some("build".to_string()),
      pre_deploy_task_response: Some(FailureResponse::DeployAnyway),
    };
    let value = serde_json::to_value(&ctx).unwrap();
    assert_eq!(value["preDeployTask"], "build");
    assert_eq!(value["preDeployTaskResponse"], "deployAnyway");
  }
}
