//! Setting keys read by the pre-deploy runner.

/// Section all predeploy settings live under.
pub const SECTION: &str = "predeploy";

/// Name of the task to run before deploying.
pub const PRE_DEPLOY_TASK: &str = "preDeployTask";

/// Fully qualified key, as shown to the operator.
pub fn qualified(key: &str) -> String {
  format!("{}.{}", SECTION, key)
}
