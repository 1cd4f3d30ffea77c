use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// How the deploy target receives source code.
///
/// With `LocalGit` and `GitHub` the server-side build pipeline owns the build,
/// so no pre-deploy task runs on this machine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScmMode {
  /// Plain package deploy. Serialized as `None` to match existing settings.
  #[default]
  #[serde(rename = "None")]
  Zip,
  LocalGit,
  GitHub,
}

impl ScmMode {
  /// True when a server-side build pipeline runs the build instead.
  pub fn uses_server_build(self) -> bool {
    matches!(self, ScmMode::LocalGit | ScmMode::GitHub)
  }

  pub fn as_str(self) -> &'static str {
    match self {
      ScmMode::Zip => "None",
      ScmMode::LocalGit => "LocalGit",
      ScmMode::GitHub => "GitHub",
    }
  }
}

impl fmt::Display for ScmMode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for ScmMode {
  type Err = ConfigError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "" | "none" | "zip" => Ok(ScmMode::Zip),
      "localgit" => Ok(ScmMode::LocalGit),
      "github" => Ok(ScmMode::GitHub),
      _ => Err(ConfigError::UnknownScmMode(s.to_string())),
    }
  }
}
