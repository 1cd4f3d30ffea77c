use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use predeploy_path::{normalize, path_contains};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;
use crate::keys;

/// Read access to settings, resolved for a project path.
///
/// `key` is the short key (e.g. `preDeployTask`); implementations decide how
/// it is namespaced in storage.
pub trait SettingsStore: Send + Sync {
  fn get_config(&self, key: &str, scope_path: &Path) -> Option<String>;
}

/// Settings with a global table and per-folder overrides.
///
/// Stored keys are fully qualified (`predeploy.preDeployTask`). On disk:
///
/// ```json
/// {
///   "global": { "predeploy.preDeployTask": "build" },
///   "scopes": {
///     "/work/api": { "predeploy.preDeployTask": "func: extensions install" }
///   }
/// }
/// ```
///
/// A lookup uses the deepest scope that contains the requested path and has
/// the key, falling back to the global table. Non-string values are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScopedSettings {
  #[serde(default)]
  global: HashMap<String, serde_json::Value>,
  #[serde(default)]
  scopes: BTreeMap<String, HashMap<String, serde_json::Value>>,
}

impl ScopedSettings {
  pub fn new() -> Self {
    Self::default()
  }

  /// Load settings from a JSON file. A missing file yields empty settings.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    let content = match std::fs::read_to_string(path) {
      Ok(content) => content,
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
        debug!(path = %path.display(), "settings file not found, using defaults");
        return Ok(Self::default());
      }
      Err(source) => {
        return Err(ConfigError::Io {
          path: path.display().to_string(),
          source,
        });
      }
    };

    serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
      path: path.display().to_string(),
      source,
    })
  }

  /// Set a global value for a short key.
  pub fn set_global(&mut self, key: &str, value: impl Into<String>) -> &mut Self {
    self
      .global
      .insert(keys::qualified(key), serde_json::Value::String(value.into()));
    self
  }

  /// Set a value for a short key that applies to `scope` and everything below it.
  pub fn set_scoped(
    &mut self,
    scope: impl AsRef<Path>,
    key: &str,
    value: impl Into<String>,
  ) -> &mut Self {
    self
      .scopes
      .entry(scope.as_ref().display().to_string())
      .or_default()
      .insert(keys::qualified(key), serde_json::Value::String(value.into()));
    self
  }
}

impl SettingsStore for ScopedSettings {
  fn get_config(&self, key: &str, scope_path: &Path) -> Option<String> {
    let key = keys::qualified(key);

    let scoped = self
      .scopes
      .iter()
      .filter(|(scope, _)| path_contains(Path::new(scope), scope_path))
      .filter_map(|(scope, values)| as_string(values.get(&key)).map(|v| (scope, v)))
      .max_by_key(|(scope, _)| normalize(Path::new(scope)).len());

    match scoped {
      Some((scope, value)) => {
        debug!(key = %key, scope = %scope, "resolved scoped setting");
        Some(value)
      }
      None => as_string(self.global.get(&key)),
    }
  }
}

fn as_string(value: Option<&serde_json::Value>) -> Option<String> {
  value.and_then(|v| v.as_str()).map(str::to_string)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::keys::PRE_DEPLOY_TASK;
  use std::io::Write;

  #[test]
  fn test_global_value() {
    let mut settings = ScopedSettings::new();
    settings.set_global(PRE_DEPLOY_TASK, "build");

    assert_eq!(
      settings.get_config(PRE_DEPLOY_TASK, Path::new("/anywhere")),
      Some("build".to_string())
    );
  }

  #[test]
  fn test_deepest_scope_wins() {
    let mut settings = ScopedSettings::new();
    settings
      .set_global(PRE_DEPLOY_TASK, "global")
      .set_scoped("/work", PRE_DEPLOY_TASK, "work")
      .set_scoped("/work/api", PRE_DEPLOY_TASK, "api");

    assert_eq!(
      settings.get_config(PRE_DEPLOY_TASK, Path::new("/work/api/src")),
      Some("api".to_string())
    );
    assert_eq!(
      settings.get_config(PRE_DEPLOY_TASK, Path::new("/work/web")),
      Some("work".to_string())
    );
    assert_eq!(
      settings.get_config(PRE_DEPLOY_TASK, Path::new("/elsewhere")),
      Some("global".to_string())
    );
  }

  #[test]
  fn test_scope_does_not_match_sibling_prefix() {
    let mut settings = ScopedSettings::new();
    settings.set_scoped("/work/api", PRE_DEPLOY_TASK, "api");

    assert_eq!(settings.get_config(PRE_DEPLOY_TASK, Path::new("/work/api2")), None);
  }

  #[test]
  fn test_missing_key() {
    let settings = ScopedSettings::new();
    assert_eq!(settings.get_config(PRE_DEPLOY_TASK, Path::new("/work")), None);
  }

  #[test]
  fn test_non_string_values_are_ignored() {
    let settings: ScopedSettings =
      serde_json::from_str(r#"{ "global": { "predeploy.preDeployTask": 42 } }"#).unwrap();
    assert_eq!(settings.get_config(PRE_DEPLOY_TASK, Path::new("/work")), None);
  }

  #[test]
  fn test_load_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");
    let mut file = std::fs::File::create(&path).unwrap();
    write!(
      file,
      r#"{{ "scopes": {{ "/proj": {{ "predeploy.preDeployTask": "func: extensions install" }} }} }}"#
    )
    .unwrap();

    let settings = ScopedSettings::load(&path).unwrap();
    assert_eq!(
      settings.get_config(PRE_DEPLOY_TASK, Path::new("/proj/sub")),
      Some("func: extensions install".to_string())
    );
  }

  #[test]
  fn test_load_missing_file_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let settings = ScopedSettings::load(&dir.path().join("nope.json")).unwrap();
    assert_eq!(settings, ScopedSettings::default());
  }

  #[test]
  fn test_load_invalid_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");
    std::fs::write(&path, "{ not json").unwrap();

    let err = ScopedSettings::load(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
  }
}
