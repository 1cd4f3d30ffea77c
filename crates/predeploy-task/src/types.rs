use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Opaque task identity.
///
/// Two descriptors refer to the same task exactly when their ids are equal;
/// names and scopes may repeat across tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(uuid::Uuid);

impl TaskId {
  pub fn new() -> Self {
    Self(uuid::Uuid::new_v4())
  }
}

impl Default for TaskId {
  fn default() -> Self {
    Self::new()
  }
}

impl fmt::Display for TaskId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "task-{}", self.0)
  }
}

/// A runnable task as enumerated by a registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDescriptor {
  pub id: TaskId,
  /// Name as registered, possibly carrying a `"<source>: "` prefix.
  pub name: String,
  /// Project or workspace root the task belongs to. `None` for global tasks.
  pub scope: Option<PathBuf>,
}

impl TaskDescriptor {
  pub fn new(name: impl Into<String>, scope: Option<PathBuf>) -> Self {
    Self {
      id: TaskId::new(),
      name: name.into(),
      scope,
    }
  }

  /// True when the task's scope is `path` or one of its ancestors.
  pub fn is_scope_of(&self, path: &Path) -> bool {
    self
      .scope
      .as_deref()
      .is_some_and(|scope| predeploy_path::path_contains(scope, path))
  }
}

/// Emitted when a task process ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionEvent {
  pub task: TaskDescriptor,
  /// `None` when the process ended without an exit code (e.g. killed by a signal).
  pub exit_code: Option<i32>,
}

impl CompletionEvent {
  pub fn new(task: TaskDescriptor, exit_code: Option<i32>) -> Self {
    Self { task, exit_code }
  }

  pub fn is_failure(&self) -> bool {
    self.exit_code.is_some_and(|code| code != 0)
  }
}
