use thiserror::Error;

/// Errors that can occur while loading or starting tasks.
///
/// A task that runs and exits non-zero is not an error; it is reported as a
/// `CompletionEvent`.
#[derive(Debug, Error)]
pub enum TaskError {
  #[error("failed to read task file '{path}'")]
  Io {
    path: String,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to parse task file '{path}'")]
  Parse {
    path: String,
    #[source]
    source: serde_json::Error,
  },

  #[error("task '{0}' is not registered")]
  UnknownTask(String),

  #[error("task '{task}' depends on unknown task '{dependency}'")]
  UnknownDependency { task: String, dependency: String },

  #[error("dependency cycle detected at task '{0}'")]
  DependencyCycle(String),
}
