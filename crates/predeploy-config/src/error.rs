use thiserror::Error;

/// Errors that can occur while loading settings.
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to read settings file '{path}'")]
  Io {
    path: String,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to parse settings file '{path}'")]
  Parse {
    path: String,
    #[source]
    source: serde_json::Error,
  },

  #[error("unknown source control mode '{0}', expected one of: None, LocalGit, GitHub")]
  UnknownScmMode(String),
}
