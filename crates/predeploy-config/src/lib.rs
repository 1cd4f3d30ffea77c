//! Predeploy Config
//!
//! Settings consumed by the pre-deploy runner and the source-control mode
//! flag that decides whether a pre-deploy task runs locally at all.
//!
//! Settings are resolved per project path: a value set for a project folder
//! overrides the global value for every deploy target inside that folder.

mod error;
pub mod keys;
mod scm;
mod settings;

pub use error::ConfigError;
pub use scm::ScmMode;
pub use settings::{ScopedSettings, SettingsStore};
