//! Predeploy Runner
//!
//! Runs a user-configured pre-deploy task before a deployment and decides
//! whether the deployment may proceed.
//!
//! # Architecture
//!
//! ```text
//! PreDeployRunner::run_pre_deploy_task(ctx, deploy_path, scm_mode)
//! │
//! ├── try_run_pre_deploy_task            failure is data (TaskResult)
//! │   ├── settings lookup               SettingsStore
//! │   ├── resolver::resolve_task        exact name, then prefix-stripped
//! │   └── launcher::run_task            subscribe, progress, execute
//! │       └── watcher::wait_for_task_end
//! │
//! └── outcome::handle_outcome           the only stage that returns errors
//!     └── Prompter                      Deploy Anyway / Open Settings
//! ```
//!
//! # Usage
//!
//! ```ignore
//! let runner = PreDeployRunner::new(registry, settings, prompter)
//!   .with_progress(progress);
//!
//! let mut ctx = DeployContext::default();
//! runner
//!   .run_pre_deploy_task(&mut ctx, Path::new("/work/api"), ScmMode::Zip)
//!   .await?;
//! ```

mod context;
mod error;
mod launcher;
mod outcome;
mod resolver;
mod result;
mod runner;
pub mod ui;
mod watcher;

pub use context::{DeployContext, FailureResponse};
pub use error::PreDeployError;
pub use resolver::{resolve_task, strip_source_prefix};
pub use result::{TaskOutcome, TaskResult};
pub use runner::PreDeployRunner;
pub use ui::{FailureAction, NoopProgress, OutputChannel, ProgressReporter, Prompter, TracingOutput};
