//! Predeploy Task
//!
//! The task side of the pre-deploy flow: what a runnable task looks like,
//! the completion events emitted when a task process ends, and the
//! `TaskRegistry` port that enumerates and executes tasks.
//!
//! # Architecture
//!
//! ```text
//! TaskRegistry (port)
//! ├── list_tasks() -> Vec<TaskDescriptor>
//! ├── execute_task(&TaskDescriptor)        returns once started
//! └── on_task_process_end() -> CompletionSubscription
//!
//! CompletionBus
//! └── broadcast channel; one CompletionEvent per finished task process,
//!     dependencies included, and always one for the executed task
//! ```
//!
//! `ProcessTaskRegistry` is the bundled implementation; it runs shell
//! commands declared in a JSON task file.

mod bus;
mod error;
mod process;
mod registry;
mod types;

pub use bus::{CompletionBus, CompletionSubscription};
pub use error::TaskError;
pub use process::{ProcessTaskRegistry, TaskDef};
pub use registry::TaskRegistry;
pub use types::{CompletionEvent, TaskDescriptor, TaskId};
