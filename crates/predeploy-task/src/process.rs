//! Process-backed task registry.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::process::Command;
use tracing::{debug, error, info};

use crate::bus::{CompletionBus, CompletionSubscription};
use crate::error::TaskError;
use crate::registry::TaskRegistry;
use crate::types::{CompletionEvent, TaskDescriptor};

/// Exit code reported when the shell itself could not be started.
const SPAWN_FAILURE_EXIT_CODE: i32 = 127;

/// A task as declared in a task file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskDef {
  pub label: String,
  /// Shell command line.
  pub command: String,
  /// Extra arguments appended to the command line, quoted.
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub args: Vec<String>,
  /// Working directory. Defaults to the scope.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub cwd: Option<PathBuf>,
  /// Project root the task belongs to. Defaults to the task file's directory.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub scope: Option<PathBuf>,
  /// Labels of tasks that must succeed before this one starts, in order.
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub depends_on: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct TaskFile {
  #[serde(default)]
  tasks: Vec<TaskDef>,
}

#[derive(Debug, Clone)]
struct RegisteredTask {
  descriptor: TaskDescriptor,
  def: TaskDef,
  cwd: PathBuf,
}

/// Runs shell tasks declared in a JSON task file.
///
/// ```json
/// {
///   "tasks": [
///     { "label": "func: extensions install", "command": "dotnet build" },
///     { "label": "test", "command": "cargo test", "depends_on": ["func: extensions install"] }
///   ]
/// }
/// ```
///
/// Executing a task first runs its dependencies, depth first, each as its own
/// process. Every finished process publishes one `CompletionEvent`. The chain
/// stops at the first process that does not exit with `0`; when that process
/// is a dependency, the executed task is then reported as ended with the
/// same exit code without running. Every execution therefore ends with an
/// event for the executed task.
pub struct ProcessTaskRegistry {
  tasks: Arc<Vec<RegisteredTask>>,
  bus: CompletionBus,
}

impl ProcessTaskRegistry {
  /// Build a registry from task definitions.
  ///
  /// Relative scopes and working directories are resolved against `base_dir`,
  /// which is also the scope of tasks that do not declare one.
  pub fn new(defs: Vec<TaskDef>, base_dir: impl AsRef<Path>) -> Self {
    let base_dir = base_dir.as_ref();
    let tasks = defs
      .into_iter()
      .map(|def| {
        let scope = match &def.scope {
          Some(scope) => base_dir.join(scope),
          None => base_dir.to_path_buf(),
        };
        let cwd = match &def.cwd {
          Some(cwd) => scope.join(cwd),
          None => scope.clone(),
        };
        RegisteredTask {
          descriptor: TaskDescriptor::new(def.label.clone(), Some(scope)),
          def,
          cwd,
        }
      })
      .collect();

    Self {
      tasks: Arc::new(tasks),
      bus: CompletionBus::new(),
    }
  }

  /// Load a task file.
  pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, TaskError> {
    let path = path.as_ref();
    let content = tokio::fs::read_to_string(path)
      .await
      .map_err(|source| TaskError::Io {
        path: path.display().to_string(),
        source,
      })?;
    let file: TaskFile = serde_json::from_str(&content).map_err(|source| TaskError::Parse {
      path: path.display().to_string(),
      source,
    })?;

    // Scopes are compared against absolute deploy paths.
    let base_dir = std::path::absolute(path)
      .ok()
      .and_then(|p| p.parent().map(Path::to_path_buf))
      .unwrap_or_else(|| PathBuf::from("."));
    debug!(path = %path.display(), tasks = file.tasks.len(), "loaded task file");

    Ok(Self::new(file.tasks, base_dir))
  }

  /// The bus events are published on.
  pub fn bus(&self) -> &CompletionBus {
    &self.bus
  }

  /// Order in which `root` and its dependencies run.
  fn run_plan(&self, root: usize) -> Result<Vec<usize>, TaskError> {
    let mut plan = Vec::new();
    let mut visiting = HashSet::new();
    self.visit(root, &mut visiting, &mut plan)?;
    Ok(plan)
  }

  fn visit(
    &self,
    index: usize,
    visiting: &mut HashSet<usize>,
    plan: &mut Vec<usize>,
  ) -> Result<(), TaskError> {
    if plan.contains(&index) {
      return Ok(());
    }
    let task = &self.tasks[index];
    if !visiting.insert(index) {
      return Err(TaskError::DependencyCycle(task.def.label.clone()));
    }

    for dependency in &task.def.depends_on {
      let dep_index = self
        .tasks
        .iter()
        .position(|t| t.def.label.eq_ignore_ascii_case(dependency))
        .ok_or_else(|| TaskError::UnknownDependency {
          task: task.def.label.clone(),
          dependency: dependency.clone(),
        })?;
      self.visit(dep_index, visiting, plan)?;
    }

    visiting.remove(&index);
    plan.push(index);
    Ok(())
  }
}

#[async_trait]
impl TaskRegistry for ProcessTaskRegistry {
  async fn list_tasks(&self) -> Result<Vec<TaskDescriptor>, TaskError> {
    Ok(self.tasks.iter().map(|t| t.descriptor.clone()).collect())
  }

  async fn execute_task(&self, task: &TaskDescriptor) -> Result<(), TaskError> {
    let root = self
      .tasks
      .iter()
      .position(|t| t.descriptor.id == task.id)
      .ok_or_else(|| TaskError::UnknownTask(task.name.clone()))?;
    let plan = self.run_plan(root)?;

    info!(task = %task.name, steps = plan.len(), "starting task");

    let tasks = self.tasks.clone();
    let bus = self.bus.clone();
    tokio::spawn(async move {
      for index in plan {
        let task = &tasks[index];
        let exit_code = run_process(task).await;
        bus.publish(CompletionEvent::new(task.descriptor.clone(), exit_code));

        if exit_code != Some(0) {
          if index != root {
            let executed = &tasks[root];
            info!(task = %executed.def.label, dependency = %task.def.label, "dependency failed, task not run");
            bus.publish(CompletionEvent::new(executed.descriptor.clone(), exit_code));
          }
          break;
        }
      }
    });

    Ok(())
  }

  fn on_task_process_end(&self) -> CompletionSubscription {
    self.bus.subscribe()
  }
}

async fn run_process(task: &RegisteredTask) -> Option<i32> {
  let line = shell_line(&task.def.command, &task.def.args);
  debug!(task = %task.def.label, command = %line, cwd = %task.cwd.display(), "spawning task process");

  let mut command = shell_command(&line);
  command
    .current_dir(&task.cwd)
    .stdin(Stdio::null())
    .kill_on_drop(true);

  match command.status().await {
    Ok(status) => {
      info!(task = %task.def.label, exit_code = ?status.code(), "task process ended");
      status.code()
    }
    Err(e) => {
      error!(task = %task.def.label, error = %e, "failed to spawn task process");
      Some(SPAWN_FAILURE_EXIT_CODE)
    }
  }
}

#[cfg(not(windows))]
fn shell_command(line: &str) -> Command {
  let mut command = Command::new("sh");
  command.arg("-c").arg(line);
  command
}

#[cfg(windows)]
fn shell_command(line: &str) -> Command {
  let mut command = Command::new("cmd");
  command.arg("/C").arg(line);
  command
}

/// Join a command and its arguments into one shell line.
fn shell_line(command: &str, args: &[String]) -> String {
  let mut line = command.to_string();
  for arg in args {
    line.push(' ');
    line.push_str(&quote(arg));
  }
  line
}

#[cfg(not(windows))]
fn quote(arg: &str) -> String {
  let plain = !arg.is_empty()
    && arg
      .chars()
      .all(|c| c.is_ascii_alphanumeric() || "-_./=:@%+,".contains(c));
  if plain {
    arg.to_string()
  } else {
    format!("'{}'", arg.replace('\'', r"'\''"))
  }
}

#[cfg(windows)]
fn quote(arg: &str) -> String {
  if !arg.is_empty() && !arg.contains([' ', '\t', '"']) {
    arg.to_string()
  } else {
    format!("\"{}\"", arg.replace('"', "\\\""))
  }
}
