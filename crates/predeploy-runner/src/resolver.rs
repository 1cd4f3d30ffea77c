//! Task resolution: find the task a configured name refers to.

use std::path::Path;

use predeploy_task::TaskDescriptor;
use tracing::debug;

/// Find the task named `task_name` whose scope contains `deploy_path`.
///
/// Names compare case-insensitively. If nothing matches exactly, registered
/// names are compared again with any `"<source>: "` prefix removed, so a
/// setting of `extensions install` finds `func: extensions install`. The first
/// match in `tasks` order wins.
pub fn resolve_task<'a>(
  tasks: &'a [TaskDescriptor],
  task_name: &str,
  deploy_path: &Path,
) -> Option<&'a TaskDescriptor> {
  let in_scope = |task: &&TaskDescriptor| task.is_scope_of(deploy_path);

  if let Some(task) = tasks
    .iter()
    .filter(in_scope)
    .find(|task| names_equal(&task.name, task_name))
  {
    debug!(task = %task.name, "resolved task by exact name");
    return Some(task);
  }

  let task = tasks
    .iter()
    .filter(in_scope)
    .find(|task| names_equal(strip_source_prefix(&task.name), task_name));
  if let Some(task) = task {
    debug!(task = %task.name, "resolved task by name without source prefix");
  }
  task
}

/// Drop a leading `"<source>: "` segment.
///
/// The source is everything before the first colon and must be followed by a
/// space. Other names are returned unchanged, so `build:release` keeps its
/// colon.
pub fn strip_source_prefix(name: &str) -> &str {
  match name.split_once(':') {
    Some((source, rest)) if !source.is_empty() && rest.starts_with(' ') => rest.trim_start(),
    _ => name,
  }
}

fn names_equal(a: &str, b: &str) -> bool {
  a.to_lowercase() == b.to_lowercase()
}
