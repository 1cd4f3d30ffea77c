//! Integration tests for ProcessTaskRegistry running real shell tasks.

#![cfg(unix)]

use std::path::Path;
use std::time::Duration;

use predeploy_task::{CompletionSubscription, ProcessTaskRegistry, TaskError, TaskRegistry};

const WAIT: Duration = Duration::from_secs(10);

fn write_task_file(dir: &Path, content: &str) -> std::path::PathBuf {
  let path = dir.join("tasks.json");
  std::fs::write(&path, content).expect("failed to write task file");
  path
}

async fn next_event(subscription: &mut CompletionSubscription) -> predeploy_task::CompletionEvent {
  tokio::time::timeout(WAIT, subscription.next())
    .await
    .expect("timed out waiting for completion event")
    .expect("completion stream closed")
}

#[tokio::test]
async fn test_list_tasks_from_file() {
  let dir = tempfile::tempdir().unwrap();
  let path = write_task_file(
    dir.path(),
    r#"{ "tasks": [
      { "label": "func: extensions install", "command": "true" },
      { "label": "test", "command": "true", "scope": "api" }
    ] }"#,
  );

  let registry = ProcessTaskRegistry::from_file(&path).await.unwrap();
  let tasks = registry.list_tasks().await.unwrap();

  assert_eq!(tasks.len(), 2);
  assert_eq!(tasks[0].name, "func: extensions install");
  assert_eq!(tasks[0].scope.as_deref(), Some(dir.path()));
  assert_eq!(tasks[1].scope.as_deref(), Some(dir.path().join("api").as_path()));
}

#[tokio::test]
async fn test_missing_task_file() {
  let dir = tempfile::tempdir().unwrap();
  let result = ProcessTaskRegistry::from_file(dir.path().join("tasks.json")).await;
  assert!(matches!(result, Err(TaskError::Io { .. })));
}

#[tokio::test]
async fn test_invalid_task_file() {
  let dir = tempfile::tempdir().unwrap();
  let path = write_task_file(dir.path(), "{ \"tasks\": [ { \"label\": 1 } ] }");
  let result = ProcessTaskRegistry::from_file(&path).await;
  assert!(matches!(result, Err(TaskError::Parse { .. })));
}

#[tokio::test]
async fn test_execute_reports_exit_code() {
  let dir = tempfile::tempdir().unwrap();
  let path = write_task_file(
    dir.path(),
    r#"{ "tasks": [
      { "label": "ok", "command": "exit 0" },
      { "label": "broken", "command": "exit 3" }
    ] }"#,
  );
  let registry = ProcessTaskRegistry::from_file(&path).await.unwrap();
  let tasks = registry.list_tasks().await.unwrap();

  let mut subscription = registry.on_task_process_end();
  registry.execute_task(&tasks[0]).await.unwrap();
  let event = next_event(&mut subscription).await;
  assert_eq!(event.task.id, tasks[0].id);
  assert_eq!(event.exit_code, Some(0));

  registry.execute_task(&tasks[1]).await.unwrap();
  let event = next_event(&mut subscription).await;
  assert_eq!(event.task.id, tasks[1].id);
  assert_eq!(event.exit_code, Some(3));
}

#[tokio::test]
async fn test_task_runs_in_its_cwd_with_args() {
  let dir = tempfile::tempdir().unwrap();
  std::fs::create_dir(dir.path().join("out")).unwrap();
  let path = write_task_file(
    dir.path(),
    r#"{ "tasks": [
      { "label": "write", "command": "touch", "args": ["marker file"], "cwd": "out" }
    ] }"#,
  );
  let registry = ProcessTaskRegistry::from_file(&path).await.unwrap();
  let tasks = registry.list_tasks().await.unwrap();

  let mut subscription = registry.on_task_process_end();
  registry.execute_task(&tasks[0]).await.unwrap();
  let event = next_event(&mut subscription).await;

  assert_eq!(event.exit_code, Some(0));
  assert!(dir.path().join("out").join("marker file").exists());
}

#[tokio::test]
async fn test_dependencies_run_first() {
  let dir = tempfile::tempdir().unwrap();
  let path = write_task_file(
    dir.path(),
    r#"{ "tasks": [
      { "label": "build", "command": "exit 0", "depends_on": ["restore"] },
      { "label": "restore", "command": "exit 0" }
    ] }"#,
  );
  let registry = ProcessTaskRegistry::from_file(&path).await.unwrap();
  let tasks = registry.list_tasks().await.unwrap();

  let mut subscription = registry.on_task_process_end();
  registry.execute_task(&tasks[0]).await.unwrap();

  assert_eq!(next_event(&mut subscription).await.task.name, "restore");
  assert_eq!(next_event(&mut subscription).await.task.name, "build");
}

#[tokio::test]
async fn test_failing_dependency_stops_chain() {
  let dir = tempfile::tempdir().unwrap();
  let path = write_task_file(
    dir.path(),
    r#"{ "tasks": [
      { "label": "build", "command": "touch built", "depends_on": ["lint"] },
      { "label": "lint", "command": "exit 2" }
    ] }"#,
  );
  let registry = ProcessTaskRegistry::from_file(&path).await.unwrap();
  let tasks = registry.list_tasks().await.unwrap();

  let mut subscription = registry.on_task_process_end();
  registry.execute_task(&tasks[0]).await.unwrap();

  let event = next_event(&mut subscription).await;
  assert_eq!(event.task.name, "lint");
  assert_eq!(event.exit_code, Some(2));

  let event = next_event(&mut subscription).await;
  assert_eq!(event.task.id, tasks[0].id);
  assert_eq!(event.exit_code, Some(2));
  assert!(!dir.path().join("built").exists());

  let more = tokio::time::timeout(Duration::from_millis(300), subscription.next()).await;
  assert!(more.is_err(), "no further events after the chain stops");
}

#[tokio::test]
async fn test_killed_dependency_still_reports_task() {
  let dir = tempfile::tempdir().unwrap();
  let path = write_task_file(
    dir.path(),
    r#"{ "tasks": [
      { "label": "build", "command": "touch built", "depends_on": ["restore"] },
      { "label": "restore", "command": "kill -9 $$" }
    ] }"#,
  );
  let registry = ProcessTaskRegistry::from_file(&path).await.unwrap();
  let tasks = registry.list_tasks().await.unwrap();

  let mut subscription = registry.on_task_process_end();
  registry.execute_task(&tasks[0]).await.unwrap();

  let event = next_event(&mut subscription).await;
  assert_eq!(event.task.name, "restore");
  assert_eq!(event.exit_code, None);

  let event = next_event(&mut subscription).await;
  assert_eq!(event.task.id, tasks[0].id);
  assert_eq!(event.exit_code, None);
  assert!(!dir.path().join("built").exists());
}

#[tokio::test]
async fn test_execute_unknown_task() {
  let registry = ProcessTaskRegistry::new(vec![], "/proj");
  let stranger = predeploy_task::TaskDescriptor::new("build", None);
  let result = registry.execute_task(&stranger).await;
  assert!(matches!(result, Err(TaskError::UnknownTask(name)) if name == "build"));
}
