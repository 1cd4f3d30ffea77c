use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use predeploy_config::{ScmMode, ScopedSettings};
use predeploy_runner::{
  DeployContext, FailureAction, PreDeployError, PreDeployRunner, ProgressReporter, Prompter,
};
use predeploy_task::{ProcessTaskRegistry, TaskRegistry};

const EXIT_CANCELLED: u8 = 2;
const EXIT_INTERRUPTED: u8 = 130;

/// predeploy - run the configured pre-deploy task before a deploy
#[derive(Parser)]
#[command(name = "predeploy")]
#[command(version, about, long_about = None)]
struct Cli {
  /// Path to the data directory (default: ~/.predeploy)
  #[arg(long, global = true)]
  data_dir: Option<PathBuf>,

  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
  /// Run the pre-deploy task for a deploy target
  Run {
    /// Folder being deployed
    deploy_path: PathBuf,

    /// Task definitions file (default: <data-dir>/tasks.json)
    #[arg(long)]
    tasks: Option<PathBuf>,

    /// Settings file (default: <data-dir>/settings.json)
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Deployment source: none, localgit or github
    #[arg(long, default_value = "none")]
    scm_mode: String,

    /// Deploy anyway when the task fails instead of prompting
    #[arg(long)]
    yes: bool,
  },

  /// List the tasks in a task definitions file
  Tasks {
    /// Task definitions file (default: <data-dir>/tasks.json)
    #[arg(long)]
    tasks: Option<PathBuf>,
  },
}

fn main() -> ExitCode {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();

  match run(cli) {
    Ok(code) => code,
    Err(err) => {
      eprintln!("error: {:#}", err);
      ExitCode::FAILURE
    }
  }
}

fn run(cli: Cli) -> Result<ExitCode> {
  let data_dir = match cli.data_dir {
    Some(dir) => dir,
    None => dirs::home_dir()
      .context("could not determine home directory")?
      .join(".predeploy"),
  };

  let rt = tokio::runtime::Runtime::new()?;

  match cli.command {
    Some(Commands::Run {
      deploy_path,
      tasks,
      settings,
      scm_mode,
      yes,
    }) => {
      let tasks_file = tasks.unwrap_or_else(|| data_dir.join("tasks.json"));
      let settings_file = settings.unwrap_or_else(|| data_dir.join("settings.json"));
      rt.block_on(run_pre_deploy(
        deploy_path,
        tasks_file,
        settings_file,
        scm_mode,
        yes,
      ))
    }
    Some(Commands::Tasks { tasks }) => {
      let tasks_file = tasks.unwrap_or_else(|| data_dir.join("tasks.json"));
      rt.block_on(list_tasks(tasks_file))?;
      Ok(ExitCode::SUCCESS)
    }
    None => {
      println!("predeploy - use --help to see available commands");
      Ok(ExitCode::SUCCESS)
    }
  }
}

async fn run_pre_deploy(
  deploy_path: PathBuf,
  tasks_file: PathBuf,
  settings_file: PathBuf,
  scm_mode: String,
  yes: bool,
) -> Result<ExitCode> {
  let scm_mode: ScmMode = scm_mode.parse()?;
  let deploy_path = std::path::absolute(&deploy_path)
    .with_context(|| format!("invalid deploy path: {}", deploy_path.display()))?;

  let settings = ScopedSettings::load(&settings_file).context("failed to load settings")?;
  let registry = ProcessTaskRegistry::from_file(&tasks_file)
    .await
    .context("failed to load task definitions")?;

  let prompter = TerminalPrompter {
    settings_file,
    assume_yes: yes,
  };
  let runner = PreDeployRunner::new(Arc::new(registry), Arc::new(settings), Arc::new(prompter))
    .with_progress(Arc::new(SpinnerProgress::default()));

  let mut ctx = DeployContext::default();
  let result = tokio::select! {
    result = runner.run_pre_deploy_task(&mut ctx, &deploy_path, scm_mode) => result,
    _ = tokio::signal::ctrl_c() => {
      eprintln!("interrupted");
      return Ok(ExitCode::from(EXIT_INTERRUPTED));
    }
  };

  eprintln!("{}", serde_json::to_string(&ctx)?);

  match result {
    Ok(()) => {
      println!("pre-deploy task finished, continuing deploy");
      Ok(ExitCode::SUCCESS)
    }
    Err(err) if err.is_user_cancelled() => {
      eprintln!("{}", err);
      Ok(ExitCode::from(EXIT_CANCELLED))
    }
    Err(err @ PreDeployError::TaskNotFound { .. }) => Err(err.into()),
    Err(err) => Err(anyhow::Error::new(err).context("pre-deploy task failed")),
  }
}

async fn list_tasks(tasks_file: PathBuf) -> Result<()> {
  let registry = ProcessTaskRegistry::from_file(&tasks_file)
    .await
    .context("failed to load task definitions")?;

  for task in registry.list_tasks().await? {
    match &task.scope {
      Some(scope) => println!("{}\t{}", task.name, scope.display()),
      None => println!("{}", task.name),
    }
  }

  Ok(())
}

/// Asks on the terminal what to do about a failed task.
struct TerminalPrompter {
  settings_file: PathBuf,
  assume_yes: bool,
}

#[async_trait]
impl Prompter for TerminalPrompter {
  async fn prompt_task_failure(
    &self,
    message: &str,
    actions: &[FailureAction],
  ) -> Option<FailureAction> {
    if self.assume_yes {
      eprintln!("{}", message);
      return actions
        .iter()
        .copied()
        .find(|a| *a == FailureAction::DeployAnyway);
    }

    let message = message.to_string();
    let actions = actions.to_vec();
    let picked = tokio::task::spawn_blocking(move || {
      let items: Vec<&str> = actions.iter().map(|a| a.title()).collect();
      dialoguer::Select::new()
        .with_prompt(message)
        .items(&items)
        .default(0)
        .interact_opt()
        .map(|choice| choice.and_then(|idx| actions.get(idx).copied()))
    })
    .await;

    match picked {
      Ok(Ok(action)) => action,
      Ok(Err(err)) => {
        warn!(error = %err, "prompt failed, treating as dismissed");
        None
      }
      Err(err) => {
        warn!(error = %err, "prompt task failed, treating as dismissed");
        None
      }
    }
  }

  async fn open_settings(&self, setting_key: &str) {
    eprintln!(
      "edit \"{}\" in {}",
      setting_key,
      display_path(&self.settings_file)
    );
  }
}

fn display_path(path: &Path) -> String {
  std::path::absolute(path)
    .unwrap_or_else(|_| path.to_path_buf())
    .display()
    .to_string()
}

/// Terminal spinner shown while the task runs.
#[derive(Default)]
struct SpinnerProgress {
  bar: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter for SpinnerProgress {
  fn start(&self, title: &str) {
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
      bar.set_style(style);
    }
    bar.set_message(title.to_string());
    bar.enable_steady_tick(Duration::from_millis(100));

    if let Ok(mut slot) = self.bar.lock() {
      *slot = Some(bar);
    }
  }

  fn finish(&self, _title: &str) {
    let bar = self.bar.lock().ok().and_then(|mut slot| slot.take());
    if let Some(bar) = bar {
      bar.finish_and_clear();
    }
  }
}
