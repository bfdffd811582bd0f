use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use climada_kit_config::{KitConfig, MissingPrerequisite};
use climada_kit_runner::{ConsoleReporter, WorkflowRunner};
use climada_kit_workflow::{WorkflowSpec, catalog};

/// climada-kit - run the CLIMADA onboarding kit's example workflows
#[derive(Parser)]
#[command(name = "climada-kit")]
#[command(version, about, long_about = None)]
struct Cli {
  #[command(flatten)]
  overrides: Overrides,

  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
  /// Run every workflow (the default)
  Run,
  /// Print the workflows that would run, without running them
  List,
  /// Print the effective configuration as JSON
  Config,
}

// Settings layered over the config file.
#[derive(Args)]
struct Overrides {
  /// JSON configuration file
  #[arg(long, global = true)]
  config: Option<PathBuf>,

  /// Project root (default: current directory)
  #[arg(long, global = true)]
  project_root: Option<PathBuf>,

  /// Directory holding the workflow scripts
  #[arg(long, global = true)]
  workflows_dir: Option<PathBuf>,

  /// Interpreter used to launch each script
  #[arg(long, global = true)]
  interpreter: Option<String>,

  /// Per-workflow timeout in seconds
  #[arg(long, global = true, value_name = "SECS")]
  timeout: Option<u64>,

  /// Run every script found in the workflows directory instead of the catalog
  #[arg(long, global = true)]
  discover: bool,

  /// Run only the named workflow (repeatable)
  #[arg(long = "only", global = true, value_name = "NAME")]
  only: Vec<String>,

  /// Do not probe for the CLIMADA library before running
  #[arg(long, global = true)]
  no_prerequisite_check: bool,

  /// Run the workflows even if the CLIMADA probe fails
  #[arg(long, global = true)]
  continue_without_prerequisite: bool,
}

fn main() -> Result<ExitCode> {
  init_logging();
  let cli = Cli::parse();

  let config = load_config(&cli.overrides)?;

  match cli.command.unwrap_or(Commands::Run) {
    Commands::Run => run_workflows(config, &cli.overrides.only),
    Commands::List => list_workflows(config, &cli.overrides.only),
    Commands::Config => {
      println!("{}", serde_json::to_string_pretty(&config)?);
      Ok(ExitCode::SUCCESS)
    }
  }
}

/// Logging goes to stderr so it never mixes with the report on stdout.
fn init_logging() {
  let filter = EnvFilter::try_from_default_env()
    .unwrap_or_else(|_| EnvFilter::new("warn,climada_kit=info"));

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .with_target(false)
    .init();
}

/// Defaults, then the config file, then command-line flags.
fn load_config(overrides: &Overrides) -> Result<KitConfig> {
  let mut config = match &overrides.config {
    Some(path) => KitConfig::load(path)
      .with_context(|| format!("failed to load config: {}", path.display()))?,
    None => KitConfig::default(),
  };

  if let Some(root) = &overrides.project_root {
    config.project.root = root.clone();
  }
  if let Some(dir) = &overrides.workflows_dir {
    config.runner.workflows_dir = dir.clone();
  }
  if let Some(interpreter) = &overrides.interpreter {
    config.runner.interpreter = interpreter.clone();
  }
  if let Some(timeout) = overrides.timeout {
    config.runner.timeout_secs = timeout;
  }
  if overrides.discover {
    config.runner.discover = true;
  }
  if overrides.no_prerequisite_check {
    config.runner.prerequisite = None;
  }
  if overrides.continue_without_prerequisite {
    config.runner.on_missing_prerequisite = MissingPrerequisite::Run;
  }

  config.validate().context("invalid configuration")?;
  Ok(config)
}

async fn resolve_workflows(config: &KitConfig, only: &[String]) -> Result<Vec<WorkflowSpec>> {
  let dir = config.workflows_dir();

  let specs = if let Some(defs) = &config.workflows {
    catalog::from_defs(defs, &dir)
  } else if config.runner.discover {
    catalog::discover(&dir, &config.runner.script_extension)
      .await
      .context("failed to discover workflows")?
  } else {
    catalog::builtin(&dir)
  };

  catalog::select(specs, only).context("failed to select workflows")
}

fn run_workflows(config: KitConfig, only: &[String]) -> Result<ExitCode> {
  let rt = tokio::runtime::Runtime::new()?;
  rt.block_on(async { run_workflows_async(config, only).await })
}

async fn run_workflows_async(config: KitConfig, only: &[String]) -> Result<ExitCode> {
  let specs = resolve_workflows(&config, only).await?;

  let runner =
    WorkflowRunner::new(config.runner, config.project).context("failed to create runner")?;
  runner.prepare().context("failed to prepare project")?;

  // Ctrl-C stops the current workflow and skips the rest; the summary still prints.
  let cancel = CancellationToken::new();
  let interrupt = cancel.clone();
  tokio::spawn(async move {
    if tokio::signal::ctrl_c().await.is_ok() {
      warn!("interrupted by user");
      interrupt.cancel();
    }
  });

  let mut reporter = ConsoleReporter::stdout();
  let report = runner.run(&specs, &mut reporter, &cancel).await;

  info!(exit_code = report.exit_code(), "runner finished");
  Ok(ExitCode::from(report.exit_code()))
}

fn list_workflows(config: KitConfig, only: &[String]) -> Result<ExitCode> {
  let rt = tokio::runtime::Runtime::new()?;
  let specs = rt.block_on(resolve_workflows(&config, only))?;

  if specs.is_empty() {
    println!("No workflow scripts found in {}", config.workflows_dir().display());
    return Ok(ExitCode::SUCCESS);
  }

  for spec in &specs {
    let marker = if spec.path.is_file() { " " } else { "!" };
    println!("{} {:>2}. {:<32} {}", marker, spec.order, spec.name, spec.path.display());
  }

  Ok(ExitCode::SUCCESS)
}
