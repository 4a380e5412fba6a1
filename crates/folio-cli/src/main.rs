//! `folio` — command-line front end for a Folio writing project.
//!
//! # Usage
//!
//! ```text
//! folio --project ~/novel init
//! folio --project ~/novel narrative create --kind Chapter "Chapter one"
//! folio world create --kind 4 Alice --set Age=30
//! folio connection add --from-kind narrative --from-id 1 --to-kind world --to-id 1
//! ```
//!
//! The project directory comes from `--project`, else from `project` in
//! `folio.toml` (or `FOLIO_PROJECT`). Results are printed as JSON on stdout;
//! logs go to stderr and follow `RUST_LOG`.

mod command;
mod config;

use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use command::Command;
use config::CliConfig;
use folio_project::Session;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Organise a writing project's narrative and world")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "folio.toml")]
  config: PathBuf,

  /// Project directory; overrides the config file.
  #[arg(short, long)]
  project: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let cfg = CliConfig::load(&cli.config)?;
  let root = cfg.project_root(cli.project.as_deref());

  let mut session = Session::new();
  if let Some(root) = root {
    let opened = match cli.command {
      Command::Init => session.create_project(&root, cfg.layout.clone()).await,
      _ => session.open_project(&root, cfg.layout.clone()).await,
    };
    opened.with_context(|| format!("failed to open project at {}", root.display()))?;
  }

  let project = session
    .project()
    .context("pass --project or set `project` in the config file")?;
  let output = command::run(project, cli.command).await?;

  if let Some(value) = output {
    let text = serde_json::to_string_pretty(&value).context("failed to format output")?;
    println!("{text}");
  }

  session.close_project();
  Ok(())
}
