//! Trellis - workflow templating and AI action runner
//!
//! Main entry point for the Trellis CLI.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_appender::non_blocking::WorkerGuard;

mod backend;
mod commands;

use commands::{config, fields, render, run, validate};

// ─────────────────────────────────────────────────────────────────────────────
// CLI Structure
// ─────────────────────────────────────────────────────────────────────────────

/// Trellis - workflow templating and AI action runner
#[derive(Parser)]
#[command(name = "trellis")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output as JSON (for scripting)
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check a workflow file's structure and template references
    Validate(validate::ValidateArgs),

    /// List the context fields available to an entity's workflows
    Fields(fields::FieldsArgs),

    /// Render a template against a JSON context
    Render(render::RenderArgs),

    /// Execute a workflow file with the configured LLM backend
    Run(run::RunArgs),

    /// Configuration management
    Config(config::ConfigArgs),
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let loaded = trellis_config::load_config(None)?;
    let _guard = init_tracing(cli.verbose, loaded.config.json_file_logging());

    for warning in &loaded.warnings {
        tracing::warn!("{}", warning);
    }

    let ctx = commands::Context {
        json_output: cli.json,
        verbose: cli.verbose,
        config: loaded,
    };

    match cli.command {
        Commands::Validate(args) => validate::run(args, &ctx).await,
        Commands::Fields(args) => fields::run(args, &ctx).await,
        Commands::Render(args) => render::run(args, &ctx).await,
        Commands::Run(args) => run::run(args, &ctx).await,
        Commands::Config(args) => config::run(args, &ctx).await,
    }
}

/// Console (human-readable, stderr) plus an optional rotating JSON file.
///
/// The returned guard flushes the file writer on drop and must outlive `main`'s work.
fn init_tracing(verbose: bool, json_file: bool) -> Option<WorkerGuard> {
    use tracing_subscriber::prelude::*;

    let filter = if verbose {
        "trellis=debug,trellis_workflow=debug,trellis_llm=debug,trellis_config=debug,trellis_template=debug,info"
    } else {
        "trellis=info,trellis_workflow=info,trellis_llm=info,warn"
    };

    let console = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr)
        .with_filter(tracing_subscriber::EnvFilter::new(filter));

    let (file, guard) = if json_file {
        let file_appender =
            tracing_appender::rolling::daily(trellis_config::log_dir(), "trellis.log");
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        let layer = tracing_subscriber::fmt::layer()
            .json()
            .with_writer(non_blocking)
            .with_filter(tracing_subscriber::EnvFilter::new(
                "trellis=trace,trellis_workflow=trace,trellis_llm=trace,trellis_config=trace,trellis_template=trace,info",
            ));
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry().with(console).with(file).init();

    guard
}
