//! Config command - configuration inspection.

use anyhow::Result;
use clap::{Args, Subcommand};
use serde_json::json;

use super::{Context, print_json};

/// Arguments for the config command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show the merged configuration and where it came from
    Show,

    /// Show the user configuration file path
    Path,
}

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => cmd_show(ctx),
        ConfigCommand::Path => cmd_path(),
    }
}

fn cmd_show(ctx: &Context) -> Result<()> {
    let loaded = &ctx.config;
    let config = &loaded.config;

    if ctx.json_output {
        let sources: Vec<_> = loaded
            .sources
            .iter()
            .map(|s| json!({ "path": s.path.display().to_string(), "loaded": s.loaded }))
            .collect();
        return print_json(&json!({
            "sources": sources,
            "warnings": loaded.warnings,
            "config": config,
        }));
    }

    println!("# Trellis Configuration\n");

    let sources = loaded.loaded_from();
    if sources.is_empty() {
        println!("No config files loaded (using defaults)\n");
    } else {
        println!("Config files:");
        for source in &sources {
            println!("  {}", source.display());
        }
        println!();
    }

    match config.llm {
        Some(ref llm) => {
            let backend = llm.backend.map_or("(unset)", |b| b.display_name());
            let model = llm.model.as_deref().unwrap_or("(unset)");
            let key_status = match trellis_config::resolve_llm(config) {
                Ok(resolved) => match resolved.api_key_source {
                    Some(source) => format!("key: {}", source),
                    None => "key: not required".to_string(),
                },
                Err(e) => format!("unusable: {}", e),
            };
            println!("LLM:\n  {} / {}  {}\n", backend, model, key_status);
        }
        None => println!("No LLM configured\n"),
    }

    println!("Template max depth: {}", config.template_max_depth());
    println!("JSON log file: {}\n", config.json_file_logging());

    if !loaded.warnings.is_empty() {
        println!("Warnings:");
        for w in &loaded.warnings {
            println!("  ⚠ {}", w);
        }
        println!();
    }

    let raw = config.to_toml()?;
    if !raw.trim().is_empty() {
        println!("---\nRaw config:\n");
        println!("{}", raw);
    }
    Ok(())
}

fn cmd_path() -> Result<()> {
    match trellis_config::user_config_path() {
        Some(path) => println!("{}", path.display()),
        None => println!("No user config directory available on this platform"),
    }
    Ok(())
}
