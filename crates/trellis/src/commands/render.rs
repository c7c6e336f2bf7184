//! Render command - interpolate a single template.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use serde_json::{Value, json};
use trellis_template::{TemplateEngine, extract_variables};

use super::{Context, print_json, read_json};

/// Arguments for the render command.
#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Template text, e.g. "Hi {{contact.first_name}}"
    pub template: String,

    /// JSON file holding the context to render against
    #[arg(long)]
    pub context: Option<PathBuf>,

    /// Override the configured re-expansion depth
    #[arg(long)]
    pub max_depth: Option<usize>,
}

/// Run the render command.
pub async fn run(args: RenderArgs, ctx: &Context) -> Result<()> {
    let context = match args.context {
        Some(ref path) => read_json(path)?,
        None => Value::Object(Default::default()),
    };

    let depth = args
        .max_depth
        .unwrap_or_else(|| ctx.config.config.template_max_depth());
    let engine = TemplateEngine::with_max_depth(depth);
    let rendered = engine.render(&args.template, &context);

    if ctx.json_output {
        return print_json(&json!({
            "template": args.template,
            "variables": extract_variables(&args.template),
            "rendered": rendered,
        }));
    }

    println!("{}", rendered);
    Ok(())
}
