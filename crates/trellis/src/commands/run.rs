//! Run command - execute a workflow file.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use serde_json::Value;
use trellis_template::TemplateEngine;
use trellis_workflow::{ActionRegistry, WorkflowContext, WorkflowFile, WorkflowRunner};

use super::{Context, print_json, read_json};
use crate::backend::build_generator;

/// Arguments for the run command.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Workflow TOML file
    pub file: PathBuf,

    /// JSON file holding the full run context
    #[arg(long, conflicts_with = "entity")]
    pub context: Option<PathBuf>,

    /// JSON file holding the triggering record; the context is seeded from it
    #[arg(long)]
    pub entity: Option<PathBuf>,

    /// Organization ID recorded in a seeded context
    #[arg(long, default_value = "local")]
    pub org: String,

    /// Triggering user ID recorded in a seeded context
    #[arg(long)]
    pub user: Option<String>,
}

/// Run the run command.
pub async fn run(args: RunArgs, ctx: &Context) -> Result<()> {
    let definition = WorkflowFile::from_file(&args.file)?.workflow;

    let context = match (&args.context, &args.entity) {
        (Some(path), _) => WorkflowContext::from_value(read_json(path)?),
        (None, Some(path)) => {
            WorkflowContext::for_trigger(definition.trigger, read_json(path)?, &args.org, args.user)
        }
        (None, None) => WorkflowContext::for_trigger(
            definition.trigger,
            Value::Object(Default::default()),
            &args.org,
            args.user,
        ),
    };
    let engine = TemplateEngine::with_max_depth(ctx.config.config.template_max_depth());
    let context = context.with_engine(engine);

    let generator = build_generator(&ctx.config.config)?;
    let runner = WorkflowRunner::new(ActionRegistry::with_ai_actions(generator));

    let report = runner.run(&definition, context).await?;

    if ctx.json_output {
        println!("{}", serde_json::to_string(&report)?);
    } else {
        print_json(&report)?;
    }
    Ok(())
}
