//! Validate command - structural and template checks for a workflow file.

use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::Args;
use serde_json::json;
use trellis_template::available_fields;
use trellis_workflow::WorkflowFile;

use super::{Context, print_json};

/// Arguments for the validate command.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Workflow TOML file
    pub file: PathBuf,
}

/// Run the validate command.
pub async fn run(args: ValidateArgs, ctx: &Context) -> Result<()> {
    let definition = WorkflowFile::from_file(&args.file)?.workflow;

    let structural = definition.validate().err().map(|e| e.to_string());
    let checks = definition.check_templates();
    let valid = structural.is_none() && checks.iter().all(|c| c.result.valid);

    if ctx.json_output {
        print_json(&json!({
            "workflow": definition.name,
            "trigger": definition.trigger,
            "valid": valid,
            "error": structural,
            "steps": checks,
        }))?;
    } else {
        println!(
            "Workflow '{}' (trigger: {}, {} step(s))",
            definition.name,
            definition.trigger,
            definition.steps.len()
        );
        if let Some(ref err) = structural {
            println!("  ✗ {}", err);
        }
        for check in &checks {
            if check.result.valid {
                if ctx.verbose {
                    println!("  ✓ {}", check.step_id);
                }
                continue;
            }
            println!("  ✗ {}: unknown fields", check.step_id);
            for field in &check.result.missing_fields {
                println!("      {{{{{}}}}}", field);
            }
        }
        if valid {
            println!("✓ valid");
        } else if checks.iter().any(|c| !c.result.valid) && ctx.verbose {
            let available = available_fields(definition.trigger.entity_type());
            println!("\nAvailable fields: {}", available.join(", "));
        }
    }

    if !valid {
        bail!("workflow '{}' is invalid", definition.name);
    }
    Ok(())
}
