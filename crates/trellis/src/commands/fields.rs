//! Fields command - list template fields for an entity type.

use anyhow::Result;
use clap::Args;
use trellis_template::{EntityType, available_fields};

use super::{Context, print_json};

/// Arguments for the fields command.
#[derive(Args, Debug)]
pub struct FieldsArgs {
    /// Entity type: contact, task, opportunity, project
    pub entity: EntityType,
}

/// Run the fields command.
pub async fn run(args: FieldsArgs, ctx: &Context) -> Result<()> {
    let fields = available_fields(args.entity);

    if ctx.json_output {
        return print_json(&fields);
    }

    println!("Fields available to {} workflows:\n", args.entity);
    for field in &fields {
        println!("  {{{{{}}}}}", field);
    }
    Ok(())
}
