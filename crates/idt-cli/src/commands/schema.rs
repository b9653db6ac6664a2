use idt_core::Report;
use schemars::schema_for;

use crate::cli::SchemaArgs;

/// Handle `idt schema`: print the JSON Schema of the `--format json` report.
pub fn handle(args: &SchemaArgs) -> anyhow::Result<()> {
    println!("{}", render(args.compact)?);
    Ok(())
}

fn render(compact: bool) -> anyhow::Result<String> {
    let schema = schema_for!(Report);
    let text = if compact {
        serde_json::to_string(&schema)?
    } else {
        serde_json::to_string_pretty(&schema)?
    };
    Ok(text)
}
