use crate::output::{line_count, print_json, print_table};
use anyhow::Context;
use std::path::Path;
use tagsmith_core::response::ResponseParser;
use tagsmith_core::types::{MutationInstruction, UpdateStrategy};

pub fn run(
    root: &Path,
    response: &Path,
    mode: Option<UpdateStrategy>,
    json: bool,
) -> anyhow::Result<()> {
    let config = super::load_config(root)?;
    let mode = mode.unwrap_or(config.mode);
    let text = super::read_input(response)?;
    let scan = super::scan_root(root, &config)?;

    let instructions = ResponseParser::new(mode, &scan.inventory)
        .allow_overwrite(config.allow_overwrite)
        .parse(&text)
        .with_context(|| format!("failed to parse {}", response.display()))?;

    if json {
        let value = serde_json::json!({
            "mode": mode,
            "instructions": instructions,
        });
        return print_json(&value);
    }

    if instructions.is_empty() {
        println!("No edits found (mode: {mode}).");
        super::hint_other_mode(&text, mode);
        return Ok(());
    }
    print_instructions(&instructions);
    Ok(())
}

pub(crate) fn print_instructions(instructions: &[MutationInstruction]) {
    let rows = instructions
        .iter()
        .map(|inst| {
            let body = match inst {
                MutationInstruction::FullFileReplacement { new_content, .. }
                | MutationInstruction::BlockReplacement { new_content, .. } => new_content,
                MutationInstruction::NewFileCreation { content, .. } => content,
            };
            vec![
                inst.kind().to_string(),
                inst.target().to_string(),
                line_count(body),
            ]
        })
        .collect();
    print_table(&["KIND", "TARGET", "LINES"], rows);
}
