use crate::output::{line_count, print_json, print_table};
use std::path::Path;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = super::load_config(root)?;
    let scan = super::scan_root(root, &config)?;

    if json {
        return print_json(&scan);
    }

    println!(
        "{} files in {} folders under {}",
        scan.inventory.file_names.len(),
        scan.inventory.folder_names.len(),
        root.display()
    );
    if scan.blocks.is_empty() {
        println!("No blocks found.");
        return Ok(());
    }

    println!();
    let rows = scan
        .blocks
        .values()
        .map(|b| vec![b.name.clone(), b.source_file.clone(), line_count(&b.content)])
        .collect();
    print_table(&["BLOCK", "FILE", "LINES"], rows);
    Ok(())
}
