use anyhow::Context;
use std::path::Path;
use tagsmith_core::{config::Config, io, paths};

pub fn run(root: &Path) -> anyhow::Result<()> {
    println!("Initializing tagsmith in: {}", root.display());

    let config_path = paths::config_path(root);
    let config = if config_path.exists() {
        println!("  exists:  {}", paths::CONFIG_FILE);
        Config::load(root).context("failed to load config")?
    } else {
        let cfg = Config::default();
        cfg.save(root).context("failed to write config.yaml")?;
        println!("  created: {}", paths::CONFIG_FILE);
        cfg
    };

    let data_dir = config.data_dir(root);
    if data_dir.is_dir() {
        println!("  exists:  {}", config.data_folder);
    } else {
        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("failed to create {}", data_dir.display()))?;
        println!("  created: {}", config.data_folder);
    }

    if !Path::new(&config.data_folder).is_absolute() {
        io::ensure_gitignore_entry(root, &config.data_folder)
            .context("failed to update .gitignore")?;
    }

    println!("\nTag regions with '// block_begin <name>' ... '// block_end', then run 'tagsmith scan'.");
    Ok(())
}
