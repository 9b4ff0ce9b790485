//! Show the active configuration.

use vbatch_common::{config_file_path, AppConfig};

pub fn run(config: &AppConfig, init: bool) -> anyhow::Result<()> {
    let path = config_file_path();

    if init {
        if path.exists() {
            println!("Config already exists at {}", path.display());
        } else {
            AppConfig::default()
                .save_to(&path)
                .map_err(|e| anyhow::anyhow!("Failed to write {}: {e}", path.display()))?;
            println!("Wrote default config to {}", path.display());
        }
        return Ok(());
    }

    let source = if path.exists() {
        path.display().to_string()
    } else {
        format!("defaults (no file at {})", path.display())
    };
    println!("Config: {source}");
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}
