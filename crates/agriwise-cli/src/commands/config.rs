use anyhow::{Context, Result};

use agriwise_core::config::RootConfig;
use agriwise_infrastructure::ConfigService;

pub fn init(service: &ConfigService, force: bool) -> Result<()> {
    let written = service
        .write_default(force)
        .with_context(|| format!("Failed to write {}", service.path().display()))?;

    if written {
        println!("Wrote {}", service.path().display());
    } else {
        println!(
            "{} already exists (use --force to overwrite)",
            service.path().display()
        );
    }
    Ok(())
}

pub fn show(config: &RootConfig) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}
