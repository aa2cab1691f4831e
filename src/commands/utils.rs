use crate::testbed::TestbedConfig;
use crate::utils::config::SCHEMA_VERSION;
use anyhow::{Context, Result};

/// Print the built-in testbed configuration as TOML
pub fn print_default_config() -> Result<()> {
    let text = TestbedConfig::default()
        .to_toml()
        .context("Failed to render default config")?;
    print!("{}", text);
    Ok(())
}

/// Display version information
pub fn display_version() {
    println!("Netemu Studio v{}", env!("CARGO_PKG_VERSION"));
    println!("Report Schema: v{}", SCHEMA_VERSION);
    println!();
    println!("Network emulation testbed orchestration and function-time trace analysis.");
}
