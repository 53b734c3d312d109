use crate::config::NavigatorConfig;
use anyhow::Result;

/// Print the effective configuration as TOML
pub fn config_command(config: &NavigatorConfig) -> Result<()> {
    print!("{}", config.to_toml()?);
    Ok(())
}
