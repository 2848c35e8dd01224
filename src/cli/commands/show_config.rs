use anyhow::Result;

use rail_concession::config::ConcessionConfig;

pub struct ConfigShowCommand;

impl ConfigShowCommand {
    pub fn print(&self, config: &ConcessionConfig) -> Result<()> {
        print!("{}", toml::to_string_pretty(config)?);
        Ok(())
    }
}
