// `diagmon config show`

use anyhow::{Context, Result};

use crate::cli::{ConfigLevel, SharedOptions};
use crate::settings::MonitorSettings;

pub fn run(options: SharedOptions, level: ConfigLevel) -> Result<()> {
    let settings = MonitorSettings::load(&options)?;
    println!("{}", render(&settings, level)?);
    Ok(())
}

fn render(settings: &MonitorSettings, level: ConfigLevel) -> Result<String> {
    let shown = match level {
        ConfigLevel::Redacted => settings.redacted(),
        ConfigLevel::Full => settings.clone(),
    };
    serde_json::to_string_pretty(&shown).context("Failed to serialize settings")
}
