// Command-line surface

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "diagmon")]
#[command(about = "Diagnostics monitoring agent running collection rule actions", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run collection rules and keep monitoring until Ctrl+C
    Collect(SharedOptions),

    /// Inspect the effective configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the effective configuration as JSON
    Show {
        #[command(flatten)]
        options: SharedOptions,

        /// Unredacted output can show sensitive information
        #[arg(long, value_enum, default_value_t = ConfigLevel::Redacted)]
        level: ConfigLevel,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigLevel {
    Redacted,
    Full,
}

/// Options shared by `collect` and `config show`
///
/// Anything given here overrides the settings file and environment.
#[derive(Args, Debug, Clone, Default)]
pub struct SharedOptions {
    /// Bindings for the HTTP api, separated by ';'
    #[arg(short = 'u', long)]
    pub urls: Option<String>,

    /// Bindings for the metrics endpoint, separated by ';'
    #[arg(long)]
    pub metric_urls: Option<String>,

    /// Enable publishing of metrics
    #[arg(short = 'm', long)]
    pub metrics: Option<bool>,

    /// Diagnostic port the runtime connects to
    #[arg(long)]
    pub diagnostic_port: Option<String>,

    /// Disable authentication
    #[arg(long)]
    pub no_auth: bool,

    /// Generate a temporary api key for this run
    #[arg(long = "temp-apikey")]
    pub temp_api_key: bool,

    /// Settings file (defaults to ~/.diagmon/settings.toml)
    #[arg(long, env = "DIAGMON_CONFIG")]
    pub config: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_collect_options() {
        let cli = Cli::try_parse_from([
            "diagmon",
            "collect",
            "-u",
            "https://localhost:6000",
            "-m",
            "false",
            "--no-auth",
        ])
        .unwrap();

        let Commands::Collect(options) = cli.command else {
            panic!("expected collect");
        };
        assert_eq!(options.urls.as_deref(), Some("https://localhost:6000"));
        assert_eq!(options.metrics, Some(false));
        assert!(options.no_auth);
        assert!(!options.temp_api_key);
    }

    #[test]
    fn test_config_show_defaults_to_redacted() {
        let cli = Cli::try_parse_from(["diagmon", "config", "show"]).unwrap();

        let Commands::Config {
            command: ConfigCommands::Show { level, .. },
        } = cli.command
        else {
            panic!("expected config show");
        };
        assert_eq!(level, ConfigLevel::Redacted);
    }

    #[test]
    fn test_config_show_full_level() {
        let cli =
            Cli::try_parse_from(["diagmon", "config", "show", "--level", "full"]).unwrap();

        let Commands::Config {
            command: ConfigCommands::Show { level, .. },
        } = cli.command
        else {
            panic!("expected config show");
        };
        assert_eq!(level, ConfigLevel::Full);
    }
}
