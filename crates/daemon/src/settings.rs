// Agent settings
//
// Layering (later wins): settings file, DIAGMON__* environment, CLI flags.

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use diagmon_core::application::RuleRunner;
use diagmon_core::domain::CollectionRule;

use crate::cli::SharedOptions;

const DEFAULT_SETTINGS_PATH: &str = "~/.diagmon/settings.toml";
const ENV_PREFIX: &str = "DIAGMON";
const ENV_SEPARATOR: &str = "__";

const DEFAULT_URLS: &str = "https://localhost:52323";
const DEFAULT_METRIC_URLS: &str = "http://localhost:52325";
// Scrapers reach into the container through any interface
const CONTAINER_METRIC_URLS: &str = "http://*:52325";

pub const REDACTED: &str = ":REDACTED:";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorSettings {
    pub urls: String,
    pub metric_urls: String,
    pub metrics: bool,
    pub diagnostic_port: Option<String>,
    pub no_auth: bool,
    pub temp_api_key: bool,
    pub authentication: Option<AuthenticationSettings>,
    pub collection_rules: BTreeMap<String, CollectionRule>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticationSettings {
    pub api_key_hash: Option<String>,
    pub api_key_hash_type: Option<String>,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            urls: DEFAULT_URLS.to_string(),
            metric_urls: default_metric_urls(running_in_container()).to_string(),
            metrics: true,
            diagnostic_port: None,
            no_auth: false,
            temp_api_key: false,
            authentication: None,
            collection_rules: BTreeMap::new(),
        }
    }
}

impl MonitorSettings {
    /// Load settings for a command invocation
    ///
    /// An explicit `--config` file must exist; the default one is optional.
    pub fn load(options: &SharedOptions) -> Result<Self> {
        let (path, required) = match &options.config {
            Some(path) => (expand(path), true),
            None => (expand(Path::new(DEFAULT_SETTINGS_PATH)), false),
        };
        let environment = Environment::with_prefix(ENV_PREFIX).separator(ENV_SEPARATOR);

        let settings = Self::load_from(&path, required, environment)?;
        settings.validate()?;
        Ok(settings.with_overrides(options))
    }

    fn load_from(path: &Path, required: bool, environment: Environment) -> Result<Self> {
        Config::builder()
            .add_source(File::from(path).required(required))
            .add_source(environment)
            .build()
            .with_context(|| format!("Failed to read settings from {}", path.display()))?
            .try_deserialize()
            .context("Invalid settings")
    }

    pub fn validate(&self) -> Result<()> {
        RuleRunner::validate_rules(&self.collection_rules)?;
        Ok(())
    }

    /// Apply command-line flags on top of file and environment values
    pub fn with_overrides(mut self, options: &SharedOptions) -> Self {
        if let Some(urls) = &options.urls {
            self.urls = urls.clone();
        }
        if let Some(metric_urls) = &options.metric_urls {
            self.metric_urls = metric_urls.clone();
        }
        if let Some(metrics) = options.metrics {
            self.metrics = metrics;
        }
        if let Some(port) = &options.diagnostic_port {
            self.diagnostic_port = Some(port.clone());
        }
        self.no_auth |= options.no_auth;
        self.temp_api_key |= options.temp_api_key;
        self
    }

    /// Copy safe to print: secrets are masked
    pub fn redacted(&self) -> Self {
        let mut settings = self.clone();
        if let Some(auth) = settings.authentication.as_mut() {
            if auth.api_key_hash.is_some() {
                auth.api_key_hash = Some(REDACTED.to_string());
            }
        }
        settings
    }
}

fn expand(path: &Path) -> PathBuf {
    PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned())
}

fn default_metric_urls(in_container: bool) -> &'static str {
    if in_container {
        CONTAINER_METRIC_URLS
    } else {
        DEFAULT_METRIC_URLS
    }
}

fn running_in_container() -> bool {
    std::env::var("DOTNET_RUNNING_IN_CONTAINER").is_ok_and(|v| v.eq_ignore_ascii_case("true"))
        || Path::new("/.dockerenv").exists()
}

#[cfg(test)]
mod tests {
    use super::*;
    use diagmon_core::domain::ActionOptions;
    use std::collections::HashMap;

    fn write_settings(name: &str, content: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("diagmon-settings-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(format!("{}.toml", name));
        std::fs::write(&path, content).unwrap();
        path
    }

    fn env(vars: &[(&str, &str)]) -> Environment {
        let source: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Environment::with_prefix(ENV_PREFIX)
            .separator(ENV_SEPARATOR)
            .source(Some(source))
    }

    #[test]
    fn test_defaults_without_file() {
        let settings =
            MonitorSettings::load_from(Path::new("/no/such/settings.toml"), false, env(&[]))
                .unwrap();

        assert_eq!(settings.urls, DEFAULT_URLS);
        assert!(settings.metrics);
        assert!(settings.collection_rules.is_empty());
    }

    #[test]
    fn test_required_file_missing_fails() {
        let result =
            MonitorSettings::load_from(Path::new("/no/such/settings.toml"), true, env(&[]));

        assert!(result.is_err());
    }

    #[test]
    fn test_collection_rules_from_file() {
        let path = write_settings(
            "rules",
            r#"
[collection_rules.startup]
action_timeout_seconds = 30

[[collection_rules.startup.actions]]
type = "Execute"
settings = { path = "/bin/echo", arguments = "hello", ignore_exit_code = true }
"#,
        );

        let settings = MonitorSettings::load_from(&path, true, env(&[])).unwrap();

        let rule = &settings.collection_rules["startup"];
        assert_eq!(rule.action_timeout_seconds, Some(30));
        let ActionOptions::Execute(options) = &rule.actions[0];
        assert_eq!(options.path(), "/bin/echo");
        assert_eq!(options.arguments(), "hello");
        assert!(options.ignore_exit_code());
        settings.validate().unwrap();
    }

    #[test]
    fn test_environment_overrides_file() {
        let path = write_settings("env", "urls = \"https://file:1\"\nmetrics = true\n");

        let settings = MonitorSettings::load_from(
            &path,
            true,
            env(&[("DIAGMON__METRICS", "false"), ("DIAGMON__URLS", "https://env:2")]),
        )
        .unwrap();

        assert_eq!(settings.urls, "https://env:2");
        assert!(!settings.metrics);
    }

    #[test]
    fn test_cli_overrides_win() {
        let options = SharedOptions {
            urls: Some("https://cli:3".to_string()),
            metrics: Some(false),
            no_auth: true,
            ..Default::default()
        };

        let settings = MonitorSettings::default().with_overrides(&options);

        assert_eq!(settings.urls, "https://cli:3");
        assert!(!settings.metrics);
        assert!(settings.no_auth);
    }

    #[test]
    fn test_invalid_rule_rejected() {
        let path = write_settings(
            "invalid",
            r#"
[[collection_rules.broken.actions]]
type = "Execute"
settings = { path = "" }
"#,
        );

        let settings = MonitorSettings::load_from(&path, true, env(&[])).unwrap();

        let err = settings.validate().unwrap_err().to_string();
        assert!(err.contains("broken"), "unexpected error: {}", err);
    }

    #[test]
    fn test_redacted_masks_api_key_hash() {
        let settings = MonitorSettings {
            authentication: Some(AuthenticationSettings {
                api_key_hash: Some("ABCDEF".to_string()),
                api_key_hash_type: Some("SHA256".to_string()),
            }),
            ..Default::default()
        };

        let redacted = settings.redacted();

        let auth = redacted.authentication.unwrap();
        assert_eq!(auth.api_key_hash.as_deref(), Some(REDACTED));
        assert_eq!(auth.api_key_hash_type.as_deref(), Some("SHA256"));
        assert_eq!(
            settings.authentication.unwrap().api_key_hash.as_deref(),
            Some("ABCDEF")
        );
    }

    #[test]
    fn test_container_metric_urls() {
        assert_eq!(default_metric_urls(true), "http://*:52325");
        assert_eq!(default_metric_urls(false), "http://localhost:52325");
    }
}
