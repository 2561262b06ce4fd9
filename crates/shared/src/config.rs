//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Defaults applied to ledgers that do not carry their own settings.
    #[serde(default)]
    pub settlement: SettlementConfig,
    /// Logging configuration.
    #[serde(default)]
    pub log: LogConfig,
}

/// Default settlement policy for a ledger.
#[derive(Debug, Clone, Deserialize)]
pub struct SettlementConfig {
    /// Currency code used when a ledger snapshot omits one.
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Number of fractional digits in one major currency unit.
    #[serde(default = "default_rounding_scale")]
    pub rounding_scale: u32,
    /// Whether the payer joins the equal split unless an expense says otherwise.
    #[serde(default = "default_include_payer_in_aa")]
    pub include_payer_in_aa: bool,
}

fn default_currency() -> String {
    "CNY".to_string()
}

fn default_rounding_scale() -> u32 {
    2
}

fn default_include_payer_in_aa() -> bool {
    true
}

impl Default for SettlementConfig {
    fn default() -> Self {
        Self {
            currency: default_currency(),
            rounding_scale: default_rounding_scale(),
            include_payer_in_aa: default_include_payer_in_aa(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub filter: String,
    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

fn default_log_filter() -> String {
    "tally=info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// Sources, lowest precedence first: `config/default`, `config/{RUN_MODE}`,
    /// then `TALLY__`-prefixed environment variables (`TALLY__SETTLEMENT__CURRENCY=USD`).
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(
                config::Environment::with_prefix("TALLY")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        config.try_deserialize()
    }
}
