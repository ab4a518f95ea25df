//! CLI configuration

use std::{path::PathBuf, time::Duration};

use clap::{Args, Parser};

/// Log output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Compact, human-readable logs.
    Compact,

    /// Structured JSON logs.
    Json,
}

/// Logging settings.
#[derive(Debug, Args)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUST_LOG", default_value = "warn")]
    pub log_level: String,

    /// Log format (compact, json)
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

/// King Crab order optimizer configuration
#[derive(Debug, Parser)]
#[command(name = "kingcrab", about = "Find the cheapest way to buy a seafood boil order", long_about = None)]
pub struct Config {
    /// Order set to plan (`<fixtures>/orders/<ORDER>.yml`)
    #[arg(env = "KINGCRAB_ORDER", default_value = "family")]
    pub order: String,

    /// Fixtures directory
    #[arg(short, long, env = "KINGCRAB_FIXTURES", default_value = "./fixtures")]
    pub fixtures: PathBuf,

    /// Catalog set (`<fixtures>/catalogs/<CATALOG>.yml`)
    #[arg(short, long, env = "KINGCRAB_CATALOG", default_value = "boil")]
    pub catalog: String,

    /// Solver timeout in seconds (0 disables)
    #[arg(short, long, env = "KINGCRAB_TIMEOUT", default_value_t = 30_u64)]
    pub timeout: u64,

    /// Logging settings
    #[command(flatten)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }

    /// Solver deadline, `None` when disabled.
    pub fn solver_timeout(&self) -> Option<Duration> {
        (self.timeout > 0).then(|| Duration::from_secs(self.timeout))
    }
}
