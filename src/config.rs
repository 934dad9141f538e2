use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use tracing::level_filters::LevelFilter;

use crate::engine::{DEFAULT_FINAL_QUANTITY, DEFAULT_MAX_COMMANDS};
use crate::orderbook::DEFAULT_SEED;
use crate::types::{Quantity, Side};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookConfig {
    /// Which price direction ranks first ("ask" or "bid").
    pub side: Side,
    /// Seed for the treap priority generator.
    pub seed: u64,
    /// Order slots to pre-allocate.
    pub capacity: usize,
}

impl Default for BookConfig {
    fn default() -> Self {
        Self {
            side: Side::Ask,
            seed: DEFAULT_SEED,
            capacity: 1 << 16,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayConfig {
    /// Stop after this many non-blank command lines.
    pub max_commands: usize,
    /// Size of the market execution issued at end of input.
    pub final_quantity: Quantity,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            max_commands: DEFAULT_MAX_COMMANDS,
            final_quantity: DEFAULT_FINAL_QUANTITY,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Compact,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for LevelFilter {
    fn from(val: LogLevel) -> Self {
        match val {
            LogLevel::Trace => LevelFilter::TRACE,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    pub level: LogLevel,
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Warn,
            format: LogFormat::Compact,
        }
    }
}

/// Top-level application configuration.
///
/// Loaded with the following precedence (lowest to highest):
/// 1) Built-in defaults
/// 2) Optional config file (if present)
/// 3) Environment variables prefixed `RANKBOOK_`, nested with `__`
///    (e.g. `RANKBOOK_BOOK__SEED=7`)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    pub book: BookConfig,
    pub replay: ReplayConfig,
    pub logger: LogConfig,
}

impl AppConfig {
    pub fn load(config_path: &Path) -> Result<Self, figment::Error> {
        Self::figment(config_path).extract()
    }

    fn figment(config_path: &Path) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(AppConfig::default()));

        if config_path.exists() {
            figment = figment.merge(Toml::file(config_path));
        }
        figment.merge(Env::prefixed("RANKBOOK_").split("__"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_file() {
        figment::Jail::expect_with(|_jail| {
            let cfg = AppConfig::load(Path::new("missing.toml"))?;

            assert_eq!(cfg.book.side, Side::Ask);
            assert_eq!(cfg.book.seed, DEFAULT_SEED);
            assert_eq!(cfg.replay.max_commands, 1_000_000);
            assert_eq!(cfg.replay.final_quantity, 1_000);
            assert_eq!(cfg.logger.level, LogLevel::Warn);
            Ok(())
        });
    }

    #[test]
    fn test_file_then_env_precedence() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "rank-book.toml",
                r#"
                [book]
                side = "bid"
                seed = 11

                [logger]
                format = "json"
                "#,
            )?;
            jail.set_env("RANKBOOK_BOOK__SEED", "42");
            jail.set_env("RANKBOOK_REPLAY__FINAL_QUANTITY", "250");

            let cfg = AppConfig::load(Path::new("rank-book.toml"))?;

            assert_eq!(cfg.book.side, Side::Bid);
            assert_eq!(cfg.book.seed, 42);
            assert_eq!(cfg.replay.final_quantity, 250);
            assert_eq!(cfg.logger.format, LogFormat::Json);
            assert_eq!(cfg.logger.level, LogLevel::Warn);
            Ok(())
        });
    }

    #[test]
    fn test_log_level_into_filter() {
        assert_eq!(LevelFilter::from(LogLevel::Debug), LevelFilter::DEBUG);
        assert_eq!(LevelFilter::from(LogLevel::Error), LevelFilter::ERROR);
    }
}
