//! Environment-driven configuration.
//!
//! Every setting has a default; a malformed value is logged and replaced by
//! its default rather than aborting startup.

use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

use crate::metrics::WriterConfig;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: String,
    /// Postgres connection string; in-memory storage when unset.
    pub database_url: Option<String>,
    pub writer: WriterConfig,
    pub restock_sweep_interval: Duration,
    /// Predictor backend setting, see `cafeops_forecast::load_predictor`.
    pub predictor: Option<String>,
    /// JSON file with initial inventory, recipes and reservations.
    pub catalog_seed_path: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            database_url: None,
            writer: WriterConfig::default(),
            restock_sweep_interval: Duration::from_secs(24 * 60 * 60),
            predictor: None,
            catalog_seed_path: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source (tests pass a map).
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let writer = WriterConfig {
            flush_interval: Duration::from_secs(positive(
                "METRICS_FLUSH_INTERVAL_SECS",
                var("METRICS_FLUSH_INTERVAL_SECS"),
                defaults.writer.flush_interval.as_secs(),
            )),
            max_batch_size: positive(
                "METRICS_MAX_BATCH_SIZE",
                var("METRICS_MAX_BATCH_SIZE"),
                defaults.writer.max_batch_size,
            ),
            max_write_bytes: positive(
                "METRICS_MAX_WRITE_BYTES",
                var("METRICS_MAX_WRITE_BYTES"),
                defaults.writer.max_write_bytes,
            ),
            max_write_count: positive(
                "METRICS_MAX_WRITE_COUNT",
                var("METRICS_MAX_WRITE_COUNT"),
                defaults.writer.max_write_count,
            ),
        };

        Self {
            bind_addr: var("BIND_ADDR").unwrap_or(defaults.bind_addr),
            database_url: var("DATABASE_URL"),
            writer,
            restock_sweep_interval: Duration::from_secs(positive(
                "RESTOCK_SWEEP_INTERVAL_SECS",
                var("RESTOCK_SWEEP_INTERVAL_SECS"),
                defaults.restock_sweep_interval.as_secs(),
            )),
            predictor: var("PREDICTOR"),
            catalog_seed_path: var("CATALOG_SEED_PATH"),
        }
    }
}

/// Parse a count-like setting; zero is clamped to 1.
fn positive<T>(key: &str, raw: Option<String>, default: T) -> T
where
    T: FromStr + PartialEq + From<u8> + Copy + std::fmt::Display,
{
    let Some(raw) = raw else {
        return default;
    };
    match raw.parse::<T>() {
        Ok(v) if v == T::from(0) => {
            warn!(key, "zero is not allowed; using 1");
            T::from(1)
        }
        Ok(v) => v,
        Err(_) => {
            warn!(key, value = %raw, default = %default, "invalid setting; using default");
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn from(pairs: &[(&str, &str)]) -> AppConfig {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        AppConfig::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let cfg = from(&[]);
        assert_eq!(cfg, AppConfig::default());
        assert_eq!(cfg.writer.flush_interval, Duration::from_secs(5));
        assert_eq!(cfg.writer.max_batch_size, 200);
        assert_eq!(cfg.writer.max_write_bytes, 1_048_576);
        assert_eq!(cfg.writer.max_write_count, 500);
        assert_eq!(cfg.restock_sweep_interval, Duration::from_secs(86_400));
        assert_eq!(cfg.bind_addr, "0.0.0.0:8080");
    }

    #[test]
    fn overrides_invalid_values_and_zero() {
        let cfg = from(&[
            ("BIND_ADDR", "127.0.0.1:9000"),
            ("DATABASE_URL", "postgres://localhost/cafe"),
            ("METRICS_FLUSH_INTERVAL_SECS", "0"),
            ("METRICS_MAX_BATCH_SIZE", "lots"),
            ("METRICS_MAX_WRITE_COUNT", "50"),
            ("PREDICTOR", "  "),
        ]);
        assert_eq!(cfg.bind_addr, "127.0.0.1:9000");
        assert_eq!(cfg.database_url.as_deref(), Some("postgres://localhost/cafe"));
        assert_eq!(cfg.writer.flush_interval, Duration::from_secs(1));
        assert_eq!(cfg.writer.max_batch_size, 200);
        assert_eq!(cfg.writer.max_write_count, 50);
        assert_eq!(cfg.predictor, None);
    }
}
