//! Store configuration
//!
//! Configuration is loaded from:
//! 1. Default values
//! 2. Config file (~/.config/hoard/config.toml)
//! 3. Environment variables (HOARD_* prefix)
//!
//! Environment variables take precedence over config file values.
//!
//! ```toml
//! data_dir = "/var/lib/myapp/hoard"
//!
//! [cache]
//! strategy = "time_based"
//! ttl_secs = 120
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::cache::{CacheStrategy, LruCache, SizeLimitedCache, TimeBasedCache};
use crate::document::Document;

/// Environment variable prefix
const ENV_PREFIX: &str = "HOARD";

const DEFAULT_CACHE_SIZE: usize = 64;
const DEFAULT_CACHE_TTL_SECS: u64 = 300;

/// Which cache strategy the engine uses, if any
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum CacheConfig {
    /// No cache; every load reads the backend
    None,
    /// Least-recently-used, holding `capacity` documents
    Lru { capacity: usize },
    /// FIFO, holding `max_size` documents
    SizeLimited { max_size: usize },
    /// Documents expire `ttl_secs` after they were cached
    TimeBased { ttl_secs: u64 },
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig::Lru {
            capacity: DEFAULT_CACHE_SIZE,
        }
    }
}

impl CacheConfig {
    /// Build the configured strategy for document caching
    pub fn build(&self) -> Option<Box<dyn CacheStrategy<String, Document>>> {
        match *self {
            CacheConfig::None => None,
            CacheConfig::Lru { capacity } => {
                Some(Box::new(LruCache::<String, Document>::new(capacity)))
            }
            CacheConfig::SizeLimited { max_size } => {
                Some(Box::new(SizeLimitedCache::<String, Document>::new(max_size)))
            }
            CacheConfig::TimeBased { ttl_secs } => Some(Box::new(
                TimeBasedCache::<String, Document>::new(Duration::from_secs(ttl_secs)),
            )),
        }
    }

    /// Short name of the strategy, as used in `HOARD_CACHE`
    pub fn strategy_name(&self) -> &'static str {
        match self {
            CacheConfig::None => "none",
            CacheConfig::Lru { .. } => "lru",
            CacheConfig::SizeLimited { .. } => "size_limited",
            CacheConfig::TimeBased { .. } => "time_based",
        }
    }

    fn size(&self) -> Option<usize> {
        match *self {
            CacheConfig::Lru { capacity } => Some(capacity),
            CacheConfig::SizeLimited { max_size } => Some(max_size),
            _ => None,
        }
    }

    fn ttl_secs(&self) -> Option<u64> {
        match *self {
            CacheConfig::TimeBased { ttl_secs } => Some(ttl_secs),
            _ => None,
        }
    }
}

/// Store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the document files
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Document cache
    #[serde(default)]
    pub cache: CacheConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            cache: CacheConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from default location and environment
    ///
    /// Order of precedence (highest to lowest):
    /// 1. Environment variables (HOARD_DATA_DIR, HOARD_CACHE, HOARD_CACHE_SIZE, HOARD_CACHE_TTL_SECS)
    /// 2. Config file (~/.config/hoard/config.toml or HOARD_CONFIG)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_file_path())
    }

    /// Load configuration from a specific path
    ///
    /// Environment variables are still applied as overrides.
    /// If the file doesn't exist, defaults are used.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration from a TOML string (useful for testing)
    pub fn load_from_str(toml_content: &str) -> Result<Self> {
        let mut config: Config =
            toml::from_str(toml_content).context("Failed to parse config TOML")?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        // HOARD_DATA_DIR
        if let Ok(val) = std::env::var(format!("{}_DATA_DIR", ENV_PREFIX)) {
            self.data_dir = PathBuf::from(val);
        }

        let strategy = std::env::var(format!("{}_CACHE", ENV_PREFIX)).ok();
        let size = env_number::<usize>("CACHE_SIZE");
        let ttl_secs = env_number::<u64>("CACHE_TTL_SECS");

        if strategy.is_none() && size.is_none() && ttl_secs.is_none() {
            return;
        }

        let size = size
            .or_else(|| self.cache.size())
            .unwrap_or(DEFAULT_CACHE_SIZE);
        let ttl_secs = ttl_secs
            .or_else(|| self.cache.ttl_secs())
            .unwrap_or(DEFAULT_CACHE_TTL_SECS);
        let strategy = strategy.unwrap_or_else(|| self.cache.strategy_name().to_string());

        self.cache = match strategy.to_ascii_lowercase().as_str() {
            "none" | "off" | "" => CacheConfig::None,
            "lru" => CacheConfig::Lru { capacity: size },
            "size_limited" | "fifo" => CacheConfig::SizeLimited { max_size: size },
            "time_based" | "ttl" => CacheConfig::TimeBased { ttl_secs },
            other => {
                warn!("Ignoring unknown {}_CACHE value '{}'", ENV_PREFIX, other);
                self.cache
            }
        };
    }

    /// Get the config file path
    ///
    /// Can be overridden with HOARD_CONFIG environment variable
    pub fn config_file_path() -> PathBuf {
        if let Ok(path) = std::env::var(format!("{}_CONFIG", ENV_PREFIX)) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("hoard")
            .join("config.toml")
    }
}

/// Read a numeric `HOARD_<suffix>` variable, ignoring unparsable values
fn env_number<T: std::str::FromStr>(suffix: &str) -> Option<T> {
    let name = format!("{}_{}", ENV_PREFIX, suffix);
    let val = std::env::var(&name).ok()?;
    match val.trim().parse() {
        Ok(n) => Some(n),
        Err(_) => {
            warn!("Ignoring non-numeric {} value '{}'", name, val);
            None
        }
    }
}

/// Get the default data directory
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("hoard")
}
