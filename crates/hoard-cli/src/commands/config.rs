//! Config command handlers

use anyhow::Result;

use hoard_core::{CacheConfig, Config};

use crate::output::{Output, OutputFormat};

/// Show the effective configuration
pub fn show(config: &Config, output: &Output) -> Result<()> {
    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "data_dir": config.data_dir,
                    "cache": cache_summary(&config.cache),
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", config.data_dir.display());
        }
        OutputFormat::Human => {
            println!("Configuration:");
            println!("  data_dir: {}", config.data_dir.display());
            println!("  cache:    {}", cache_summary(&config.cache));
            println!();
            println!("Config file: {}", Config::config_file_path().display());
        }
    }

    Ok(())
}

fn cache_summary(cache: &CacheConfig) -> String {
    match cache {
        CacheConfig::None => "none".to_string(),
        CacheConfig::Lru { capacity } => format!("lru ({} documents)", capacity),
        CacheConfig::SizeLimited { max_size } => format!("size_limited ({} documents)", max_size),
        CacheConfig::TimeBased { ttl_secs } => format!("time_based ({}s ttl)", ttl_secs),
    }
}
