//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use std::collections::HashSet;

use serde_json::Value;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Print the value stored under a key
    pub fn print_value(&self, doc: &str, key: &str, value: Option<&Value>) {
        match self.format {
            OutputFormat::Human => match value {
                Some(value) => println!("{}", pretty(value)),
                None => println!("{}/{} is not set.", doc, key),
            },
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"document": doc, "key": key, "value": value})
                );
            }
            OutputFormat::Quiet => {
                if let Some(value) = value {
                    println!("{}", value);
                }
            }
        }
    }

    /// Print the keys of a document, sorted
    pub fn print_keys(&self, doc: &str, keys: &HashSet<String>) {
        let sorted = sorted_keys(keys);
        match self.format {
            OutputFormat::Human => {
                if sorted.is_empty() {
                    println!("Document '{}' is empty.", doc);
                    return;
                }
                for key in &sorted {
                    println!("{}", key);
                }
                println!("\n{} key(s)", sorted.len());
            }
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"document": doc, "keys": sorted}));
            }
            OutputFormat::Quiet => {
                for key in &sorted {
                    println!("{}", key);
                }
            }
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }
}

/// Pretty-print a value; strings are shown without quotes
fn pretty(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    }
}

fn sorted_keys(keys: &HashSet<String>) -> Vec<&String> {
    let mut sorted: Vec<&String> = keys.iter().collect();
    sorted.sort();
    sorted
}
