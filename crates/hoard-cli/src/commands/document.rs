//! Document command handlers

use anyhow::{Context, Result};
use serde_json::Value;

use hoard_core::StorageEngine;

use crate::output::Output;

/// Show the value stored under a key
pub async fn get(
    engine: &StorageEngine,
    doc: &str,
    key: &str,
    password: Option<&str>,
    output: &Output,
) -> Result<()> {
    let value: Option<Value> = engine
        .read(doc, key, password)
        .await
        .with_context(|| format!("Failed to read {}/{}", doc, key))?;
    output.print_value(doc, key, value.as_ref());
    Ok(())
}

/// Store a value unless the key is already set
pub async fn put(
    engine: &StorageEngine,
    doc: &str,
    key: &str,
    raw: &str,
    password: Option<&str>,
    output: &Output,
) -> Result<()> {
    let value = parse_value(raw);
    let existed = engine
        .read::<Value>(doc, key, password)
        .await
        .with_context(|| format!("Failed to read {}/{}", doc, key))?
        .is_some();

    engine
        .write(doc, key, value, password)
        .await
        .with_context(|| format!("Failed to write {}/{}", doc, key))?;

    if existed {
        output.success(&format!("{}/{} already set, left unchanged", doc, key));
    } else {
        output.success(&format!("Stored {}/{}", doc, key));
    }
    Ok(())
}

/// Store a value, replacing any existing one
pub async fn set(
    engine: &StorageEngine,
    doc: &str,
    key: &str,
    raw: &str,
    password: Option<&str>,
    output: &Output,
) -> Result<()> {
    let value = parse_value(raw);
    engine
        .batch(doc, password, |batch| batch.write(key, value))
        .await
        .with_context(|| format!("Failed to write {}/{}", doc, key))?;
    output.success(&format!("Stored {}/{}", doc, key));
    Ok(())
}

/// Remove a key
pub async fn remove(
    engine: &StorageEngine,
    doc: &str,
    key: &str,
    password: Option<&str>,
    output: &Output,
) -> Result<()> {
    engine
        .remove(doc, key, password)
        .await
        .with_context(|| format!("Failed to remove {}/{}", doc, key))?;
    output.success(&format!("Removed {}/{}", doc, key));
    Ok(())
}

/// List the keys of a document
pub async fn keys(engine: &StorageEngine, doc: &str, output: &Output) -> Result<()> {
    let keys = engine
        .get_keys(doc)
        .await
        .with_context(|| format!("Failed to list keys of '{}'", doc))?;
    output.print_keys(doc, &keys);
    Ok(())
}

/// Empty a document
pub async fn clear(engine: &StorageEngine, doc: &str, output: &Output) -> Result<()> {
    engine
        .clear_document(doc)
        .await
        .with_context(|| format!("Failed to clear '{}'", doc))?;
    output.success(&format!("Cleared '{}'", doc));
    Ok(())
}

/// Delete a document entirely
pub async fn delete(
    engine: &StorageEngine,
    doc: &str,
    password: Option<&str>,
    output: &Output,
) -> Result<()> {
    engine
        .delete_document(doc, password)
        .await
        .with_context(|| format!("Failed to delete '{}'", doc))?;
    output.success(&format!("Deleted '{}'", doc));
    Ok(())
}

/// Interpret a command-line argument as JSON, falling back to a plain string
pub fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}
