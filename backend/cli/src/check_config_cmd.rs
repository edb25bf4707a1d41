//! CLI Check-Config Command
//!
//! Runs the full load pipeline step by step and reports every problem found,
//! instead of stopping at the first one.

use std::path::Path;

use anyhow::{Context, Result};

use greenlens_config::{apply_all_defaults, load_raw, resolve_env_vars, validate, GreenlensConfig};

/// Returns `Ok(false)` when the config loads but fails validation.
pub async fn run(path: &Path) -> Result<bool> {
    println!("\n🔍 Checking Greenlens config at {}\n", path.display());
    if !path.exists() {
        println!("  🟡 File not found; built-in defaults apply");
    }

    let raw = load_raw(path).await?;
    let value = resolve_env_vars(&raw).context("Failed to resolve env vars in config")?;
    let config: GreenlensConfig =
        serde_json::from_value(value).context("Failed to deserialize config")?;
    let config = apply_all_defaults(config);

    let report = validate(&config);
    for warning in &report.warnings {
        println!("  🟡 {}: {}", warning.path, warning.message);
    }
    for error in &report.errors {
        println!("  🔴 {}: {}", error.path, error.message);
    }

    println!();
    if report.is_valid() {
        println!("✅ Config is valid. Effective values:\n");
        println!("{}", serde_json::to_string_pretty(&config)?);
    } else {
        println!("❌ {} error(s) found. Please fix the entries above.", report.errors.len());
    }
    Ok(report.is_valid())
}
