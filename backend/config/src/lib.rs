//! `greenlens-config`: Greenlens runtime configuration.
//!
//! Provides:
//! - Typed config schema (logging, annotation, retrieval)
//! - YAML loading with a missing-file fallback
//! - `${ENV_VAR}` substitution
//! - Default value application
//! - Validation with errors and warnings
//! - Builders for the annotation pipeline, `Annotator` and similarity search

pub mod defaults;
pub mod env;
pub mod io;
pub mod pipelines;
pub mod schema;
pub mod validation;

pub use defaults::apply_all_defaults;
pub use env::{resolve_env_vars, resolve_env_vars_with, MissingEnvVarError};
pub use io::{config_dir, config_file_path, load_raw};
pub use schema::{AnnotateConfig, GreenlensConfig, LoggingConfig, RetrievalConfig};
pub use validation::{validate, ConfigValidationError, ValidationReport};

use anyhow::{bail, Context, Result};
use std::path::Path;

/// Load, apply env substitution, apply defaults, and validate a config file.
///
/// This is the main entry point for loading a config at runtime. Warnings are
/// logged; any validation error fails the load.
pub async fn load_and_prepare(path: &Path) -> Result<GreenlensConfig> {
    let raw = load_raw(path).await?;

    let value = resolve_env_vars(&raw).context("Failed to resolve env vars in config")?;

    let config: GreenlensConfig =
        serde_json::from_value(value).context("Failed to deserialize config")?;

    let config = apply_all_defaults(config);

    let report = validate(&config);
    for warning in &report.warnings {
        tracing::warn!(path = %warning.path, message = %warning.message, "Config warning");
    }
    for error in &report.errors {
        tracing::error!(path = %error.path, message = %error.message, "Config error");
    }
    if let Some(first) = report.errors.first() {
        bail!("{first} ({} error(s) total)", report.errors.len());
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn scratch_file(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("greenlens-lib-{}-{name}", std::process::id()))
    }

    #[tokio::test]
    async fn missing_file_yields_defaults() {
        let cfg = load_and_prepare(Path::new("/nonexistent/greenlens.yaml"))
            .await
            .unwrap();
        let retrieval = cfg.retrieval.unwrap();
        assert_eq!(retrieval.top_k, Some(defaults::DEFAULT_TOP_K));
        assert_eq!(cfg.annotate.unwrap().padding, Some(defaults::DEFAULT_PADDING));
    }

    #[tokio::test]
    async fn user_values_survive_the_pipeline() {
        let path = scratch_file("ok.yaml");
        tokio::fs::write(&path, "annotate:\n  padding: 9\nretrieval:\n  topK: 4\n")
            .await
            .unwrap();
        let cfg = load_and_prepare(&path).await;
        let _ = tokio::fs::remove_file(&path).await;
        let cfg = cfg.unwrap();
        assert_eq!(cfg.annotate.unwrap().padding, Some(9));
        assert_eq!(cfg.retrieval.unwrap().top_k, Some(4));
    }

    #[tokio::test]
    async fn validation_errors_fail_the_load() {
        let path = scratch_file("bad.yaml");
        tokio::fs::write(&path, "retrieval:\n  topK: 0\n").await.unwrap();
        let err = load_and_prepare(&path).await.unwrap_err();
        let _ = tokio::fs::remove_file(&path).await;
        assert!(err.to_string().contains("retrieval.topK"));
    }
}
