//! Config validation: range and consistency checks with user-friendly messages.

use crate::schema::GreenlensConfig;
use greenlens_understanding::{MAX_FONT_SIZE, MAX_THICKNESS};
use thiserror::Error;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// A config validation error with field path and message.
#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

/// A collection of validation errors found in one pass.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }
}

/// Validate the config and return a report of all errors and warnings.
pub fn validate(config: &GreenlensConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_logging(config, &mut report);
    validate_annotate(config, &mut report);
    validate_retrieval(config, &mut report);
    report
}

fn validate_logging(config: &GreenlensConfig, report: &mut ValidationReport) {
    let Some(logging) = &config.logging else { return };
    if let Some(level) = &logging.level {
        if !LOG_LEVELS.contains(&level.to_ascii_lowercase().as_str()) {
            report.error(
                "logging.level",
                format!("Unknown level \"{level}\"; expected one of {}", LOG_LEVELS.join(", ")),
            );
        }
    }
}

fn validate_annotate(config: &GreenlensConfig, report: &mut ValidationReport) {
    let Some(annotate) = &config.annotate else { return };
    if let Some(thickness) = annotate.thickness {
        if thickness == 0 || thickness > MAX_THICKNESS {
            report.error(
                "annotate.thickness",
                format!("thickness must be between 1 and {MAX_THICKNESS}"),
            );
        }
    }
    if let Some(size) = annotate.font_size {
        if !size.is_finite() || size <= 0.0 || size > MAX_FONT_SIZE {
            report.error(
                "annotate.fontSize",
                format!("fontSize must be a positive number up to {MAX_FONT_SIZE}"),
            );
        }
    }
    if let Some(font) = &annotate.font_path {
        if !font.exists() {
            report.warn(
                "annotate.fontPath",
                format!("Font not found at {}; labels will be drawn without text", font.display()),
            );
        }
    }
    if let Some(prompt) = &annotate.prompt {
        if prompt.trim().is_empty() {
            report.error("annotate.prompt", "Detection prompt cannot be empty");
        }
    }
}

fn validate_retrieval(config: &GreenlensConfig, report: &mut ValidationReport) {
    let Some(retrieval) = &config.retrieval else { return };
    if retrieval.top_k == Some(0) {
        report.error("retrieval.topK", "topK must be > 0");
    }
    if retrieval.embedding_dimension == Some(0) {
        report.error("retrieval.embeddingDimension", "embeddingDimension must be > 0");
    }
    if let Some(catalog) = &retrieval.catalog_path {
        if !catalog.exists() {
            report.warn(
                "retrieval.catalogPath",
                format!("Catalog not found at {}", catalog.display()),
            );
        }
    }
}
