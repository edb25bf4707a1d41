//! Config defaults: fills every unset field after loading.

use crate::schema::{AnnotateConfig, GreenlensConfig, LoggingConfig, RetrievalConfig};

pub const DEFAULT_LOG_LEVEL: &str = "info";

pub const DEFAULT_CATALOG_PATH: &str = "item.csv";

// Pipeline defaults live with the code that uses them.
pub use greenlens_memory::{DEFAULT_HASHING_DIMENSION as DEFAULT_EMBEDDING_DIMENSION, DEFAULT_TOP_K};
pub use greenlens_understanding::{
    DEFAULT_FONT_SIZE, DEFAULT_PADDING, DEFAULT_THICKNESS, DETECTION_PROMPT as DEFAULT_DETECTION_PROMPT,
};

/// Apply all defaults to a freshly loaded config.
pub fn apply_all_defaults(config: GreenlensConfig) -> GreenlensConfig {
    let config = apply_logging_defaults(config);
    let config = apply_annotate_defaults(config);
    apply_retrieval_defaults(config)
}

fn apply_logging_defaults(mut config: GreenlensConfig) -> GreenlensConfig {
    let logging = config.logging.get_or_insert_with(LoggingConfig::default);
    logging.level.get_or_insert_with(|| DEFAULT_LOG_LEVEL.to_string());
    logging.json.get_or_insert(false);
    config
}

fn apply_annotate_defaults(mut config: GreenlensConfig) -> GreenlensConfig {
    let annotate = config.annotate.get_or_insert_with(AnnotateConfig::default);
    annotate.padding.get_or_insert(DEFAULT_PADDING);
    annotate.thickness.get_or_insert(DEFAULT_THICKNESS);
    annotate.font_size.get_or_insert(DEFAULT_FONT_SIZE);
    annotate
        .prompt
        .get_or_insert_with(|| DEFAULT_DETECTION_PROMPT.to_string());
    config
}

fn apply_retrieval_defaults(mut config: GreenlensConfig) -> GreenlensConfig {
    let retrieval = config.retrieval.get_or_insert_with(RetrievalConfig::default);
    retrieval
        .catalog_path
        .get_or_insert_with(|| DEFAULT_CATALOG_PATH.into());
    retrieval.top_k.get_or_insert(DEFAULT_TOP_K);
    retrieval
        .embedding_dimension
        .get_or_insert(DEFAULT_EMBEDDING_DIMENSION);
    config
}
