//! Build runtime components from loaded config sections.
//!
//! Unset fields fall back to the library defaults re-exported in [`crate::defaults`].

use std::path::PathBuf;
use std::sync::Arc;

use greenlens_core::{LensResult, VisionModel};
use greenlens_memory::{Catalog, HashingEmbedder, SimilaritySearch};
use greenlens_understanding::{
    AnnotationPipeline, Annotator, BoxRenderer, CoordinateMapper, LabelColorMap,
};
use tracing::warn;

use crate::defaults::{
    DEFAULT_CATALOG_PATH, DEFAULT_DETECTION_PROMPT, DEFAULT_EMBEDDING_DIMENSION, DEFAULT_FONT_SIZE,
    DEFAULT_PADDING, DEFAULT_THICKNESS, DEFAULT_TOP_K,
};
use crate::schema::{AnnotateConfig, RetrievalConfig};

impl AnnotateConfig {
    /// Parse → map → render pipeline. An unloadable font only disables label text.
    pub fn pipeline(&self) -> AnnotationPipeline {
        let mapper = CoordinateMapper::new(self.padding.unwrap_or(DEFAULT_PADDING));
        let mut renderer = BoxRenderer::new()
            .with_thickness(self.thickness.unwrap_or(DEFAULT_THICKNESS))
            .with_font_size(self.font_size.unwrap_or(DEFAULT_FONT_SIZE));
        if let Some(path) = &self.font_path {
            match BoxRenderer::load_font(path) {
                Ok(font) => renderer = renderer.with_font(font),
                Err(e) => warn!(error = %format!("{e:#}"), "Drawing labels without text"),
            }
        }
        AnnotationPipeline::new(mapper, renderer)
    }

    pub fn color_map(&self) -> LabelColorMap {
        match self.color_seed {
            Some(seed) => LabelColorMap::seeded(seed),
            None => LabelColorMap::new(),
        }
    }

    pub fn detection_prompt(&self) -> &str {
        self.prompt.as_deref().unwrap_or(DEFAULT_DETECTION_PROMPT)
    }

    /// Annotator that sends the configured prompt to `vision`.
    pub fn annotator(&self, vision: Arc<dyn VisionModel>) -> Annotator {
        Annotator::new(vision)
            .with_pipeline(self.pipeline())
            .with_prompt(self.detection_prompt())
    }
}

impl RetrievalConfig {
    pub fn catalog_path_or_default(&self) -> PathBuf {
        self.catalog_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CATALOG_PATH))
    }

    /// Index `catalog` with the local hashing embedder at the configured dimension.
    pub async fn search(&self, catalog: Catalog) -> LensResult<SimilaritySearch> {
        let dimension = self.embedding_dimension.unwrap_or(DEFAULT_EMBEDDING_DIMENSION);
        let search = SimilaritySearch::build(catalog, Arc::new(HashingEmbedder::new(dimension)))
            .await?
            .with_default_k(self.top_k.unwrap_or(DEFAULT_TOP_K));
        Ok(search)
    }
}
