//! Nearest-neighbor search over the catalog.
//!
//! The query is validated, embedded by the configured provider, looked up
//! in the vector index with `k` capped at the catalog size, and the matched
//! rows come back as ranked [`SearchHit`]s.

use std::sync::Arc;

use greenlens_core::{Collaborator, LensError, LensResult};
use tracing::{debug, info};

use crate::catalog::Catalog;
use crate::embeddings::EmbeddingProvider;
use crate::index::{FlatL2Index, VectorIndex};
use crate::rank::rank_hits;
use crate::types::{SearchHit, SearchRequest, SearchResponse, validate_query};

/// Number of matches returned when the caller does not ask for a count.
pub const DEFAULT_TOP_K: usize = 15;

pub struct SimilaritySearch {
    catalog: Arc<Catalog>,
    index: Arc<dyn VectorIndex>,
    embedder: Arc<dyn EmbeddingProvider>,
    default_k: usize,
}

impl SimilaritySearch {
    /// Pair an already-built index with its catalog.
    ///
    /// The index must hold exactly one vector per catalog row, in row order.
    pub fn new(
        catalog: Arc<Catalog>,
        index: Arc<dyn VectorIndex>,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> LensResult<Self> {
        if index.len() != catalog.len() {
            return Err(LensError::CatalogError(format!(
                "index holds {} vectors for {} catalog rows",
                index.len(),
                catalog.len()
            )));
        }
        if index.dimension() != embedder.dimension() {
            return Err(LensError::ConfigError(format!(
                "index dimension {} does not match embedding dimension {}",
                index.dimension(),
                embedder.dimension()
            )));
        }
        Ok(Self { catalog, index, embedder, default_k: DEFAULT_TOP_K })
    }

    /// Embed every catalog text and load the vectors into a [`FlatL2Index`].
    pub async fn build(catalog: Catalog, embedder: Arc<dyn EmbeddingProvider>) -> LensResult<Self> {
        let dimension = embedder.dimension();
        let mut index = FlatL2Index::new(dimension).map_err(|e| LensError::ConfigError(e.to_string()))?;

        let vectors = embedder
            .embed_batch(&catalog.texts())
            .await
            .map_err(|e| LensError::collaborator(Collaborator::Embedding, e))?;
        if vectors.len() != catalog.len() {
            return Err(LensError::collaborator(
                Collaborator::Embedding,
                format!("returned {} vectors for {} texts", vectors.len(), catalog.len()),
            ));
        }
        index
            .add_all(vectors.iter().map(Vec::as_slice))
            .map_err(|e| LensError::collaborator(Collaborator::Embedding, e))?;

        info!(entries = catalog.len(), dimension, "Built flat L2 index");
        Self::new(Arc::new(catalog), Arc::new(index), embedder)
    }

    pub fn with_default_k(mut self, k: usize) -> Self {
        self.default_k = k;
        self
    }

    pub fn default_k(&self) -> usize {
        self.default_k
    }

    /// The number of matches a request for `k` produces: the default when
    /// unset, capped at the catalog size.
    pub fn effective_k(&self, k: Option<usize>) -> usize {
        k.unwrap_or(self.default_k).min(self.index.len())
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Top `k` (default [`DEFAULT_TOP_K`]) catalog entries nearest to `query`.
    ///
    /// `k` larger than the catalog is capped, never an error.
    pub async fn search(&self, query: &str, k: Option<usize>) -> LensResult<SearchResponse> {
        let query = validate_query(query)?;
        let k = self.effective_k(k);
        if k == 0 {
            return Ok(SearchResponse { query: query.to_string(), matches: Vec::new() });
        }

        let vector = self
            .embedder
            .embed(query)
            .await
            .map_err(|e| LensError::collaborator(Collaborator::Embedding, e))?;
        if vector.len() != self.index.dimension() {
            return Err(LensError::collaborator(
                Collaborator::Embedding,
                format!(
                    "returned a {}-dimensional vector, index expects {}",
                    vector.len(),
                    self.index.dimension()
                ),
            ));
        }

        let neighbors = self
            .index
            .search(&vector, k)
            .map_err(|e| LensError::collaborator(Collaborator::Index, e))?;

        let hits = neighbors
            .into_iter()
            .take(k)
            .map(|neighbor| {
                let entry = self.catalog.get(neighbor.row).ok_or_else(|| {
                    LensError::collaborator(
                        Collaborator::Index,
                        format!("row {} outside catalog of {}", neighbor.row, self.catalog.len()),
                    )
                })?;
                debug!(row = neighbor.row, distance = neighbor.distance, text = %entry.text, "Match");
                Ok(SearchHit {
                    entry: entry.clone(),
                    similarity_score: neighbor.distance,
                    row: neighbor.row,
                })
            })
            .collect::<LensResult<Vec<_>>>()?;

        let matches = rank_hits(hits);
        info!(query, k, matches = matches.len(), "Similarity search complete");
        Ok(SearchResponse { query: query.to_string(), matches })
    }

    pub async fn handle(&self, request: &SearchRequest) -> LensResult<SearchResponse> {
        self.search(&request.query, request.k).await
    }
}
