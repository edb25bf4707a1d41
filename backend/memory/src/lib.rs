pub mod catalog;
pub mod embeddings;
pub mod index;
pub mod rank;
pub mod search;
pub mod types;

pub use catalog::Catalog;
pub use embeddings::{DEFAULT_HASHING_DIMENSION, EmbeddingProvider, HashingEmbedder};
pub use index::{FlatL2Index, Neighbor, VectorIndex, l2_distance};
pub use rank::rank_hits;
pub use search::{DEFAULT_TOP_K, SimilaritySearch};
pub use types::{CatalogEntry, QUERY_REQUIRED, SCORE_FIELD, SearchHit, SearchRequest, SearchResponse};
