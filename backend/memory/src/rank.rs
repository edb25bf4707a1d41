//! Result ranking: ascending by distance, ties left in retrieval order.
//!
//! No hits are merged or dropped; duplicate catalog rows come back as
//! separate hits.

use crate::index::by_distance;
use crate::types::SearchHit;

pub fn rank_hits(mut hits: Vec<SearchHit>) -> Vec<SearchHit> {
    // `sort_by` is stable, which is what keeps ties in retrieval order.
    hits.sort_by(|a, b| by_distance(a.similarity_score, b.similarity_score));
    hits
}
