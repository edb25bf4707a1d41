use std::cmp::Ordering;

use anyhow::{Result, bail, ensure};

/// A row position in the index paired with its distance to the query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub row: usize,
    pub distance: f32,
}

/// Exact nearest-neighbor search over fixed-dimension vectors.
///
/// Rows are positions in insertion order, so they line up with whatever
/// collection the vectors were built from.
pub trait VectorIndex: Send + Sync {
    fn dimension(&self) -> usize;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The `k` closest rows, nearest first. Returns fewer when the index is smaller.
    fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>>;
}

/// Brute-force index storing vectors back to back. Append-only.
#[derive(Debug, Clone)]
pub struct FlatL2Index {
    dimension: usize,
    data: Vec<f32>,
}

impl FlatL2Index {
    pub fn new(dimension: usize) -> Result<Self> {
        ensure!(dimension > 0, "index dimension must be positive");
        Ok(Self { dimension, data: Vec::new() })
    }

    /// Append one vector, returning its row.
    pub fn add(&mut self, vector: &[f32]) -> Result<usize> {
        if vector.len() != self.dimension {
            bail!(
                "vector has {} dimensions, index expects {}",
                vector.len(),
                self.dimension
            );
        }
        let row = self.len();
        self.data.extend_from_slice(vector);
        Ok(row)
    }

    pub fn add_all<'a>(&mut self, vectors: impl IntoIterator<Item = &'a [f32]>) -> Result<()> {
        for vector in vectors {
            self.add(vector)?;
        }
        Ok(())
    }
}

impl VectorIndex for FlatL2Index {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn len(&self) -> usize {
        self.data.len() / self.dimension
    }

    fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        if query.len() != self.dimension {
            bail!(
                "query has {} dimensions, index expects {}",
                query.len(),
                self.dimension
            );
        }
        let mut neighbors: Vec<Neighbor> = self
            .data
            .chunks_exact(self.dimension)
            .enumerate()
            .map(|(row, vector)| Neighbor { row, distance: l2_distance(query, vector) })
            .collect();
        // Stable: equal distances keep insertion order.
        neighbors.sort_by(|a, b| by_distance(a.distance, b.distance));
        neighbors.truncate(k);
        Ok(neighbors)
    }
}

/// Euclidean distance between two equal-length slices.
pub fn l2_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f32>()
        .sqrt()
}

pub(crate) fn by_distance(a: f32, b: f32) -> Ordering {
    a.total_cmp(&b)
}
