use std::path::PathBuf;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use uuid::Uuid;

/// One mounted image. The id only exists for reconciliation of the view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageDescriptor {
    pub id: Uuid,
    pub source: PathBuf,
}

pub type ImageBatch = Vec<ImageDescriptor>;

/// Anything that can hand out a fresh batch of images on request.
pub trait BatchSource: Send + 'static {
    fn next_batch(&mut self) -> ImageBatch;
}

/// Fixed asset pool that produces shuffled batches covering every asset once.
#[derive(Debug)]
pub struct ImageCatalog {
    pool: Vec<PathBuf>,
    rng: StdRng,
}

impl ImageCatalog {
    pub fn new(pool: Vec<PathBuf>) -> Self {
        Self {
            pool,
            rng: StdRng::from_os_rng(),
        }
    }

    /// Deterministic catalog; both the order and the ids follow the seed.
    pub fn seeded(pool: Vec<PathBuf>, seed: u64) -> Self {
        Self {
            pool,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn pool(&self) -> &[PathBuf] {
        &self.pool
    }

    pub fn create_batch(&mut self) -> ImageBatch {
        let mut sources = self.pool.clone();
        // Fisher-Yates
        sources.shuffle(&mut self.rng);
        sources
            .into_iter()
            .map(|source| ImageDescriptor {
                id: uuid::Builder::from_random_bytes(self.rng.random()).into_uuid(),
                source,
            })
            .collect()
    }
}

impl BatchSource for ImageCatalog {
    fn next_batch(&mut self) -> ImageBatch {
        self.create_batch()
    }
}
