use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::error::MagnetoResult;

/// Bounded worker pool that generates random batches in the background.
///
/// Kept separate from the global rayon pool: temperature points run on the
/// global pool and block in [`RandomBuffer::refill`](super::RandomBuffer::refill),
/// so their refills must never queue behind themselves.
pub struct RngPool {
    pool: ThreadPool,
}

impl RngPool {
    pub fn new(n_threads: usize) -> MagnetoResult<Self> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(n_threads.max(1))
            .thread_name(|i| format!("rng-worker-{i}"))
            .build()?;
        Ok(Self { pool })
    }

    /// One worker per available core.
    pub fn with_default_threads() -> MagnetoResult<Self> {
        let n = std::thread::available_parallelism().map_or(1, |n| n.get());
        Self::new(n)
    }

    pub fn n_threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    pub(super) fn spawn(&self, job: impl FnOnce() + Send + 'static) {
        self.pool.spawn(job);
    }
}
