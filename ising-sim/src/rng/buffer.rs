use std::sync::Arc;

use crossbeam_channel::{bounded, Receiver};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256StarStar;
use tracing::{debug, Span};

use super::generators::{time_seed, BatchGenerator, LatticeSites, UniformReals};
use super::pool::RngPool;

/// Double-buffered random source.
///
/// Holds one readable batch and one batch being generated on the
/// [`RngPool`]. [`get_buffer`](Self::get_buffer) never blocks;
/// [`refill`](Self::refill) waits for the in-flight batch, promotes it and
/// launches the next one. Exactly one generation task is outstanding per
/// buffer at any time, and the readable batch is never written while it is
/// visible.
pub struct RandomBuffer<G: BatchGenerator> {
    generator: Arc<G>,
    len: usize,
    pool: Arc<RngPool>,
    span: Span,
    current: Vec<G::Item>,
    in_flight: Receiver<Vec<G::Item>>,
}

pub type RealBuffer = RandomBuffer<UniformReals>;
pub type SiteBuffer = RandomBuffer<LatticeSites>;

impl<G: BatchGenerator> RandomBuffer<G> {
    /// Build a buffer of `len` items per batch.
    ///
    /// Blocks until the first batch is ready, then starts generating the
    /// second one. Worker-side debug traces are recorded inside `span`.
    pub fn new(generator: G, len: usize, pool: Arc<RngPool>, span: Span) -> Self {
        let generator = Arc::new(generator);
        let first = launch(&generator, len, &pool, &span);
        let current = wait(&first);
        let in_flight = launch(&generator, len, &pool, &span);
        Self {
            generator,
            len,
            pool,
            span,
            current,
            in_flight,
        }
    }

    /// The current readable batch.
    #[inline]
    pub fn get_buffer(&self) -> &[G::Item] {
        &self.current
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Discard the current batch, promote the in-flight one and start
    /// generating its successor. Blocks while the in-flight batch is not
    /// ready.
    pub fn refill(&mut self) {
        self.current = wait(&self.in_flight);
        self.in_flight = launch(&self.generator, self.len, &self.pool, &self.span);
    }
}

fn launch<G: BatchGenerator>(
    generator: &Arc<G>,
    len: usize,
    pool: &RngPool,
    span: &Span,
) -> Receiver<Vec<G::Item>> {
    let (tx, rx) = bounded(1);
    let generator = Arc::clone(generator);
    let span = span.clone();
    pool.spawn(move || {
        let _entered = span.enter();
        let mut rng = Xoshiro256StarStar::seed_from_u64(time_seed());
        let batch = generator.generate(&mut rng, len);
        debug!(
            len,
            thread = std::thread::current().name().unwrap_or("?"),
            "random batch ready"
        );
        // The owning buffer may already be gone; its batch is then discarded.
        let _ = tx.send(batch);
    });
    rx
}

/// # Panics
/// If the generating worker panicked before handing over its batch.
fn wait<T>(rx: &Receiver<Vec<T>>) -> Vec<T> {
    rx.recv()
        .expect("random batch worker exited without producing a batch")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool() -> Arc<RngPool> {
        Arc::new(RngPool::new(2).unwrap())
    }

    #[test]
    fn test_buffer_has_requested_size() {
        let buf = RealBuffer::new(UniformReals, 100, pool(), Span::none());
        assert_eq!(buf.get_buffer().len(), 100);
        assert_eq!(buf.len(), 100);
        assert!(buf.get_buffer().iter().all(|&u| (0.0..1.0).contains(&u)));
    }

    #[test]
    fn test_get_buffer_is_stable_without_refill() {
        let buf = RealBuffer::new(UniformReals, 64, pool(), Span::none());
        let a = buf.get_buffer().to_vec();
        let b = buf.get_buffer().to_vec();
        assert_eq!(a, b);
    }

    #[test]
    fn test_refill_produces_fresh_batches() {
        let mut buf = RealBuffer::new(UniformReals, 64, pool(), Span::none());
        let mut seen: Vec<Vec<f64>> = vec![buf.get_buffer().to_vec()];
        for _ in 0..20 {
            buf.refill();
            let batch = buf.get_buffer().to_vec();
            assert_eq!(batch.len(), 64);
            assert!(seen.iter().all(|prev| prev != &batch));
            seen.push(batch);
        }
    }

    #[test]
    fn test_site_buffer_in_range() {
        let side = 7;
        let mut buf = SiteBuffer::new(LatticeSites { side }, side * side, pool(), Span::none());
        for _ in 0..5 {
            assert_eq!(buf.get_buffer().len(), side * side);
            assert!(buf.get_buffer().iter().all(|&(x, y)| x < side && y < side));
            buf.refill();
        }
    }

    #[test]
    fn test_many_buffers_share_one_worker() {
        let pool = Arc::new(RngPool::new(1).unwrap());
        let mut buffers: Vec<RealBuffer> = (0..8)
            .map(|_| RealBuffer::new(UniformReals, 32, Arc::clone(&pool), Span::none()))
            .collect();
        for _ in 0..3 {
            for b in buffers.iter_mut() {
                b.refill();
                assert_eq!(b.get_buffer().len(), 32);
            }
        }
    }

    #[test]
    fn test_drop_with_batch_in_flight() {
        let pool = pool();
        {
            let _buf = RealBuffer::new(UniformReals, 10_000, Arc::clone(&pool), Span::none());
        }
        // Pool still usable after a buffer is dropped mid-generation.
        let buf = RealBuffer::new(UniformReals, 8, pool, Span::none());
        assert_eq!(buf.get_buffer().len(), 8);
    }
}
