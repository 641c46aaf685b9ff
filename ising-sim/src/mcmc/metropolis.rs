use std::sync::Arc;

use tracing::Span;

use super::exp_cache::ExpCache;
use super::SpinUpdate;
use crate::rng::{LatticeSites, RealBuffer, RngPool, SiteBuffer, UniformReals};
use crate::spins::{local_energy_delta, SpinGrid};

/// Single-spin-flip Metropolis engine.
///
/// One [`run`](Self::run) makes `L²` proposals at uniformly drawn sites. Sites
/// and comparison reals come from background-refilled buffers; each buffer is
/// refilled exactly once per run.
pub struct Metropolis {
    j: i32,
    side: usize,
    exp_cache: ExpCache,
    sites: SiteBuffer,
    reals: RealBuffer,
}

impl Metropolis {
    /// Engine for coupling `j` at temperature `t` on an `side`×`side`
    /// lattice. Buffer traces are recorded in the current span.
    pub fn new(j: i32, t: f64, side: usize, pool: &Arc<RngPool>) -> Self {
        let n_sites = side * side;
        let span = Span::current();
        Self {
            j,
            side,
            exp_cache: ExpCache::new(j, t),
            sites: SiteBuffer::new(
                LatticeSites { side },
                n_sites,
                Arc::clone(pool),
                span.clone(),
            ),
            reals: RealBuffer::new(UniformReals, n_sites, Arc::clone(pool), span),
        }
    }

    /// One sweep of `L²` proposals. Returns the number of accepted flips.
    #[cfg_attr(feature = "profile", inline(never))]
    pub fn run(&mut self, lattice: &mut SpinGrid) -> usize {
        assert_eq!(
            lattice.side(),
            self.side,
            "engine built for side {}, lattice has side {}",
            self.side,
            lattice.side()
        );
        let mut accepted = 0;
        for (&(x, y), &u) in self.sites.get_buffer().iter().zip(self.reals.get_buffer()) {
            let d_e = self.j * local_energy_delta(lattice, x, y);
            if self.exp_cache.accepts(d_e, u) {
                lattice.flip(x, y);
                accepted += 1;
            }
        }

        self.reals.refill();
        self.sites.refill();
        accepted
    }

    pub fn exp_cache(&self) -> &ExpCache {
        &self.exp_cache
    }
}

impl SpinUpdate for Metropolis {
    fn sweep(&mut self, lattice: &mut SpinGrid) {
        self.run(lattice);
    }

    fn name(&self) -> &'static str {
        "metropolis"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spins::{normalized_abs_magnetization, normalized_energy};
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256StarStar;

    fn pool() -> Arc<RngPool> {
        Arc::new(RngPool::new(2).unwrap())
    }

    #[test]
    fn test_cold_aligned_lattice_stays_aligned() {
        // dE = 8 costs exp(-800): never accepted.
        let mut grid = SpinGrid::uniform(10, 1);
        let mut engine = Metropolis::new(1, 0.01, 10, &pool());
        for _ in 0..20 {
            assert_eq!(engine.run(&mut grid), 0);
        }
        assert_eq!(grid, SpinGrid::uniform(10, 1));
    }

    #[test]
    fn test_antiferro_checkerboard_is_stable_when_cold() {
        let mut grid = SpinGrid::checkerboard(8);
        let mut engine = Metropolis::new(-1, 0.01, 8, &pool());
        for _ in 0..20 {
            engine.run(&mut grid);
        }
        assert_eq!(grid, SpinGrid::checkerboard(8));
    }

    #[test]
    fn test_sweep_lowers_energy_when_cold() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(3);
        let mut grid = SpinGrid::random(16, &mut rng);
        let e0 = normalized_energy(&grid);
        let mut engine = Metropolis::new(1, 0.5, 16, &pool());
        for _ in 0..50 {
            engine.run(&mut grid);
        }
        assert!(normalized_energy(&grid) < e0);
        assert!(grid.as_slice().iter().all(|&s| s == 1 || s == -1));
    }

    #[test]
    fn test_hot_sweep_accepts_most_proposals() {
        let mut grid = SpinGrid::uniform(12, 1);
        let mut engine = Metropolis::new(1, 1e6, 12, &pool());
        let accepted: usize = (0..10).map(|_| engine.run(&mut grid)).sum();
        assert!(accepted > 10 * 144 * 9 / 10);
        assert!(normalized_abs_magnetization(&grid) < 0.5);
    }

    #[test]
    #[should_panic]
    fn test_wrong_lattice_size_panics() {
        let mut grid = SpinGrid::uniform(4, 1);
        let mut engine = Metropolis::new(1, 2.0, 5, &pool());
        engine.run(&mut grid);
    }
}
