use std::collections::VecDeque;
use std::sync::Arc;

use tracing::{debug, Span};

use super::SpinUpdate;
use crate::geometry::{Direction, SquareLattice};
use crate::rng::{RealBuffer, RngPool, UniformReals};
use crate::spins::SpinGrid;

/// Outcome of one Swendsen-Wang update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClusterSweep {
    /// Number of clusters the lattice was decomposed into.
    pub clusters: usize,
    /// Clusters whose coin chose to flip.
    pub flipped_clusters: usize,
    /// Sites discovered by the flood fill; always `L²`.
    pub discovered_sites: usize,
}

/// Swendsen-Wang cluster engine for a uniform temperature.
///
/// Every run freezes each North and East bond independently with probability
/// `p = 1 - exp(-2|J|/T)`, decomposes the lattice into clusters connected by
/// frozen bonds between satisfied neighbors, and flips each cluster with
/// probability 1/2. A bond is satisfied when its spins are equal for `J > 0`
/// and opposite for `J < 0`.
pub struct SwendsenWang {
    j: i32,
    t: f64,
    geometry: SquareLattice,
    freeze_probability: f64,
    bond_north: RealBuffer,
    bond_east: RealBuffer,
    flip: RealBuffer,
    // scratch, reused across runs
    frozen_north: Vec<bool>,
    frozen_east: Vec<bool>,
    discovered: Vec<bool>,
    queue: VecDeque<usize>,
}

impl SwendsenWang {
    /// Engine for coupling `j` at temperature `t` on an `side`×`side`
    /// lattice. Buffer traces are recorded in the current span.
    pub fn new(j: i32, t: f64, side: usize, pool: &Arc<RngPool>) -> Self {
        assert!(t > 0.0, "temperature must be > 0, got {t}");
        let n_sites = side * side;
        let span = Span::current();
        let buffer = || RealBuffer::new(UniformReals, n_sites, Arc::clone(pool), span.clone());
        Self {
            j,
            t,
            geometry: SquareLattice::new(side),
            freeze_probability: 1.0 - (-2.0 * j.abs() as f64 / t).exp(),
            bond_north: buffer(),
            bond_east: buffer(),
            flip: buffer(),
            frozen_north: vec![false; n_sites],
            frozen_east: vec![false; n_sites],
            discovered: vec![false; n_sites],
            queue: VecDeque::with_capacity(n_sites),
        }
    }

    pub fn freeze_probability(&self) -> f64 {
        self.freeze_probability
    }

    pub fn temperature(&self) -> f64 {
        self.t
    }

    /// One full cluster decomposition and flip.
    pub fn run(&mut self, lattice: &mut SpinGrid) -> ClusterSweep {
        self.run_observed(lattice, |_, _| {})
    }

    /// [`run`](Self::run), calling `on_discover(seed, site)` for every site
    /// as it joins a cluster. `seed` is the site that started the cluster, so
    /// it identifies the cluster within one run.
    #[cfg_attr(feature = "profile", inline(never))]
    pub fn run_observed(
        &mut self,
        lattice: &mut SpinGrid,
        mut on_discover: impl FnMut(usize, usize),
    ) -> ClusterSweep {
        assert_eq!(
            lattice.side(),
            self.geometry.side,
            "engine built for side {}, lattice has side {}",
            self.geometry.side,
            lattice.side()
        );
        let geo = &self.geometry;
        let p = self.freeze_probability;
        let ferro = self.j > 0;

        let north = self.bond_north.get_buffer();
        for (frozen, &u) in self.frozen_north.iter_mut().zip(north) {
            *frozen = u < p;
        }
        let east = self.bond_east.get_buffer();
        for (frozen, &u) in self.frozen_east.iter_mut().zip(east) {
            *frozen = u < p;
        }
        self.discovered.fill(false);

        let mut stats = ClusterSweep::default();
        let coins = self.flip.get_buffer();

        for seed in 0..geo.n_sites {
            if self.discovered[seed] {
                continue;
            }
            let flip_cluster = coins[seed] < 0.5;
            stats.clusters += 1;
            if flip_cluster {
                stats.flipped_clusters += 1;
            }

            self.discovered[seed] = true;
            on_discover(seed, seed);
            self.queue.push_back(seed);

            while let Some(site) = self.queue.pop_front() {
                let spin = lattice.as_slice()[site];
                for dir in Direction::ALL {
                    let nb = geo.neighbor_index(site, dir);
                    if self.discovered[nb] {
                        continue;
                    }
                    let satisfied = (lattice.as_slice()[nb] == spin) == ferro;
                    if !satisfied {
                        continue;
                    }
                    let owner = geo.bond_owner(site, dir);
                    let frozen = match dir.forward() {
                        Direction::North => self.frozen_north[owner],
                        _ => self.frozen_east[owner],
                    };
                    if frozen {
                        self.discovered[nb] = true;
                        on_discover(seed, nb);
                        self.queue.push_back(nb);
                    }
                }
                // Undiscovered neighbors still hold their pre-flip spins.
                if flip_cluster {
                    lattice.flip_flat(site);
                }
                stats.discovered_sites += 1;
            }
        }

        debug!(
            clusters = stats.clusters,
            flipped = stats.flipped_clusters,
            "swendsen-wang sweep"
        );

        self.bond_north.refill();
        self.bond_east.refill();
        self.flip.refill();
        stats
    }
}

impl SpinUpdate for SwendsenWang {
    fn sweep(&mut self, lattice: &mut SpinGrid) {
        self.run(lattice);
    }

    fn name(&self) -> &'static str {
        "swendsen-wang"
    }
}
