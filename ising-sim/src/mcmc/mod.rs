pub mod exp_cache;
pub mod metropolis;
pub mod swendsen_wang;

use std::sync::Arc;

pub use exp_cache::ExpCache;
pub use metropolis::Metropolis;
pub use swendsen_wang::{ClusterSweep, SwendsenWang};

use crate::config::Algorithm;
use crate::rng::RngPool;
use crate::spins::SpinGrid;

/// A Monte Carlo update that advances a lattice by one sweep.
pub trait SpinUpdate: Send {
    fn sweep(&mut self, lattice: &mut SpinGrid);

    fn name(&self) -> &'static str;
}

/// Build the engine selected by `algorithm` for coupling `j`, temperature
/// `t` and lattice side `side`.
pub fn build_engine(
    algorithm: Algorithm,
    j: i32,
    t: f64,
    side: usize,
    pool: &Arc<RngPool>,
) -> Box<dyn SpinUpdate> {
    match algorithm {
        Algorithm::Metropolis => Box::new(Metropolis::new(j, t, side, pool)),
        Algorithm::SwendsenWang => Box::new(SwendsenWang::new(j, t, side, pool)),
    }
}
