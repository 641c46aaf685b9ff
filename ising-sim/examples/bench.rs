use std::sync::Arc;
use std::time::Instant;

use ising_sim::mcmc::SpinUpdate;
use ising_sim::{critical_temperature, IsingSystem, Metropolis, RngPool, SwendsenWang};

const L: usize = 256;
const N_SWEEPS: usize = 200;
const N_WARMUP: usize = 20;

fn time_sweeps(engine: &mut dyn SpinUpdate, system: &mut IsingSystem) -> f64 {
    for _ in 0..N_WARMUP {
        engine.sweep(system.lattice_mut());
    }
    let t0 = Instant::now();
    for _ in 0..N_SWEEPS {
        engine.sweep(system.lattice_mut());
    }
    t0.elapsed().as_secs_f64()
}

fn main() {
    let pool = Arc::new(RngPool::with_default_threads().expect("rng pool"));
    let t = critical_temperature();

    println!(
        "Lattice: {}x{}  |  T: {:.4}  |  Sweeps: {}  |  RNG threads: {}",
        L,
        L,
        t,
        N_SWEEPS,
        pool.n_threads()
    );
    println!("{}", "-".repeat(70));

    let mut rng = rand::thread_rng();

    let mut system = IsingSystem::new(1, t, L, &mut rng);
    let mut metropolis = Metropolis::new(1, t, L, &pool);
    let elapsed = time_sweeps(&mut metropolis, &mut system);
    println!(
        "metropolis     total: {:.3} s  |  {:.3} ms/sweep  |  {:.1} ns/spin",
        elapsed,
        elapsed / N_SWEEPS as f64 * 1e3,
        elapsed / (N_SWEEPS * L * L) as f64 * 1e9
    );

    let mut system = IsingSystem::new(1, t, L, &mut rng);
    let mut sw = SwendsenWang::new(1, t, L, &pool);
    let elapsed = time_sweeps(&mut sw, &mut system);
    println!(
        "swendsen-wang  total: {:.3} s  |  {:.3} ms/sweep  |  {:.1} ns/spin",
        elapsed,
        elapsed / N_SWEEPS as f64 * 1e3,
        elapsed / (N_SWEEPS * L * L) as f64 * 1e9
    );
}
