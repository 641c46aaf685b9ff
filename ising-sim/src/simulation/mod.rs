use std::sync::Arc;

use rand::SeedableRng;
use rand_xoshiro::Xoshiro256StarStar;
use rayon::prelude::*;
use tracing::{error, info, info_span};

use crate::config::{Job, TempMode};
use crate::error::{MagnetoError, MagnetoResult};
use crate::mcmc::{build_engine, SwendsenWang};
use crate::rng::RngPool;
use crate::spins::{measurement, IsingSystem};
use crate::statistics::{PhysicalProperties, PhysicsResult};
use crate::visual::{build_visual_output, VisualOutput};

/// Exact critical temperature of the 2D Ising model, `2 / ln(1 + √2)`.
pub fn critical_temperature() -> f64 {
    2.0 / (1.0 + 2.0f64.sqrt()).ln()
}

fn initial_system(job: &Job, t: f64, temp_idx: usize) -> MagnetoResult<IsingSystem> {
    if let Some(path) = &job.initial_lattice {
        let system = IsingSystem::from_file(job.j, t, path)?;
        if system.size() != job.lattice_size {
            return Err(MagnetoError::InvalidInputFile {
                path: path.clone(),
                reason: format!(
                    "lattice side {} does not match L = {}",
                    system.size(),
                    job.lattice_size
                ),
            });
        }
        return Ok(system);
    }
    let mut rng = match job.seed {
        Some(seed) => Xoshiro256StarStar::seed_from_u64(seed.wrapping_add(temp_idx as u64)),
        None => Xoshiro256StarStar::from_entropy(),
    };
    Ok(IsingSystem::new(job.j, t, job.lattice_size, &mut rng))
}

/// Warm up, then alternate snapshot, measurement and sweep for `job.n - 1`
/// cycles at temperature `t`.
///
/// Warmup always uses Swendsen-Wang, which decorrelates fastest from a
/// random start; measurement sweeps use `job.algorithm`.
pub fn run_temperature_with(
    job: &Job,
    t: f64,
    temp_idx: usize,
    pool: &Arc<RngPool>,
    visual: &mut dyn VisualOutput,
) -> MagnetoResult<PhysicsResult> {
    let l = job.lattice_size;
    let span = info_span!("temperature", T = t, L = l);
    let _entered = span.enter();
    info!("Starting computations for T={t:<4.3}, L={l}");

    let mut system = initial_system(job, t, temp_idx)?;

    {
        let mut warmup = SwendsenWang::new(job.j, t, l, pool);
        for _ in 1..job.start_runs {
            warmup.run(system.lattice_mut());
        }
    }

    let mut engine = build_engine(job.algorithm, job.j, t, l, pool);
    let n_cycles = job.n.saturating_sub(1);
    let mut properties = PhysicalProperties::with_capacity(t, l, n_cycles);
    for i in 0..n_cycles {
        visual.snapshot(system.lattice(), i + 1 == n_cycles);
        properties.push(measurement(&system));
        engine.sweep(system.lattice_mut());
    }
    visual.end_actions();

    let result = properties.summarize();
    info!(
        engine = engine.name(),
        E = result.energy,
        M = result.magnetization,
        "Finished computations for T={t:<4.3}, L={l}"
    );
    Ok(result)
}

/// [`run_temperature_with`] using the visual output configured in the job.
pub fn run_temperature(
    job: &Job,
    t: f64,
    temp_idx: usize,
    pool: &Arc<RngPool>,
) -> MagnetoResult<PhysicsResult> {
    let mut visual = build_visual_output(&job.image_mode, job.lattice_size, t);
    run_temperature_with(job, t, temp_idx, pool, visual.as_mut())
}

/// Run every temperature in parallel; results keep the order of `temps`.
///
/// `on_done` is called once per finished temperature (useful for progress bars).
pub fn run_temperatures(
    job: &Job,
    temps: &[f64],
    pool: &Arc<RngPool>,
    on_done: &(dyn Fn(&PhysicsResult) + Sync),
) -> MagnetoResult<Vec<PhysicsResult>> {
    temps
        .par_iter()
        .enumerate()
        .map(|(idx, &t)| {
            let result = run_temperature(job, t, idx, pool)?;
            on_done(&result);
            Ok(result)
        })
        .collect()
}

/// Validate `job`, resolve its temperatures and run them all.
///
/// The image temperature mode is reported and yields
/// [`MagnetoError::UnimplementedMode`] without running anything.
pub fn run_job(
    job: &Job,
    on_done: &(dyn Fn(&PhysicsResult) + Sync),
) -> MagnetoResult<Vec<PhysicsResult>> {
    job.check()?;
    if job.temp_mode == TempMode::Image {
        error!("Image-based temperatures currently not implemented");
        return Err(MagnetoError::UnimplementedMode("image".to_string()));
    }
    let temps = job.temperatures()?;

    let pool = Arc::new(match job.rng_threads {
        Some(n) => RngPool::new(n)?,
        None => RngPool::with_default_threads()?,
    });
    info!(
        n_temps = temps.len(),
        L = job.lattice_size,
        algorithm = ?job.algorithm,
        rng_threads = pool.n_threads(),
        "running job"
    );

    run_temperatures(job, &temps, &pool, on_done)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Algorithm, ImageMode, PhysicsConfig};
    use crate::visual::IntervalSnapshots;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn job(algorithm: Algorithm, l: usize, n: usize, start_runs: usize) -> Job {
        Job {
            lattice_size: l,
            j: 1,
            algorithm,
            temp_mode: TempMode::Single,
            t_single: Some(2.0),
            t_min: None,
            t_max: None,
            temp_steps: 2,
            n,
            start_runs,
            image_mode: ImageMode::default(),
            physics: PhysicsConfig::default(),
            initial_lattice: None,
            seed: Some(7),
            rng_threads: Some(2),
        }
    }

    fn pool() -> Arc<RngPool> {
        Arc::new(RngPool::new(2).unwrap())
    }

    #[test]
    fn test_critical_temperature() {
        assert!((critical_temperature() - 2.269_185).abs() < 1e-5);
    }

    #[test]
    fn test_metropolis_ordered_phase() {
        let job = job(Algorithm::Metropolis, 20, 500, 200);
        let r = run_temperature(&job, 1.5, 0, &pool()).unwrap();
        assert!(r.magnetization > 0.9, "|m| = {}", r.magnetization);
        assert!(r.energy < -0.85, "E = {}", r.energy);
    }

    #[test]
    fn test_metropolis_paramagnetic_phase() {
        let job = job(Algorithm::Metropolis, 20, 500, 200);
        let r = run_temperature(&job, 5.0, 0, &pool()).unwrap();
        assert!(r.magnetization < 0.25, "|m| = {}", r.magnetization);
    }

    #[test]
    fn test_swendsen_wang_phases() {
        let job = job(Algorithm::SwendsenWang, 20, 300, 50);
        let cold = run_temperature(&job, 1.5, 0, &pool()).unwrap();
        let hot = run_temperature(&job, 5.0, 1, &pool()).unwrap();
        assert!(cold.magnetization > 0.9, "|m| = {}", cold.magnetization);
        assert!(hot.magnetization < 0.25, "|m| = {}", hot.magnetization);
        assert!(cold.energy < hot.energy);
        assert!(cold.cv >= 0.0 && hot.chi >= 0.0);
    }

    #[test]
    fn test_snapshot_called_once_per_cycle() {
        let job = job(Algorithm::Metropolis, 6, 11, 0);
        let mut visual = IntervalSnapshots::new(1, 2.0);
        run_temperature_with(&job, 2.0, 0, &pool(), &mut visual).unwrap();
        assert_eq!(visual.frames().len(), 10);
    }

    #[test]
    fn test_run_temperatures_keeps_order() {
        let job = job(Algorithm::SwendsenWang, 8, 20, 5);
        let temps = [1.0, 2.0, 3.0, 4.0];
        let done = AtomicUsize::new(0);
        let results = run_temperatures(&job, &temps, &pool(), &|_| {
            done.fetch_add(1, Ordering::Relaxed);
        })
        .unwrap();
        assert_eq!(done.load(Ordering::Relaxed), 4);
        let got: Vec<f64> = results.iter().map(|r| r.temperature).collect();
        assert_eq!(got, temps);
    }

    #[test]
    fn test_run_job_image_mode_is_skipped() {
        let mut job = job(Algorithm::Metropolis, 4, 10, 0);
        job.temp_mode = TempMode::Image;
        let err = run_job(&job, &|_| {}).unwrap_err();
        assert!(matches!(err, MagnetoError::UnimplementedMode(_)));
    }

    #[test]
    fn test_run_job_many() {
        let mut job = job(Algorithm::Metropolis, 6, 10, 2);
        job.temp_mode = TempMode::Many;
        job.t_min = Some(1.0);
        job.t_max = Some(3.0);
        job.temp_steps = 3;
        let results = run_job(&job, &|_| {}).unwrap();
        assert_eq!(results.len(), 3);
        assert!((results[1].temperature - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_initial_lattice_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lattice.txt");
        std::fs::write(&path, crate::spins::SpinGrid::uniform(4, 1).to_text()).unwrap();

        let mut job = job(Algorithm::Metropolis, 4, 3, 0);
        job.initial_lattice = Some(path.clone());
        // Cold enough that the aligned start never moves.
        let r = run_temperature(&job, 0.01, 0, &pool()).unwrap();
        assert_eq!(r.magnetization, 1.0);
        assert_eq!(r.energy, -1.0);

        job.lattice_size = 5;
        let err = run_temperature(&job, 1.0, 0, &pool()).unwrap_err();
        assert!(matches!(err, MagnetoError::InvalidInputFile { .. }));
    }
}
