use std::path::Path;

use rand::Rng;

use super::grid::SpinGrid;
use crate::error::MagnetoResult;

/// Temperature context of a system: either one scalar for the whole lattice
/// or one value per site (row-major, same layout as the spins).
#[derive(Debug, Clone, PartialEq)]
pub enum Temperature {
    Uniform(f64),
    PerSite(Vec<f64>),
}

/// Spin lattice together with its coupling constant and temperature.
///
/// The temperature variant is chosen at construction and never changes.
#[derive(Debug, Clone)]
pub struct IsingSystem {
    lattice: SpinGrid,
    j: i32,
    temperature: Temperature,
}

fn check_temperature(t: f64) {
    assert!(
        t > 0.0 && t.is_finite(),
        "temperature must be finite and > 0, got {t}"
    );
}

impl IsingSystem {
    /// Random spins at a single temperature `t`.
    pub fn new<R: Rng + ?Sized>(j: i32, t: f64, side: usize, rng: &mut R) -> Self {
        check_temperature(t);
        Self {
            lattice: SpinGrid::random(side, rng),
            j,
            temperature: Temperature::Uniform(t),
        }
    }

    /// Random spins with a spatially varying temperature. `temperatures` is
    /// row-major and must hold `side²` positive values.
    pub fn with_temperature_grid<R: Rng + ?Sized>(
        j: i32,
        temperatures: Vec<f64>,
        side: usize,
        rng: &mut R,
    ) -> Self {
        assert_eq!(
            temperatures.len(),
            side * side,
            "temperature grid has {} entries, expected {}",
            temperatures.len(),
            side * side
        );
        temperatures.iter().for_each(|&t| check_temperature(t));
        Self {
            lattice: SpinGrid::random(side, rng),
            j,
            temperature: Temperature::PerSite(temperatures),
        }
    }

    /// Spins loaded from a lattice file at a single temperature `t`.
    ///
    /// Fails with [`MagnetoError::InvalidInputFile`](crate::MagnetoError::InvalidInputFile)
    /// if the file is missing or malformed; no system is produced in that case.
    pub fn from_file(j: i32, t: f64, path: &Path) -> MagnetoResult<Self> {
        check_temperature(t);
        let lattice = SpinGrid::load(path)?;
        Ok(Self {
            lattice,
            j,
            temperature: Temperature::Uniform(t),
        })
    }

    /// Wrap an existing grid at a single temperature `t`.
    pub fn from_grid(j: i32, t: f64, lattice: SpinGrid) -> Self {
        check_temperature(t);
        Self {
            lattice,
            j,
            temperature: Temperature::Uniform(t),
        }
    }

    pub fn lattice(&self) -> &SpinGrid {
        &self.lattice
    }

    pub fn lattice_mut(&mut self) -> &mut SpinGrid {
        &mut self.lattice
    }

    pub fn size(&self) -> usize {
        self.lattice.side()
    }

    pub fn coupling(&self) -> i32 {
        self.j
    }

    /// Scalar temperature, or `None` when the system has a per-site grid.
    pub fn temperature(&self) -> Option<f64> {
        match self.temperature {
            Temperature::Uniform(t) => Some(t),
            Temperature::PerSite(_) => None,
        }
    }

    pub fn temperature_context(&self) -> &Temperature {
        &self.temperature
    }

    /// Temperature seen by site `(x, y)` under either variant.
    pub fn temperature_at(&self, x: usize, y: usize) -> f64 {
        match &self.temperature {
            Temperature::Uniform(t) => *t,
            Temperature::PerSite(grid) => grid[self.lattice.geometry().index(x, y)],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MagnetoError;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256StarStar;
    use std::io::Write;

    #[test]
    fn test_uniform_system() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(1);
        let sys = IsingSystem::new(1, 2.5, 8, &mut rng);
        assert_eq!(sys.size(), 8);
        assert_eq!(sys.coupling(), 1);
        assert_eq!(sys.temperature(), Some(2.5));
        assert_eq!(sys.temperature_at(3, 4), 2.5);
    }

    #[test]
    fn test_per_site_system_has_no_scalar_temperature() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(2);
        let temps: Vec<f64> = (0..16).map(|i| 1.0 + i as f64 * 0.1).collect();
        let sys = IsingSystem::with_temperature_grid(1, temps, 4, &mut rng);
        assert_eq!(sys.temperature(), None);
        assert!((sys.temperature_at(1, 2) - 1.6).abs() < 1e-12);
        assert!(matches!(sys.temperature_context(), Temperature::PerSite(v) if v.len() == 16));
    }

    #[test]
    #[should_panic]
    fn test_per_site_wrong_size_panics() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(3);
        let _ = IsingSystem::with_temperature_grid(1, vec![1.0; 5], 4, &mut rng);
    }

    #[test]
    #[should_panic]
    fn test_non_positive_temperature_panics() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(4);
        let _ = IsingSystem::new(1, 0.0, 4, &mut rng);
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "1 1 -1\n-1 1 1\n1 1 1").unwrap();
        let sys = IsingSystem::from_file(1, 2.0, file.path()).unwrap();
        assert_eq!(sys.size(), 3);
        assert_eq!(sys.lattice().get(0, 2), -1);
        assert_eq!(sys.lattice().total_spin(), 5);
    }

    #[test]
    fn test_from_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let err = IsingSystem::from_file(1, 2.0, &dir.path().join("nope.txt")).unwrap_err();
        assert!(matches!(err, MagnetoError::InvalidInputFile { .. }));
    }

    #[test]
    fn test_from_file_bad_values() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "1 2\n1 1").unwrap();
        let err = IsingSystem::from_file(1, 2.0, file.path()).unwrap_err();
        assert!(matches!(err, MagnetoError::InvalidInputFile { .. }));
    }
}
