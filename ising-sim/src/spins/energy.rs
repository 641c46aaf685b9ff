use super::grid::SpinGrid;
use super::system::IsingSystem;
use crate::geometry::Direction;
use crate::statistics::PhysicalMeasurement;

/// Sum of the four periodic nearest-neighbor spins of `(x, y)`, in `[-4, 4]`.
#[inline]
pub fn neighbor_sum(lattice: &SpinGrid, x: usize, y: usize) -> i32 {
    let geo = lattice.geometry();
    let spins = lattice.as_slice();
    let i = geo.index(x, y);
    Direction::ALL
        .iter()
        .map(|&dir| spins[geo.neighbor_index(i, dir)] as i32)
        .sum()
}

/// Energy change (in units of J) of flipping the spin at `(x, y)`:
/// `2 * s(x, y) * Σ s(neighbors)`.
///
/// Takes values in `{-8, -4, 0, 4, 8}`. Flipping the site alone negates it.
#[inline]
pub fn local_energy_delta(lattice: &SpinGrid, x: usize, y: usize) -> i32 {
    2 * lattice.get(x, y) as i32 * neighbor_sum(lattice, x, y)
}

/// Interaction energy of the lattice at J = 1, normalized to `[-1, 1]`.
///
/// Each bond (the East and North bond of every site) is counted once and the
/// sum `-Σ s_i s_j` is divided by the bond count `2 L²`. A fully aligned
/// lattice gives -1, a checkerboard gives +1.
pub fn normalized_energy(lattice: &SpinGrid) -> f64 {
    let geo = lattice.geometry();
    let spins = lattice.as_slice();
    let mut total = 0i64;
    for i in 0..geo.n_sites {
        let si = spins[i] as i64;
        let east = spins[geo.neighbor_index(i, Direction::East)] as i64;
        let north = spins[geo.neighbor_index(i, Direction::North)] as i64;
        total += si * (east + north);
    }
    -(total as f64) / (2 * geo.n_sites) as f64
}

/// Absolute value of the mean spin, in `[0, 1]`.
pub fn normalized_abs_magnetization(lattice: &SpinGrid) -> f64 {
    lattice.total_spin().abs() as f64 / lattice.len() as f64
}

/// Instantaneous per-site energy (scaled by J) and |m| of a system.
pub fn measurement(system: &IsingSystem) -> PhysicalMeasurement {
    let lattice = system.lattice();
    PhysicalMeasurement {
        energy: system.coupling() as f64 * normalized_energy(lattice),
        magnetization: normalized_abs_magnetization(lattice),
    }
}
