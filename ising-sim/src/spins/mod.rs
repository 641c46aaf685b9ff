pub mod energy;
pub mod grid;
pub mod system;

pub use energy::{
    local_energy_delta, measurement, neighbor_sum, normalized_abs_magnetization, normalized_energy,
};
pub use grid::SpinGrid;
pub use system::{IsingSystem, Temperature};
