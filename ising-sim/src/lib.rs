pub mod config;
pub mod error;
pub mod geometry;
pub mod mcmc;
pub mod report;
pub mod rng;
pub mod simulation;
pub mod spins;
pub mod statistics;
pub mod visual;

pub use config::{Algorithm, Job, TempMode};
pub use error::{MagnetoError, MagnetoResult};
pub use geometry::SquareLattice;
pub use mcmc::{build_engine, ExpCache, Metropolis, SpinUpdate, SwendsenWang};
pub use report::write_results;
pub use rng::{RandomBuffer, RngPool};
pub use simulation::{critical_temperature, run_job, run_temperature, run_temperatures};
pub use spins::{IsingSystem, SpinGrid};
pub use statistics::{PhysicalMeasurement, PhysicalProperties, PhysicsResult};
