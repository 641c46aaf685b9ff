pub mod buffer;
pub mod generators;
pub mod pool;

pub use buffer::{RandomBuffer, RealBuffer, SiteBuffer};
pub use generators::{time_seed, BatchGenerator, LatticeSites, UniformReals};
pub use pool::RngPool;
