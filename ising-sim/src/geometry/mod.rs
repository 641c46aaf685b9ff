pub mod lattice;

pub use lattice::{Direction, SquareLattice};
