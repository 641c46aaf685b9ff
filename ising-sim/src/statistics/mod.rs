pub mod measurement;
pub mod properties;

pub use measurement::PhysicalMeasurement;
pub use properties::{PhysicalProperties, PhysicsResult};
