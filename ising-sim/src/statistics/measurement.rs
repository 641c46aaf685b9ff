use std::iter::Sum;
use std::ops::{Add, AddAssign, Div};

/// Energy and |magnetization| per site of one lattice snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PhysicalMeasurement {
    pub energy: f64,
    pub magnetization: f64,
}

impl PhysicalMeasurement {
    /// Elementwise square, used for second moments.
    pub fn squared(self) -> Self {
        Self {
            energy: self.energy * self.energy,
            magnetization: self.magnetization * self.magnetization,
        }
    }
}

impl Add for PhysicalMeasurement {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            energy: self.energy + rhs.energy,
            magnetization: self.magnetization + rhs.magnetization,
        }
    }
}

impl AddAssign for PhysicalMeasurement {
    fn add_assign(&mut self, rhs: Self) {
        self.energy += rhs.energy;
        self.magnetization += rhs.magnetization;
    }
}

impl Div<f64> for PhysicalMeasurement {
    type Output = Self;

    fn div(self, d: f64) -> Self {
        Self {
            energy: self.energy / d,
            magnetization: self.magnetization / d,
        }
    }
}

impl Div<usize> for PhysicalMeasurement {
    type Output = Self;

    fn div(self, d: usize) -> Self {
        self / d as f64
    }
}

impl Sum for PhysicalMeasurement {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

impl<'a> Sum<&'a PhysicalMeasurement> for PhysicalMeasurement {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arithmetic() {
        let a = PhysicalMeasurement {
            energy: -1.0,
            magnetization: 0.5,
        };
        let b = PhysicalMeasurement {
            energy: -0.5,
            magnetization: 0.25,
        };
        let mut c = a + b;
        assert_eq!(c.energy, -1.5);
        assert_eq!(c.magnetization, 0.75);
        c += a;
        assert_eq!((c / 5usize).energy, -0.5);
        assert_eq!(a.squared().magnetization, 0.25);

        let total: PhysicalMeasurement = [a, b].iter().sum();
        assert_eq!(total, a + b);
    }
}
