use super::measurement::PhysicalMeasurement;

/// Thermodynamic summary of one temperature point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicsResult {
    /// Temperature T.
    pub temperature: f64,
    /// ⟨E⟩ per site.
    pub energy: f64,
    /// Specific heat `Var(E) L² / T²`.
    pub cv: f64,
    /// ⟨|m|⟩.
    pub magnetization: f64,
    /// Susceptibility `Var(|m|) L² / T`.
    pub chi: f64,
}

/// Measurements collected at one temperature, one per measurement cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct PhysicalProperties {
    pub measurements: Vec<PhysicalMeasurement>,
    pub temperature: f64,
    pub size: usize,
}

impl PhysicalProperties {
    pub fn new(temperature: f64, size: usize) -> Self {
        Self::with_capacity(temperature, size, 0)
    }

    pub fn with_capacity(temperature: f64, size: usize, capacity: usize) -> Self {
        Self {
            measurements: Vec::with_capacity(capacity),
            temperature,
            size,
        }
    }

    pub fn push(&mut self, m: PhysicalMeasurement) {
        self.measurements.push(m);
    }

    pub fn len(&self) -> usize {
        self.measurements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.measurements.is_empty()
    }

    /// Mean of all measurements; zero when empty.
    pub fn mean(&self) -> PhysicalMeasurement {
        if self.measurements.is_empty() {
            return PhysicalMeasurement::default();
        }
        self.measurements.iter().sum::<PhysicalMeasurement>() / self.measurements.len()
    }

    /// Mean of the elementwise squares; zero when empty.
    pub fn squared_mean(&self) -> PhysicalMeasurement {
        if self.measurements.is_empty() {
            return PhysicalMeasurement::default();
        }
        self.measurements
            .iter()
            .map(|m| m.squared())
            .sum::<PhysicalMeasurement>()
            / self.measurements.len()
    }

    /// Elementwise `E[x²] - E[x]²`, clamped at zero against rounding.
    ///
    /// A single sample yields zero.
    pub fn variance(&self) -> PhysicalMeasurement {
        let mean = self.mean();
        let sq = self.squared_mean();
        PhysicalMeasurement {
            energy: (sq.energy - mean.energy * mean.energy).max(0.0),
            magnetization: (sq.magnetization - mean.magnetization * mean.magnetization).max(0.0),
        }
    }

    pub fn energy_variance(&self) -> f64 {
        self.variance().energy
    }

    pub fn magnetization_variance(&self) -> f64 {
        self.variance().magnetization
    }

    fn n_sites(&self) -> f64 {
        (self.size * self.size) as f64
    }

    pub fn specific_heat(&self) -> f64 {
        let t = self.temperature;
        self.energy_variance() * self.n_sites() / (t * t)
    }

    pub fn susceptibility(&self) -> f64 {
        self.magnetization_variance() * self.n_sites() / self.temperature
    }

    pub fn summarize(&self) -> PhysicsResult {
        let mean = self.mean();
        PhysicsResult {
            temperature: self.temperature,
            energy: mean.energy,
            cv: self.specific_heat(),
            magnetization: mean.magnetization,
            chi: self.susceptibility(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(energy: f64, magnetization: f64) -> PhysicalMeasurement {
        PhysicalMeasurement {
            energy,
            magnetization,
        }
    }

    #[test]
    fn test_mean_and_variance() {
        let mut props = PhysicalProperties::new(2.0, 10);
        props.push(m(-1.0, 0.2));
        props.push(m(-0.5, 0.4));
        props.push(m(-0.75, 0.6));
        props.push(m(-0.25, 0.8));

        let mean = props.mean();
        assert!((mean.energy + 0.625).abs() < 1e-12);
        assert!((mean.magnetization - 0.5).abs() < 1e-12);

        // Population variances.
        let var_e = (2.0 * 0.375f64.powi(2) + 2.0 * 0.125f64.powi(2)) / 4.0;
        let var_m = (0.09 + 0.01 + 0.01 + 0.09) / 4.0;
        assert!((props.energy_variance() - var_e).abs() < 1e-12);
        assert!((props.magnetization_variance() - var_m).abs() < 1e-12);

        // cv = Var(E) L² / T², chi = Var(m) L² / T
        assert!((props.specific_heat() - var_e * 100.0 / 4.0).abs() < 1e-9);
        assert!((props.susceptibility() - var_m * 100.0 / 2.0).abs() < 1e-9);

        let r = props.summarize();
        assert_eq!(r.temperature, 2.0);
        assert!((r.energy + 0.625).abs() < 1e-12);
        assert!((r.cv - props.specific_heat()).abs() < 1e-15);
    }

    #[test]
    fn test_single_sample_has_zero_variance() {
        let mut props = PhysicalProperties::new(1.5, 4);
        props.push(m(-0.9, 0.95));
        let r = props.summarize();
        assert_eq!(r.cv, 0.0);
        assert_eq!(r.chi, 0.0);
        assert_eq!(r.energy, -0.9);
    }

    #[test]
    fn test_constant_samples_never_negative() {
        let mut props = PhysicalProperties::new(1.0, 8);
        for _ in 0..1000 {
            props.push(m(-0.1, 0.3));
        }
        assert!(props.energy_variance() >= 0.0);
        assert!(props.magnetization_variance() >= 0.0);
        assert!(props.specific_heat() < 1e-9);
    }

    #[test]
    fn test_empty_is_zero() {
        let props = PhysicalProperties::new(1.0, 8);
        assert!(props.is_empty());
        let r = props.summarize();
        assert_eq!(r.energy, 0.0);
        assert_eq!(r.chi, 0.0);
    }
}
