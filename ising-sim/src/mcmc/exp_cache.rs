/// Boltzmann factors `exp(-dE / T)` for every single-flip energy change.
///
/// Indexed by `dE + offset` with `offset = 8|J|`, covering every integer `dE`
/// in `[-8|J|, 8|J|]` (length `16|J| + 1`). Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpCache {
    values: Vec<f64>,
    offset: i32,
}

impl ExpCache {
    pub fn new(j: i32, t: f64) -> Self {
        assert!(t > 0.0, "temperature must be > 0, got {t}");
        let offset = 8 * j.abs();
        let values = (-offset..=offset)
            .map(|d_e| (-(d_e as f64) / t).exp())
            .collect();
        Self { values, offset }
    }

    #[inline]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    #[inline]
    pub fn offset(&self) -> i32 {
        self.offset
    }

    /// `exp(-dE / T)`; `d_e` must lie in `[-8|J|, 8|J|]`.
    #[inline]
    pub fn factor(&self, d_e: i32) -> f64 {
        debug_assert!(d_e.abs() <= self.offset, "dE {d_e} out of cache range");
        self.values[(d_e + self.offset) as usize]
    }

    /// Metropolis acceptance: always for `dE <= 0`, otherwise iff the drawn
    /// uniform `u` is below the Boltzmann factor.
    #[inline]
    pub fn accepts(&self, d_e: i32, u: f64) -> bool {
        d_e <= 0 || u < self.factor(d_e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_values_match_exp() {
        let cache = ExpCache::new(1, 2.0);
        assert_eq!(cache.values().len(), 17);
        assert_eq!(cache.offset(), 8);
        for d_e in [-8, -4, 0, 4, 8] {
            let expected = (-(d_e as f64) / 2.0).exp();
            assert_eq!(cache.values()[(d_e + 8) as usize], expected);
        }
    }

    #[test]
    fn test_length_uses_abs_coupling() {
        let ferro = ExpCache::new(2, 1.5);
        let anti = ExpCache::new(-2, 1.5);
        assert_eq!(ferro.values().len(), 33);
        assert_eq!(anti.values().len(), 33);
        assert_eq!(anti.offset(), 16);
        assert_eq!(ferro, anti);
        assert!((anti.factor(-16) - (16.0f64 / 1.5).exp()).abs() < 1e-9);
    }

    #[test]
    fn test_acceptance_is_deterministic() {
        let cache = ExpCache::new(1, 2.0);
        let p4 = (-2.0f64).exp();
        for _ in 0..3 {
            assert!(cache.accepts(-8, 0.999));
            assert!(cache.accepts(0, 0.999));
            assert!(cache.accepts(4, p4 - 1e-9));
            assert!(!cache.accepts(4, p4));
            assert!(!cache.accepts(8, 0.5));
        }
    }

    #[test]
    #[should_panic]
    fn test_zero_temperature_panics() {
        let _ = ExpCache::new(1, 0.0);
    }
}
