use std::fmt::Write as _;
use std::path::Path;

use rand::Rng;

use crate::error::{MagnetoError, MagnetoResult};
use crate::geometry::SquareLattice;

/// Square grid of ±1 spins with periodic geometry.
///
/// Spins are stored flat in row-major order (see [`SquareLattice`]). The grid
/// is never resized after construction; engines mutate it in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpinGrid {
    geometry: SquareLattice,
    spins: Vec<i8>,
}

impl SpinGrid {
    /// All spins set to `spin` (must be ±1).
    pub fn uniform(side: usize, spin: i8) -> Self {
        assert!(spin == 1 || spin == -1, "spin must be +1 or -1, got {spin}");
        let geometry = SquareLattice::new(side);
        Self {
            spins: vec![spin; geometry.n_sites],
            geometry,
        }
    }

    /// Independent fair coin per site.
    pub fn random<R: Rng + ?Sized>(side: usize, rng: &mut R) -> Self {
        let geometry = SquareLattice::new(side);
        let spins = (0..geometry.n_sites)
            .map(|_| if rng.gen::<f32>() < 0.5 { -1 } else { 1 })
            .collect();
        Self { geometry, spins }
    }

    /// Antiferromagnetic ground state: `s(x, y) = (-1)^(x + y)`.
    pub fn checkerboard(side: usize) -> Self {
        let geometry = SquareLattice::new(side);
        let spins = (0..geometry.n_sites)
            .map(|i| {
                let (x, y) = geometry.coords(i);
                if (x + y) % 2 == 0 {
                    1
                } else {
                    -1
                }
            })
            .collect();
        Self { geometry, spins }
    }

    /// Build from row-major spins. Fails unless `spins.len() == side²` and
    /// every entry is ±1.
    pub fn from_spins(side: usize, spins: Vec<i8>) -> Result<Self, String> {
        if side == 0 {
            return Err("lattice side must be >= 1".to_string());
        }
        if spins.len() != side * side {
            return Err(format!(
                "expected {} spins for side {side}, got {}",
                side * side,
                spins.len()
            ));
        }
        if let Some(pos) = spins.iter().position(|&s| s != 1 && s != -1) {
            return Err(format!("spin {pos} is {}, expected +1 or -1", spins[pos]));
        }
        Ok(Self {
            geometry: SquareLattice::new(side),
            spins,
        })
    }

    /// Parse the text lattice format: one row per line, whitespace-separated
    /// entries `1`, `+1` or `-1`. Blank lines are ignored.
    pub fn parse(text: &str) -> Result<Self, String> {
        let mut rows: Vec<Vec<i8>> = Vec::new();
        for (line_no, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let row = line
                .split_whitespace()
                .map(|tok| match tok {
                    "1" | "+1" => Ok(1i8),
                    "-1" => Ok(-1i8),
                    _ => Err(format!("line {}: invalid spin '{tok}'", line_no + 1)),
                })
                .collect::<Result<Vec<_>, _>>()?;
            rows.push(row);
        }

        let side = rows.len();
        if side == 0 {
            return Err("lattice file contains no rows".to_string());
        }
        if let Some(bad) = rows.iter().position(|r| r.len() != side) {
            return Err(format!(
                "row {} has {} entries, expected {side} (lattice must be square)",
                bad + 1,
                rows[bad].len()
            ));
        }

        Self::from_spins(side, rows.concat())
    }

    /// Load a lattice file written in the [`SpinGrid::parse`] format.
    pub fn load(path: &Path) -> MagnetoResult<Self> {
        let invalid = |reason: String| MagnetoError::InvalidInputFile {
            path: path.to_path_buf(),
            reason,
        };
        let text = std::fs::read_to_string(path).map_err(|e| invalid(e.to_string()))?;
        Self::parse(&text).map_err(invalid)
    }

    /// Serialize in the format accepted by [`SpinGrid::parse`].
    pub fn to_text(&self) -> String {
        let mut out = String::with_capacity(self.spins.len() * 3);
        for row in self.spins.chunks(self.side()) {
            for (k, &s) in row.iter().enumerate() {
                if k > 0 {
                    out.push(' ');
                }
                let _ = write!(out, "{s}");
            }
            out.push('\n');
        }
        out
    }

    #[inline]
    pub fn geometry(&self) -> &SquareLattice {
        &self.geometry
    }

    #[inline]
    pub fn side(&self) -> usize {
        self.geometry.side
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.spins.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.spins.is_empty()
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> i8 {
        self.spins[self.geometry.index(x, y)]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, spin: i8) {
        debug_assert!(spin == 1 || spin == -1);
        let i = self.geometry.index(x, y);
        self.spins[i] = spin;
    }

    #[inline]
    pub fn flip(&mut self, x: usize, y: usize) {
        let i = self.geometry.index(x, y);
        self.spins[i] = -self.spins[i];
    }

    #[inline]
    pub fn flip_flat(&mut self, flat_idx: usize) {
        self.spins[flat_idx] = -self.spins[flat_idx];
    }

    #[inline]
    pub fn as_slice(&self) -> &[i8] {
        &self.spins
    }

    /// Sum of all spins.
    pub fn total_spin(&self) -> i64 {
        self.spins.iter().map(|&s| s as i64).sum()
    }
}
