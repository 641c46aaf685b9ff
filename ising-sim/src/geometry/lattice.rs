use std::sync::Arc;

/// Nearest-neighbor directions on the square lattice.
///
/// `East` and `North` are the forward directions: every bond is owned by the
/// site it points away from, so the bond between `(x, y)` and `(x, y - 1)` is
/// the `North` bond of `(x, y - 1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    East,
    North,
    West,
    South,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Displacement `(dx, dy)` of the neighbor in this direction.
    #[inline]
    pub fn offset(self) -> (isize, isize) {
        match self {
            Direction::East => (1, 0),
            Direction::North => (0, 1),
            Direction::West => (-1, 0),
            Direction::South => (0, -1),
        }
    }

    #[inline]
    pub fn is_forward(self) -> bool {
        matches!(self, Direction::East | Direction::North)
    }

    /// Column of this direction in the neighbor table.
    #[inline]
    fn slot(self) -> usize {
        match self {
            Direction::East => 0,
            Direction::North => 1,
            Direction::West => 2,
            Direction::South => 3,
        }
    }

    /// The forward direction along the same axis.
    #[inline]
    pub fn forward(self) -> Direction {
        match self {
            Direction::East | Direction::West => Direction::East,
            Direction::North | Direction::South => Direction::North,
        }
    }
}

/// Periodic L×L square lattice with a precomputed neighbor table.
///
/// Sites are indexed in row-major order: `(x, y)` lives at `x * side + y`.
/// Both coordinates wrap, so the `North` neighbor of `(x, side - 1)` is
/// `(x, 0)` and the `East` neighbor of `(side - 1, y)` is `(0, y)`.
///
/// The table is shared behind an `Arc`, so cloning a lattice (and every
/// [`SpinGrid`](crate::spins::SpinGrid) built on it) does not copy it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SquareLattice {
    /// Extent along each axis.
    pub side: usize,
    /// Total number of sites (`side * side`).
    pub n_sites: usize,
    /// Layout: `neighbors[i * 4 + dir.slot()]`.
    neighbors: Arc<[u32]>,
}

impl SquareLattice {
    pub fn new(side: usize) -> Self {
        assert!(side >= 1, "lattice side must be >= 1, got {side}");
        let n_sites = side * side;
        assert!(
            n_sites <= u32::MAX as usize,
            "lattice with {n_sites} sites does not fit a u32 neighbor table"
        );

        let mut neighbors = vec![0u32; n_sites * 4];
        for i in 0..n_sites {
            let (x, y) = (i / side, i % side);
            for dir in Direction::ALL {
                let (dx, dy) = dir.offset();
                let nx = (x as isize + dx).rem_euclid(side as isize) as usize;
                let ny = (y as isize + dy).rem_euclid(side as isize) as usize;
                neighbors[i * 4 + dir.slot()] = (nx * side + ny) as u32;
            }
        }

        Self {
            side,
            n_sites,
            neighbors: neighbors.into(),
        }
    }

    #[inline]
    pub fn index(&self, x: usize, y: usize) -> usize {
        x * self.side + y
    }

    #[inline]
    pub fn coords(&self, flat_idx: usize) -> (usize, usize) {
        (flat_idx / self.side, flat_idx % self.side)
    }

    /// Flat index of the neighbor of `flat_idx` in direction `dir`.
    #[inline]
    pub fn neighbor_index(&self, flat_idx: usize, dir: Direction) -> usize {
        self.neighbors[flat_idx * 4 + dir.slot()] as usize
    }

    /// Coordinates of the neighbor of `(x, y)` in direction `dir`.
    #[inline]
    pub fn neighbor(&self, x: usize, y: usize, dir: Direction) -> (usize, usize) {
        self.coords(self.neighbor_index(self.index(x, y), dir))
    }

    /// Flat index of the site owning the bond between `flat_idx` and its
    /// neighbor in direction `dir`. The owner's `dir.forward()` bond is the
    /// one connecting the pair.
    #[inline]
    pub fn bond_owner(&self, flat_idx: usize, dir: Direction) -> usize {
        if dir.is_forward() {
            flat_idx
        } else {
            self.neighbor_index(flat_idx, dir)
        }
    }
}
