//! Cell Index Method: grid-partitioned neighbor search with optional periodic boundaries.
//!
//! The square domain of side `L` is split into `M × M` cells of side `k = L/M`. Rows are
//! counted from the top (`row = (M-1) - floor(y/k)`), columns from the left (`col = floor(x/k)`).
//! Each occupied cell is compared against itself and four of its neighbors (up, up-right,
//! right, down-right); applied to every cell this visits each adjacent pair of cells once.
//!
//! The result is only complete when `L/M > rc + r_i + r_j` for every pair; see
//! [`crate::core::geometry::validate_geometry`].

use crate::core::geometry::{distance, periodic_distance, validate_grid_params, within_cutoff};
use crate::core::neighbors::{NeighborMap, Pair};
use crate::core::particle::{Particle, DIM};
use crate::error::{Error, Result};
use log::trace;
use rayon::prelude::*;
use std::collections::{BTreeSet, HashMap};

/// Row/column steps visited from every occupied cell: itself, up, up-right, right, down-right.
const DIRECTIONS: [(isize, isize); 5] = [(0, 0), (-1, 0), (-1, 1), (0, 1), (1, 1)];

/// Position of a cell in the `M × M` matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellCoord {
    pub row: usize,
    pub col: usize,
}

/// One unit of pair-testing work: a cell against itself, or a cell against another cell
/// whose particles are seen through `offset` (non-zero only across a periodic edge).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellJob {
    pub cell: CellCoord,
    pub other: CellCoord,
    pub offset: [f64; DIM],
}

/// Occupied cells of the grid. Read-only once built.
#[derive(Debug)]
pub struct CellGrid<'a> {
    side_length: f64,
    m: usize,
    cell_side: f64,
    cells: HashMap<CellCoord, Vec<&'a Particle>>,
}

impl<'a> CellGrid<'a> {
    /// Assign every particle to its cell.
    ///
    /// Errors:
    /// - `Error::InvalidGridGeometry` for non-positive `l` or zero `m`.
    /// - `Error::OutOfDomainParticle` for the first particle outside `[0, l)²`.
    pub fn build(particles: &'a [Particle], l: f64, m: usize) -> Result<Self> {
        validate_grid_params(l, m, 0.0)?;
        let mut grid = Self {
            side_length: l,
            m,
            cell_side: l / m as f64,
            cells: HashMap::new(),
        };
        for p in particles {
            let coord = grid.cell_of(p)?;
            grid.cells.entry(coord).or_default().push(p);
        }
        trace!(
            "cell grid {}x{} (k = {}): {} particles in {} occupied cells",
            m,
            m,
            grid.cell_side,
            particles.len(),
            grid.cells.len()
        );
        Ok(grid)
    }

    /// Cell holding `p`, or `OutOfDomainParticle` if its position maps outside the grid.
    pub fn cell_of(&self, p: &Particle) -> Result<CellCoord> {
        let out_of_domain = || Error::OutOfDomainParticle {
            id: p.id,
            x: p.x(),
            y: p.y(),
        };
        let col = self.axis_index(p.x()).ok_or_else(out_of_domain)?;
        let t_row = self.axis_index(p.y()).ok_or_else(out_of_domain)?;
        Ok(CellCoord {
            row: (self.m - 1) - t_row,
            col,
        })
    }

    /// Cell index along one axis for `v` in `[0, L)`.
    ///
    /// `L/M` may round below its exact value, so a coordinate just under `L` can divide out
    /// to `M`; it belongs to the last cell.
    fn axis_index(&self, v: f64) -> Option<usize> {
        if !(0.0..self.side_length).contains(&v) {
            return None;
        }
        let t = (v / self.cell_side).floor() as usize;
        Some(t.min(self.m - 1))
    }

    /// Occupied cells in row-major order.
    pub fn occupied(&self) -> BTreeSet<CellCoord> {
        self.cells.keys().copied().collect()
    }

    /// Particles stored in `coord` (empty for unoccupied cells).
    pub fn particles_in(&self, coord: CellCoord) -> &[&'a Particle] {
        self.cells.get(&coord).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Target of direction `(dr, dc)` from `cell`, with the offset to apply to its particles.
    ///
    /// Without periodic boundaries a target outside the matrix is `None`. With them the
    /// index wraps and the offset shifts the target's particles by ±L on the wrapped axis.
    fn target(
        &self,
        cell: CellCoord,
        (dr, dc): (isize, isize),
        periodic: bool,
    ) -> Option<(CellCoord, [f64; DIM])> {
        let m = self.m as isize;
        let l = self.side_length;
        let mut row = cell.row as isize + dr;
        let mut col = cell.col as isize + dc;
        let mut offset = [0.0; DIM];

        if !periodic {
            if row < 0 || row >= m || col >= m {
                return None;
            }
        } else {
            if row < 0 {
                row = m - 1;
                offset[1] = l;
            } else if row >= m {
                row = 0;
                offset[1] = -l;
            }
            if col >= m {
                col = 0;
                offset[0] = l;
            }
        }
        Some((
            CellCoord {
                row: row as usize,
                col: col as usize,
            },
            offset,
        ))
    }

    /// Work list of cell pairs to test.
    ///
    /// Only the zero direction yields a same-cell job; a wrapped direction landing back on
    /// the same cell (M = 1) adds nothing, and empty targets are skipped.
    pub fn jobs(&self, periodic: bool) -> Vec<CellJob> {
        let mut jobs = Vec::new();
        for cell in self.occupied() {
            for dir in DIRECTIONS {
                let Some((other, offset)) = self.target(cell, dir, periodic) else {
                    continue;
                };
                let same = other == cell;
                if same && dir != (0, 0) {
                    continue;
                }
                if !same && !self.cells.contains_key(&other) {
                    continue;
                }
                jobs.push(CellJob {
                    cell,
                    other,
                    offset,
                });
            }
        }
        jobs
    }

    /// Neighbor pairs found by one job.
    pub fn pairs_for(&self, job: &CellJob, rc: f64) -> Vec<Pair> {
        let current = self.particles_in(job.cell);
        let mut out = Vec::new();
        if job.cell == job.other {
            for (i, a) in current.iter().enumerate() {
                for b in &current[i + 1..] {
                    if within_cutoff(distance(a, b), rc) {
                        out.extend(Pair::new(a.id, b.id));
                    }
                }
            }
        } else {
            let other = self.particles_in(job.other);
            for a in current {
                for b in other {
                    if within_cutoff(periodic_distance(a, b, job.offset), rc) {
                        out.extend(Pair::new(a.id, b.id));
                    }
                }
            }
        }
        out
    }
}

/// Find, for every particle, the particles within `rc` of it (gap between disks, inclusive).
///
/// `l` is the domain side, `m` the number of cells per side, and `periodic` turns on
/// wraparound at the domain edges. The pair tests are spread over the cell-pair work list
/// in parallel; the result does not depend on scheduling.
///
/// Errors:
/// - `Error::InvalidGridGeometry` if `m == 0`, `rc < 0` or `l <= 0`.
/// - `Error::InvalidParam` if two particles share an id.
/// - `Error::OutOfDomainParticle` if a particle lies outside `[0, l)²`.
pub fn find_neighbors(
    particles: &[Particle],
    l: f64,
    m: usize,
    rc: f64,
    periodic: bool,
) -> Result<NeighborMap> {
    validate_grid_params(l, m, rc)?;
    ensure_unique_ids(particles)?;
    if particles.is_empty() {
        return Ok(NeighborMap::default());
    }

    let grid = CellGrid::build(particles, l, m)?;
    let jobs = grid.jobs(periodic);
    trace!("cell index: {} cell-pair jobs (periodic = {periodic})", jobs.len());

    let pairs: Vec<Pair> = jobs
        .par_iter()
        .flat_map_iter(|job| grid.pairs_for(job, rc))
        .collect();

    Ok(NeighborMap::from_pairs(
        particles.iter().map(|p| p.id),
        pairs,
    ))
}

fn ensure_unique_ids(particles: &[Particle]) -> Result<()> {
    let mut seen = BTreeSet::new();
    for p in particles {
        if !seen.insert(p.id) {
            return Err(Error::InvalidParam(format!(
                "duplicate particle id {}",
                p.id
            )));
        }
    }
    Ok(())
}
