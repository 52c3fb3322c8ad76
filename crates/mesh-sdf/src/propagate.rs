//! Unsigned distance computation.
//!
//! Two phases fill an [`UnsignedField`]:
//!
//! 1. **Scan**: every triangle computes exact distances for the grid points
//!    in its [`IndexBox`](crate::raster::IndexBox). Points near the surface
//!    are exact after this phase; points far from every triangle are still
//!    at the sentinel.
//! 2. **Sweep**: the grid is traversed in the eight diagonal orders. Each
//!    point looks at its already visited neighbours and measures the
//!    distance from itself to the *closest surface point* recorded there.
//!    The surface point is what travels across the grid, not the distance
//!    value: distances are not additive along grid edges, but a closest
//!    point found by a neighbour stays a valid candidate from here.

use nalgebra::Point3;
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::geometry::point_triangle_distance;
use crate::grid::GridSpec;
use crate::raster::{IndexBox, triangle_index_box};
use crate::types::Triangle;

/// Whether the sweep phase runs after the scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "lowercase"))]
pub enum SweepMode {
    /// Scan then sweep to a fixed point.
    #[default]
    Enabled,
    /// Scan only. Points out of reach of every triangle keep the sentinel.
    Disabled,
}

/// Traversal orders for one sweep cycle. `true` walks an axis upward.
const SWEEP_DIRECTIONS: [(bool, bool, bool); 8] = [
    (true, true, true),
    (false, false, false),
    (true, false, false),
    (false, true, true),
    (false, true, false),
    (true, false, true),
    (false, false, true),
    (true, true, false),
];

/// Summary of a sweep run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepOutcome {
    /// Full eight-direction cycles executed.
    pub cycles: usize,
    /// True when the last cycle changed nothing.
    pub converged: bool,
    /// Points updated during the last cycle when not converged.
    pub unconverged_points: usize,
}

/// Working state for unsigned distances.
///
/// Distances and closest surface points live in two parallel flat arrays
/// indexed by [`GridSpec::linearize`]. Unreached points hold
/// `f64::INFINITY`.
#[derive(Debug, Clone)]
pub struct UnsignedField {
    spec: GridSpec,
    distances: Vec<f64>,
    closest: Vec<Point3<f64>>,
    seeded: usize,
}

impl UnsignedField {
    /// Create a field with every point at the sentinel.
    pub fn new(spec: GridSpec) -> Self {
        let total = spec.total_points();
        Self {
            spec,
            distances: vec![f64::INFINITY; total],
            closest: vec![Point3::origin(); total],
            seeded: 0,
        }
    }

    pub fn spec(&self) -> &GridSpec {
        &self.spec
    }

    /// Distances in flattened order.
    pub fn distances(&self) -> &[f64] {
        &self.distances
    }

    /// Closest surface points in flattened order.
    pub fn closest_points(&self) -> &[Point3<f64>] {
        &self.closest
    }

    /// Distance at a grid point.
    #[inline]
    pub fn distance(&self, i: usize, j: usize, k: usize) -> f64 {
        self.distances[self.spec.linearize(i, j, k)]
    }

    /// Points with a known distance after the scan.
    pub fn seeded(&self) -> usize {
        self.seeded
    }

    pub fn into_distances(self) -> Vec<f64> {
        self.distances
    }

    /// Exact distances around every triangle.
    ///
    /// With `parallel` set, k-slabs are filled concurrently. Each slab has
    /// a single writer and visits triangles in order, keeping the earlier
    /// triangle on ties, so the result is identical to the serial scan.
    ///
    /// If no triangle reaches the grid, the eight grid corners are seeded
    /// from a brute-force search so the sweep has somewhere to start.
    /// Returns the number of seeded points.
    pub fn scan(&mut self, triangles: &[Triangle], margin: usize, parallel: bool) -> usize {
        let spec = self.spec;
        let footprints: Vec<(Triangle, IndexBox)> = triangles
            .iter()
            .filter_map(|tri| triangle_index_box(tri, &spec, margin).map(|b| (*tri, b)))
            .collect();

        debug!(
            triangles = triangles.len(),
            in_grid = footprints.len(),
            margin = margin,
            parallel = parallel,
            "Scanning triangle footprints"
        );

        let plane = spec.dims[0] * spec.dims[1];
        if parallel {
            self.distances
                .par_chunks_mut(plane)
                .zip(self.closest.par_chunks_mut(plane))
                .enumerate()
                .for_each(|(k, (dist, close))| scan_slab(&spec, k, &footprints, dist, close));
        } else {
            let slabs = self
                .distances
                .chunks_mut(plane)
                .zip(self.closest.chunks_mut(plane));
            for (k, (dist, close)) in slabs.enumerate() {
                scan_slab(&spec, k, &footprints, dist, close);
            }
        }

        self.seeded = self.distances.iter().filter(|d| d.is_finite()).count();
        if self.seeded == 0 && !triangles.is_empty() {
            self.seed_corners(triangles);
        }
        self.seeded
    }

    fn seed_corners(&mut self, triangles: &[Triangle]) {
        let [ni, nj, nk] = self.spec.dims;
        for &k in &[0, nk - 1] {
            for &j in &[0, nj - 1] {
                for &i in &[0, ni - 1] {
                    let idx = self.spec.linearize(i, j, k);
                    if self.distances[idx].is_finite() {
                        continue;
                    }
                    let p = self.spec.position(i, j, k);
                    for tri in triangles {
                        let (d, q) = point_triangle_distance(p, tri.v0, tri.v1, tri.v2);
                        if d < self.distances[idx] {
                            self.distances[idx] = d;
                            self.closest[idx] = q;
                        }
                    }
                }
            }
        }
        self.seeded = self.distances.iter().filter(|d| d.is_finite()).count();
        debug!(seeded = self.seeded, "No triangle reached the grid; seeded corners");
    }

    /// Propagate closest points until a full cycle changes nothing.
    ///
    /// At most `max_cycles` (at least one) eight-direction cycles run. Running
    /// out of cycles is not an error: the best field so far is kept and the
    /// outcome reports how many points were still moving.
    pub fn sweep(&mut self, max_cycles: usize) -> SweepOutcome {
        let max_cycles = max_cycles.max(1);
        let mut outcome = SweepOutcome {
            cycles: 0,
            converged: false,
            unconverged_points: 0,
        };
        let mut touched = vec![false; self.distances.len()];

        for cycle in 1..=max_cycles {
            touched.iter_mut().for_each(|t| *t = false);
            for &dir in &SWEEP_DIRECTIONS {
                self.sweep_direction(dir, &mut touched);
            }
            let changed = touched.iter().filter(|&&t| t).count();
            outcome.cycles = cycle;
            debug!(cycle = cycle, changed = changed, "Sweep cycle");

            if changed == 0 {
                outcome.converged = true;
                return outcome;
            }
            outcome.unconverged_points = changed;
        }

        warn!(
            cycles = outcome.cycles,
            unconverged = outcome.unconverged_points,
            "Sweep did not converge; keeping best-known distances"
        );
        outcome
    }

    fn sweep_direction(&mut self, (fi, fj, fk): (bool, bool, bool), touched: &mut [bool]) {
        let spec = self.spec;
        let [ni, nj, nk] = spec.dims;
        let is = ordered(ni, fi);
        let js = ordered(nj, fj);
        let ks = ordered(nk, fk);

        for &k in &ks {
            let uk = upwind(k, nk, fk);
            for &j in &js {
                let uj = upwind(j, nj, fj);
                for &i in &is {
                    let ui = upwind(i, ni, fi);
                    let idx = spec.linearize(i, j, k);
                    let p = spec.position(i, j, k);

                    // All seven already-visited neighbours of the unit cube behind p.
                    for mask in 1u8..8 {
                        let pick = |bit: u8, cur: usize, up: Option<usize>| {
                            if mask & bit == 0 { Some(cur) } else { up }
                        };
                        let (Some(ii), Some(jj), Some(kk)) =
                            (pick(1, i, ui), pick(2, j, uj), pick(4, k, uk))
                        else {
                            continue;
                        };
                        let nidx = spec.linearize(ii, jj, kk);
                        if !self.distances[nidx].is_finite() {
                            continue;
                        }
                        let q = self.closest[nidx];
                        let d = (p - q).norm();
                        if d < self.distances[idx] {
                            self.distances[idx] = d;
                            self.closest[idx] = q;
                            touched[idx] = true;
                        }
                    }
                }
            }
        }
    }
}

fn scan_slab(
    spec: &GridSpec,
    k: usize,
    footprints: &[(Triangle, IndexBox)],
    dist: &mut [f64],
    close: &mut [Point3<f64>],
) {
    let ni = spec.dims[0];
    for (tri, bx) in footprints {
        if !bx.axis(2).contains(&k) {
            continue;
        }
        for j in bx.axis(1) {
            for i in bx.axis(0) {
                let p = spec.position(i, j, k);
                let (d, q) = point_triangle_distance(p, tri.v0, tri.v1, tri.v2);
                let idx = i + ni * j;
                if d < dist[idx] {
                    dist[idx] = d;
                    close[idx] = q;
                }
            }
        }
    }
}

fn ordered(n: usize, forward: bool) -> Vec<usize> {
    if forward {
        (0..n).collect()
    } else {
        (0..n).rev().collect()
    }
}

/// The neighbour visited just before `idx` along an axis.
#[inline]
fn upwind(idx: usize, n: usize, forward: bool) -> Option<usize> {
    if forward {
        idx.checked_sub(1)
    } else if idx + 1 < n {
        Some(idx + 1)
    } else {
        None
    }
}
