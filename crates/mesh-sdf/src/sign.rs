//! Inside/outside classification by ray parity.
//!
//! Rays run along +k through every (i, j) column. Each triangle is
//! projected onto the (i, j) plane in grid coordinates; for every column it
//! covers, the k-coordinate where the column pierces the triangle is
//! interpolated from the barycentric weights. A grid point is inside when
//! an odd number of piercings lie strictly below it.

use nalgebra::{Point2, Vector3};
use rayon::prelude::*;
use tracing::debug;

use crate::geometry::point_in_triangle_2d;
use crate::grid::GridSpec;
use crate::types::Triangle;

/// Dense inside/outside flags, flattened like the distance grid.
#[derive(Debug, Clone, PartialEq)]
pub struct ParityGrid {
    spec: GridSpec,
    inside: Vec<bool>,
    piercings: usize,
}

impl ParityGrid {
    /// Classify every grid point against a closed triangle mesh.
    ///
    /// Columns are evaluated in parallel when `parallel` is set; the result
    /// does not depend on it.
    pub fn compute(triangles: &[Triangle], spec: &GridSpec, parallel: bool) -> Self {
        let [ni, nj, nk] = spec.dims;
        let columns = ni * nj;

        let hits: Vec<(usize, f64)> = if parallel {
            triangles
                .par_iter()
                .flat_map_iter(|tri| column_piercings(tri, spec))
                .collect()
        } else {
            triangles
                .iter()
                .flat_map(|tri| column_piercings(tri, spec))
                .collect()
        };

        let mut per_column: Vec<Vec<f64>> = vec![Vec::new(); columns];
        for &(col, fk) in &hits {
            per_column[col].push(fk);
        }

        let column_flags = |crossings: &mut Vec<f64>| {
            crossings.sort_unstable_by(f64::total_cmp);
            column_parity(crossings, nk)
        };
        let flags: Vec<Vec<bool>> = if parallel {
            per_column.par_iter_mut().map(column_flags).collect()
        } else {
            per_column.iter_mut().map(column_flags).collect()
        };

        let mut inside = vec![false; spec.total_points()];
        for (col, column) in flags.iter().enumerate() {
            let (i, j) = (col % ni, col / ni);
            for (k, &flag) in column.iter().enumerate() {
                inside[spec.linearize(i, j, k)] = flag;
            }
        }

        debug!(
            columns = columns,
            piercings = hits.len(),
            inside = inside.iter().filter(|&&f| f).count(),
            "Parity computed"
        );

        Self {
            spec: *spec,
            inside,
            piercings: hits.len(),
        }
    }

    pub fn spec(&self) -> &GridSpec {
        &self.spec
    }

    /// Whether grid point `(i, j, k)` is inside.
    #[inline]
    pub fn is_inside(&self, i: usize, j: usize, k: usize) -> bool {
        self.inside[self.spec.linearize(i, j, k)]
    }

    /// Flags in flattened order.
    pub fn flags(&self) -> &[bool] {
        &self.inside
    }

    /// Number of inside grid points.
    pub fn inside_count(&self) -> usize {
        self.inside.iter().filter(|&&f| f).count()
    }

    /// Total column/triangle crossings found, including those above the grid.
    pub fn piercings(&self) -> usize {
        self.piercings
    }
}

/// Columns a triangle covers, with the k-coordinate of each crossing.
fn column_piercings(tri: &Triangle, spec: &GridSpec) -> Vec<(usize, f64)> {
    let [ni, nj, _] = spec.dims;
    let g: [Vector3<f64>; 3] = [
        spec.to_grid_coords(&tri.v0),
        spec.to_grid_coords(&tri.v1),
        spec.to_grid_coords(&tri.v2),
    ];

    let Some(irange) = column_span(g[0].x, g[1].x, g[2].x, ni) else {
        return Vec::new();
    };
    let Some(jrange) = column_span(g[0].y, g[1].y, g[2].y, nj) else {
        return Vec::new();
    };

    let [a, b, c] = g.map(|v| Point2::new(v.x, v.y));
    let mut out = Vec::new();
    for j in jrange.0..=jrange.1 {
        for i in irange.0..=irange.1 {
            let p = Point2::new(i as f64, j as f64);
            if let Some([wa, wb, wc]) = point_in_triangle_2d(p, a, b, c) {
                out.push((i + ni * j, wa * g[0].z + wb * g[1].z + wc * g[2].z));
            }
        }
    }
    out
}

/// Integer columns within `[min, max]` of three coordinates, clamped to `0..n`.
fn column_span(x0: f64, x1: f64, x2: f64, n: usize) -> Option<(usize, usize)> {
    let lo = x0.min(x1).min(x2).ceil();
    let hi = x0.max(x1).max(x2).floor();
    let last = (n - 1) as f64;
    if hi < 0.0 || lo > last || lo > hi {
        return None;
    }
    Some((lo.max(0.0) as usize, hi.min(last) as usize))
}

/// Parity flags for one column from its sorted crossings.
///
/// Only crossings strictly below a point count, so a point lying exactly on
/// a crossing takes the side below it: on an entry face it reads outside,
/// on an exit face inside. Such points have zero distance and `combine`
/// reports them as +0.0, so the tie never shows a sign.
fn column_parity(sorted: &[f64], nk: usize) -> Vec<bool> {
    let mut below = 0;
    (0..nk)
        .map(|k| {
            let kf = k as f64;
            while below < sorted.len() && sorted[below] < kf {
                below += 1;
            }
            below % 2 == 1
        })
        .collect()
}
