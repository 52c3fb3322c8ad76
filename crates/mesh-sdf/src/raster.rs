//! Conservative grid-index footprints of triangles.

use std::ops::RangeInclusive;

use crate::grid::GridSpec;
use crate::types::Triangle;

/// Default number of extra cells around a triangle's footprint.
pub const RASTER_MARGIN: usize = 1;

/// An inclusive box of grid indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexBox {
    pub min: [usize; 3],
    pub max: [usize; 3],
}

impl IndexBox {
    /// Number of grid points covered.
    pub fn len(&self) -> usize {
        (0..3).map(|a| self.max[a] - self.min[a] + 1).product()
    }

    /// Always false; an index box covers at least one point.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Whether the box covers grid point `(i, j, k)`.
    #[inline]
    pub fn contains(&self, i: usize, j: usize, k: usize) -> bool {
        (self.min[0]..=self.max[0]).contains(&i)
            && (self.min[1]..=self.max[1]).contains(&j)
            && (self.min[2]..=self.max[2]).contains(&k)
    }

    /// Range of indices along one axis.
    #[inline]
    pub fn axis(&self, axis: usize) -> RangeInclusive<usize> {
        self.min[axis]..=self.max[axis]
    }

    /// Iterate covered grid points, `i` fastest.
    pub fn iter(&self) -> impl Iterator<Item = [usize; 3]> + '_ {
        self.axis(2).flat_map(move |k| {
            self.axis(1)
                .flat_map(move |j| self.axis(0).map(move |i| [i, j, k]))
        })
    }
}

/// Grid-index box a triangle can influence.
///
/// The triangle's world bounds are converted to grid coordinates, the
/// minimum floored and the maximum ceiled, then grown by `margin` cells
/// (at least one) and clamped to the grid. Returns `None` when the grown
/// box misses the grid entirely.
pub fn triangle_index_box(tri: &Triangle, spec: &GridSpec, margin: usize) -> Option<IndexBox> {
    let (lo, hi) = tri.bounds();
    let glo = spec.to_grid_coords(&lo);
    let ghi = spec.to_grid_coords(&hi);
    let margin = margin.max(1) as f64;

    let mut out = IndexBox {
        min: [0; 3],
        max: [0; 3],
    };
    for axis in 0..3 {
        let last = (spec.dims[axis] - 1) as f64;
        let start = glo[axis].floor() - margin;
        let end = ghi[axis].ceil() + margin;
        if end < 0.0 || start > last {
            return None;
        }
        out.min[axis] = start.max(0.0) as usize;
        out.max[axis] = end.min(last) as usize;
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    fn spec() -> GridSpec {
        GridSpec::new(Point3::origin(), 1.0, [10, 10, 10]).unwrap()
    }

    fn tri(a: [f64; 3], b: [f64; 3], c: [f64; 3]) -> Triangle {
        Triangle::new(Point3::from(a), Point3::from(b), Point3::from(c))
    }

    #[test]
    fn test_box_floor_ceil_margin() {
        let t = tri([2.5, 3.2, 4.0], [3.7, 3.2, 4.0], [2.5, 5.1, 4.0]);
        let b = triangle_index_box(&t, &spec(), 1).unwrap();
        assert_eq!(b.min, [1, 2, 3]);
        assert_eq!(b.max, [5, 7, 5]);
        assert!(b.contains(3, 4, 4));
        assert!(!b.contains(0, 4, 4));
    }

    #[test]
    fn test_zero_margin_raised() {
        let t = tri([4.0, 4.0, 4.0], [5.0, 4.0, 4.0], [4.0, 5.0, 4.0]);
        assert_eq!(
            triangle_index_box(&t, &spec(), 0),
            triangle_index_box(&t, &spec(), 1)
        );
    }

    #[test]
    fn test_box_clamped() {
        let t = tri([-3.0, 8.5, 0.2], [0.5, 12.0, 0.2], [0.5, 8.5, 0.2]);
        let b = triangle_index_box(&t, &spec(), 1).unwrap();
        assert_eq!(b.min, [0, 7, 0]);
        assert_eq!(b.max, [2, 9, 2]);
    }

    #[test]
    fn test_outside_grid() {
        let t = tri([20.0, 0.0, 0.0], [21.0, 0.0, 0.0], [20.0, 1.0, 0.0]);
        assert!(triangle_index_box(&t, &spec(), 1).is_none());
        let t = tri([0.0, 0.0, -5.0], [1.0, 0.0, -5.0], [0.0, 1.0, -5.0]);
        assert!(triangle_index_box(&t, &spec(), 2).is_none());
        // Within the margin of the boundary still counts.
        let t = tri([0.0, 0.0, -1.0], [1.0, 0.0, -1.0], [0.0, 1.0, -1.0]);
        assert!(triangle_index_box(&t, &spec(), 1).is_some());
    }

    #[test]
    fn test_iter_order_and_len() {
        let b = IndexBox {
            min: [1, 2, 3],
            max: [2, 3, 3],
        };
        let pts: Vec<_> = b.iter().collect();
        assert_eq!(pts, vec![[1, 2, 3], [2, 2, 3], [1, 3, 3], [2, 3, 3]]);
        assert_eq!(b.len(), 4);
        assert!(!b.is_empty());
    }
}
