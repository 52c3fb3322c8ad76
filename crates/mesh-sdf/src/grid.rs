//! Dense grid geometry and the finished distance field.

use nalgebra::{Point3, Vector3};
use tracing::{debug, info, warn};

use crate::error::{SdfError, SdfResult};
use crate::types::Mesh;

/// Placement of a dense sample grid in world space.
///
/// Grid point `(i, j, k)` sits at `origin + dx * (i, j, k)`. Values are
/// flattened with `i` varying fastest, then `j`, then `k`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSpec {
    /// World position of grid point (0, 0, 0).
    pub origin: Point3<f64>,
    /// Spacing between neighbouring grid points.
    pub dx: f64,
    /// Number of grid points along each axis [ni, nj, nk].
    pub dims: [usize; 3],
}

impl GridSpec {
    /// Create a grid, checking `dx` is positive and every dimension is at least 1.
    pub fn new(origin: Point3<f64>, dx: f64, dims: [usize; 3]) -> SdfResult<Self> {
        let spec = Self { origin, dx, dims };
        spec.validate()?;
        Ok(spec)
    }

    /// Size a grid around an axis-aligned box.
    ///
    /// The box is grown by `padding_cells` grid cells on every side. Padding
    /// below one cell is raised to one so the surface never touches the
    /// grid boundary.
    pub fn from_bounds(
        min: Point3<f64>,
        max: Point3<f64>,
        dx: f64,
        padding_cells: usize,
        max_voxels: usize,
    ) -> SdfResult<Self> {
        check_cell_size(dx)?;
        if !(min.coords.iter().chain(max.coords.iter())).all(|c| c.is_finite()) {
            return Err(SdfError::invalid_grid("bounding box is not finite"));
        }

        let padding = if padding_cells < 1 {
            warn!(padding = padding_cells, "Padding raised to 1 cell");
            1
        } else {
            padding_cells
        };

        let pad = padding as f64 * dx;
        let origin = min - Vector3::repeat(pad);
        let extent = (max - min) + Vector3::repeat(2.0 * pad);

        let axis = |len: f64| ((len / dx).ceil() as usize).max(1);
        let dims = [axis(extent.x), axis(extent.y), axis(extent.z)];

        let total = checked_product(dims).unwrap_or(usize::MAX);
        if total > max_voxels {
            return Err(SdfError::GridTooLarge {
                dims,
                total,
                max: max_voxels,
            });
        }

        info!(
            dims = ?dims,
            total = total,
            dx = dx,
            padding = padding,
            "Creating distance grid"
        );

        Self::new(origin, dx, dims)
    }

    /// Size a grid around a mesh's bounding box.
    pub fn from_mesh(
        mesh: &Mesh,
        dx: f64,
        padding_cells: usize,
        max_voxels: usize,
    ) -> SdfResult<Self> {
        let (min, max) = mesh
            .bounds()
            .ok_or_else(|| SdfError::empty_mesh("mesh has no vertices"))?;
        debug!(
            min = ?min,
            max = ?max,
            faces = mesh.face_count(),
            "Mesh bounds"
        );
        Self::from_bounds(min, max, dx, padding_cells, max_voxels)
    }

    /// Check the invariants of a directly constructed grid.
    pub fn validate(&self) -> SdfResult<()> {
        check_cell_size(self.dx)?;
        if self.dims.contains(&0) {
            return Err(SdfError::invalid_grid(format!(
                "dimensions must be at least 1, got {:?}",
                self.dims
            )));
        }
        if !self.origin.coords.iter().all(|c| c.is_finite()) {
            return Err(SdfError::invalid_grid("origin is not finite"));
        }
        Ok(())
    }

    /// Total number of grid points, or `None` if it overflows `usize`.
    #[inline]
    pub fn checked_total_points(&self) -> Option<usize> {
        checked_product(self.dims)
    }

    /// Total number of grid points, saturating at `usize::MAX`.
    #[inline]
    pub fn total_points(&self) -> usize {
        self.checked_total_points().unwrap_or(usize::MAX)
    }

    /// Convert 3D grid indices to a flat index.
    #[inline]
    pub fn linearize(&self, i: usize, j: usize, k: usize) -> usize {
        i + self.dims[0] * (j + self.dims[1] * k)
    }

    /// Convert a flat index back to 3D grid indices.
    #[inline]
    pub fn delinearize(&self, idx: usize) -> [usize; 3] {
        let plane = self.dims[0] * self.dims[1];
        let k = idx / plane;
        let rem = idx % plane;
        [rem % self.dims[0], rem / self.dims[0], k]
    }

    /// World position of a grid point.
    #[inline]
    pub fn position(&self, i: usize, j: usize, k: usize) -> Point3<f64> {
        self.origin + Vector3::new(i as f64, j as f64, k as f64) * self.dx
    }

    /// Continuous grid coordinates of a world point.
    #[inline]
    pub fn to_grid_coords(&self, p: &Point3<f64>) -> Vector3<f64> {
        (p - self.origin) / self.dx
    }

    /// Edge lengths of the grid's world box, `dims * dx`.
    pub fn extent(&self) -> Vector3<f64> {
        Vector3::new(
            self.dims[0] as f64,
            self.dims[1] as f64,
            self.dims[2] as f64,
        ) * self.dx
    }
}

fn check_cell_size(dx: f64) -> SdfResult<()> {
    if dx.is_finite() && dx > 0.0 {
        Ok(())
    } else {
        Err(SdfError::invalid_grid(format!(
            "cell size must be positive and finite, got {}",
            dx
        )))
    }
}

/// A dense signed distance field.
///
/// Negative inside the mesh, positive outside. Values are stored as
/// `f32` in the flattening order of [`GridSpec::linearize`].
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceField {
    spec: GridSpec,
    values: Vec<f32>,
}

impl DistanceField {
    /// Wrap precomputed values.
    ///
    /// Fails when `values` does not hold exactly one entry per grid point.
    pub fn from_values(spec: GridSpec, values: Vec<f32>) -> SdfResult<Self> {
        spec.validate()?;
        if values.len() != spec.total_points() {
            return Err(SdfError::invalid_grid(format!(
                "expected {} values for {:?}, got {}",
                spec.total_points(),
                spec.dims,
                values.len()
            )));
        }
        Ok(Self { spec, values })
    }

    /// Grid placement of this field.
    #[inline]
    pub fn spec(&self) -> &GridSpec {
        &self.spec
    }

    /// Flat value storage.
    #[inline]
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Consume the field, returning the flat values.
    pub fn into_values(self) -> Vec<f32> {
        self.values
    }

    /// Value at a grid point. Panics if the indices are out of range.
    #[inline]
    pub fn get(&self, i: usize, j: usize, k: usize) -> f32 {
        self.values[self.spec.linearize(i, j, k)]
    }

    /// Whether a grid point lies strictly inside the mesh.
    #[inline]
    pub fn is_inside(&self, i: usize, j: usize, k: usize) -> bool {
        self.get(i, j, k) < 0.0
    }

    /// Smallest value in the field.
    pub fn min_value(&self) -> f32 {
        self.values.iter().copied().fold(f32::INFINITY, f32::min)
    }

    /// Largest value in the field.
    pub fn max_value(&self) -> f32 {
        self.values.iter().copied().fold(f32::NEG_INFINITY, f32::max)
    }

    /// Trilinearly interpolated value at a world point.
    ///
    /// Points outside the grid are clamped to its boundary.
    pub fn sample(&self, p: &Point3<f64>) -> f64 {
        let g = self.spec.to_grid_coords(p);
        let mut lo = [0usize; 3];
        let mut t = [0.0f64; 3];
        for axis in 0..3 {
            let n = self.spec.dims[axis];
            let c = g[axis].clamp(0.0, (n - 1) as f64);
            let base = (c.floor() as usize).min(n.saturating_sub(2));
            lo[axis] = base;
            t[axis] = c - base as f64;
        }

        let hi = |axis: usize| (lo[axis] + 1).min(self.spec.dims[axis] - 1);
        let v = |i: usize, j: usize, k: usize| self.get(i, j, k) as f64;
        let lerp = |a: f64, b: f64, w: f64| a + (b - a) * w;

        let (i0, j0, k0) = (lo[0], lo[1], lo[2]);
        let (i1, j1, k1) = (hi(0), hi(1), hi(2));

        let c00 = lerp(v(i0, j0, k0), v(i1, j0, k0), t[0]);
        let c10 = lerp(v(i0, j1, k0), v(i1, j1, k0), t[0]);
        let c01 = lerp(v(i0, j0, k1), v(i1, j0, k1), t[0]);
        let c11 = lerp(v(i0, j1, k1), v(i1, j1, k1), t[0]);

        lerp(lerp(c00, c10, t[1]), lerp(c01, c11, t[1]), t[2])
    }
}

fn checked_product(dims: [usize; 3]) -> Option<usize> {
    dims.iter().try_fold(1usize, |acc, &n| acc.checked_mul(n))
}
