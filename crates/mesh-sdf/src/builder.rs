//! Fluent builder for distance field generation.
//!
//! # Example
//!
//! ```
//! use mesh_sdf::{GridSpec, Mesh, SdfBuilder, Vertex};
//!
//! // A single tetrahedron.
//! let mut mesh = Mesh::new();
//! for (x, y, z) in [(0.0, 0.0, 0.0), (1.0, 0.0, 0.0), (0.0, 1.0, 0.0), (0.0, 0.0, 1.0)] {
//!     mesh.vertices.push(Vertex::from_coords(x, y, z));
//! }
//! mesh.faces = vec![[0, 2, 1], [0, 1, 3], [0, 3, 2], [1, 2, 3]];
//!
//! let spec = GridSpec::from_mesh(&mesh, 0.1, 2, 1_000_000)?;
//! let output = SdfBuilder::new(&mesh, spec)
//!     .max_sweep_cycles(8)
//!     .build()?;
//!
//! assert!(output.stats.converged);
//! assert!(output.field.min_value() < 0.0);
//! # Ok::<(), mesh_sdf::SdfError>(())
//! ```

use tracing::{debug, info};

use crate::config::SdfParams;
use crate::error::{SdfError, SdfResult};
use crate::grid::{DistanceField, GridSpec};
use crate::propagate::{SweepMode, SweepOutcome, UnsignedField};
use crate::sign::ParityGrid;
use crate::tracing_ext::OperationTimer;
use crate::types::{Mesh, Triangle};

const DEGENERATE_EPSILON: f64 = 1e-12;

/// Statistics from a distance field run.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "config", derive(serde::Serialize))]
pub struct SdfStats {
    /// Grid points given an exact distance by the scan (or corner seeding).
    pub seeded_points: usize,
    /// Sweep cycles executed; zero in scan-only mode.
    pub sweep_cycles: usize,
    /// Whether the sweep reached a fixed point.
    pub converged: bool,
    /// Points still changing when the sweep stopped, or never reached in
    /// scan-only mode.
    pub unconverged_points: usize,
    /// Grid points classified as inside.
    pub inside_points: usize,
    /// Column/triangle crossings found by the sign pass.
    pub piercings: usize,
    /// Zero-area input triangles. They affect distances but never the sign.
    pub degenerate_triangles: usize,
    /// Wall-clock time of the whole run.
    pub elapsed_ms: f64,
}

/// A finished field together with its run statistics.
#[derive(Debug, Clone)]
pub struct SdfOutput {
    pub field: DistanceField,
    pub stats: SdfStats,
}

/// Fluent builder for signed distance fields.
pub struct SdfBuilder<'a> {
    mesh: &'a Mesh,
    spec: GridSpec,
    params: SdfParams,
}

impl<'a> SdfBuilder<'a> {
    /// Create a builder for `mesh` sampled on `spec`, with default parameters.
    pub fn new(mesh: &'a Mesh, spec: GridSpec) -> Self {
        Self {
            mesh,
            spec,
            params: SdfParams::default(),
        }
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    /// Replace all parameters.
    pub fn params(mut self, params: SdfParams) -> Self {
        self.params = params;
        self
    }

    /// Cells around each triangle that receive exact distances.
    pub fn exact_band(mut self, cells: usize) -> Self {
        self.params.exact_band = cells;
        self
    }

    /// Upper bound on sweep cycles.
    pub fn max_sweep_cycles(mut self, cycles: usize) -> Self {
        self.params.max_sweep_cycles = cycles;
        self
    }

    /// Enable or disable the sweep phase.
    pub fn sweep(mut self, mode: SweepMode) -> Self {
        self.params.sweep = mode;
        self
    }

    /// Use rayon for the scan and sign passes.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.params.parallel = parallel;
        self
    }

    // =========================================================================
    // Execution
    // =========================================================================

    /// Compute the field.
    ///
    /// The mesh and grid are checked before any work starts; a failure
    /// never yields a partial field.
    pub fn build(self) -> SdfResult<SdfOutput> {
        let Self { mesh, spec, params } = self;

        mesh.validate()?;
        spec.validate()?;
        // An overflowing point count is reported as usize::MAX.
        match spec.checked_total_points() {
            Some(total) if total <= params.max_voxels => {}
            total => {
                return Err(SdfError::GridTooLarge {
                    dims: spec.dims,
                    total: total.unwrap_or(usize::MAX),
                    max: params.max_voxels,
                });
            }
        }

        let timer = OperationTimer::with_grid("make_level_set", &spec);
        let triangles: Vec<Triangle> = mesh.triangles().collect();

        let degenerate_triangles = triangles
            .iter()
            .filter(|t| t.is_degenerate(DEGENERATE_EPSILON))
            .count();
        if degenerate_triangles > 0 {
            debug!(
                degenerate = degenerate_triangles,
                "Zero-area triangles are measured by their edges"
            );
        }
        let mut stats = SdfStats {
            degenerate_triangles,
            ..SdfStats::default()
        };
        let ((unsigned, sweep), parity) = if params.parallel {
            rayon::join(
                || unsigned_distances(&triangles, &spec, &params),
                || sign_pass(&triangles, &spec, true),
            )
        } else {
            (
                unsigned_distances(&triangles, &spec, &params),
                sign_pass(&triangles, &spec, false),
            )
        };
        stats.seeded_points = unsigned.seeded();
        stats.sweep_cycles = sweep.cycles;
        stats.converged = sweep.converged;
        stats.unconverged_points = sweep.unconverged_points;
        stats.piercings = parity.piercings();

        let values = {
            let _timer = OperationTimer::new("combine");
            combine(unsigned.distances(), parity.flags())
        };
        stats.inside_points = parity.inside_count();
        stats.elapsed_ms = timer.elapsed_ms();

        let field = DistanceField::from_values(spec, values)?;
        info!(
            dims = ?spec.dims,
            min = field.min_value(),
            max = field.max_value(),
            inside = stats.inside_points,
            converged = stats.converged,
            "Distance field computed"
        );

        Ok(SdfOutput { field, stats })
    }
}

fn unsigned_distances(
    triangles: &[Triangle],
    spec: &GridSpec,
    params: &SdfParams,
) -> (UnsignedField, SweepOutcome) {
    let mut field = UnsignedField::new(*spec);
    {
        let _timer = OperationTimer::with_grid("scan", spec);
        field.scan(triangles, params.exact_band, params.parallel);
    }

    let outcome = match params.sweep {
        SweepMode::Enabled => {
            let _timer = OperationTimer::with_grid("sweep", spec);
            field.sweep(params.max_sweep_cycles)
        }
        SweepMode::Disabled => SweepOutcome {
            cycles: 0,
            converged: false,
            unconverged_points: spec.total_points() - field.seeded(),
        },
    };
    (field, outcome)
}

fn sign_pass(triangles: &[Triangle], spec: &GridSpec, parallel: bool) -> ParityGrid {
    let _timer = OperationTimer::with_grid("sign", spec);
    ParityGrid::compute(triangles, spec, parallel)
}

/// Apply inside/outside flags to unsigned distances.
///
/// Inside points with a positive distance become negative; an exact zero
/// stays `+0.0`. Points never reached hold `f32::MAX` in magnitude.
pub fn combine(distances: &[f64], inside: &[bool]) -> Vec<f32> {
    distances
        .iter()
        .zip(inside)
        .map(|(&d, &inside)| {
            let magnitude = if d.is_finite() { d as f32 } else { f32::MAX };
            if inside && magnitude > 0.0 {
                -magnitude
            } else {
                magnitude
            }
        })
        .collect()
}

/// Compute a signed distance field with default parameters.
pub fn make_level_set(mesh: &Mesh, spec: &GridSpec) -> SdfResult<DistanceField> {
    SdfBuilder::new(mesh, *spec).build().map(|out| out.field)
}

/// Size a grid around `mesh` and compute its field.
///
/// `padding_cells` below one is raised to one.
pub fn generate_sdf(
    mesh: &Mesh,
    dx: f64,
    padding_cells: usize,
    params: &SdfParams,
) -> SdfResult<SdfOutput> {
    mesh.validate()?;
    let spec = GridSpec::from_mesh(mesh, dx, padding_cells, params.max_voxels)?;
    SdfBuilder::new(mesh, spec).params(params.clone()).build()
}
