//! Dense signed distance fields from closed triangle meshes.
//!
//! Given a triangle mesh and a regular grid, this crate computes at every
//! grid point the Euclidean distance to the surface, negative inside and
//! positive outside.
//!
//! # How it works
//!
//! - **Scan**: each triangle computes exact point-to-triangle distances for
//!   the grid points in a small box around it.
//! - **Sweep**: the closest surface points found so far are propagated
//!   across the grid in eight diagonal orders until nothing changes, so
//!   points far from every triangle still get an accurate distance.
//! - **Sign**: rays along +k through every (i, j) column count crossings
//!   with the surface; an odd count below a point means inside.
//!
//! The sign is only meaningful for closed, consistently oriented meshes.
//! That is assumed, not checked.
//!
//! # Quick Start
//!
//! ```no_run
//! use mesh_sdf::{Mesh, SdfParams, generate_sdf, write_template_output};
//! use std::path::Path;
//!
//! let mesh = Mesh::load("bunny.obj")?;
//! let output = generate_sdf(&mesh, 0.01, 2, &SdfParams::default())?;
//! println!(
//!     "{:?} grid, {} points inside",
//!     output.field.spec().dims,
//!     output.stats.inside_points
//! );
//! write_template_output(&output.field, Path::new("view.html"), Path::new("bunny.html"))?;
//! # Ok::<(), mesh_sdf::SdfError>(())
//! ```
//!
//! # Grid layout
//!
//! Grid point `(i, j, k)` sits at `origin + dx * (i, j, k)`. Values are
//! stored flat with `i` varying fastest, then `j`, then `k`.
//!
//! # Features
//!
//! - `config` (default): serde support for [`SdfParams`] with TOML and
//!   JSON helpers.

pub mod builder;
pub mod config;
pub mod error;
pub mod geometry;
pub mod grid;
pub mod io;
pub mod propagate;
pub mod raster;
pub mod sign;
pub mod template;
pub mod tracing_ext;
mod types;

pub use builder::{SdfBuilder, SdfOutput, SdfStats, combine, generate_sdf, make_level_set};
#[cfg(feature = "config")]
pub use config::ConfigError;
pub use config::SdfParams;
pub use error::{ErrorCode, ErrorLocation, RecoverySuggestion, SdfError, SdfResult};
pub use geometry::{
    ClosestPoint, TriangleFeature, closest_point_on_triangle, orientation_2d,
    point_in_triangle_2d, point_segment_distance, point_triangle_distance,
};
pub use grid::{DistanceField, GridSpec};
pub use io::{MeshFormat, load_mesh, load_obj};
pub use propagate::{SweepMode, SweepOutcome, UnsignedField};
pub use raster::{IndexBox, RASTER_MARGIN, triangle_index_box};
pub use sign::ParityGrid;
pub use template::{
    SDF_PLACEHOLDER, default_output_path, fill_template, render_asset, write_template_output,
};
pub use types::{Mesh, Triangle, Vertex};
