//! Timing and structured logging helpers.
//!
//! Everything here logs through `tracing`; install a subscriber to see it.
//! Phase timings use the `mesh_sdf::timing` target:
//!
//! ```text
//! RUST_LOG=mesh_sdf::timing=info sdfgen generate bunny.obj view.html 0.01 2
//! ```

use std::time::Instant;
use tracing::{Span, debug, info};

use crate::grid::GridSpec;
use crate::types::Mesh;

/// A timer that logs its duration on drop.
///
/// ```
/// use mesh_sdf::tracing_ext::OperationTimer;
///
/// let timer = OperationTimer::new("scan");
/// assert!(timer.elapsed_ms() >= 0.0);
/// ```
pub struct OperationTimer {
    name: &'static str,
    start: Instant,
    span: Span,
}

impl OperationTimer {
    /// Start timing a named operation.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!("sdf_operation", operation = name);
        debug!(target: "mesh_sdf::timing", operation = name, "Starting operation");
        Self {
            name,
            start: Instant::now(),
            span,
        }
    }

    /// Start timing with the grid size attached to the span.
    pub fn with_grid(name: &'static str, spec: &GridSpec) -> Self {
        let span = tracing::info_span!(
            "sdf_operation",
            operation = name,
            points = spec.total_points()
        );
        debug!(
            target: "mesh_sdf::timing",
            operation = name,
            dims = ?spec.dims,
            "Starting operation"
        );
        Self {
            name,
            start: Instant::now(),
            span,
        }
    }

    /// Milliseconds since the timer started.
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }

    pub fn span(&self) -> &Span {
        &self.span
    }
}

impl Drop for OperationTimer {
    fn drop(&mut self) {
        info!(
            target: "mesh_sdf::timing",
            operation = self.name,
            elapsed_ms = format!("{:.2}", self.elapsed_ms()),
            "Operation completed"
        );
    }
}

/// Log mesh size and extent at debug level.
pub fn log_mesh_stats(mesh: &Mesh, context: &str) {
    let size = mesh
        .bounds()
        .map(|(min, max)| max - min)
        .unwrap_or_else(nalgebra::Vector3::zeros);
    debug!(
        target: "mesh_sdf::mesh_state",
        context = context,
        vertices = mesh.vertex_count(),
        faces = mesh.face_count(),
        dimensions = format!("{:.3} x {:.3} x {:.3}", size.x, size.y, size.z),
        "Mesh state"
    );
}

/// Log a completed file operation.
pub fn log_io_operation(operation: &str, path: &std::path::Path, bytes: Option<usize>) {
    info!(
        target: "mesh_sdf::io",
        operation = operation,
        path = path.display().to_string(),
        bytes = bytes,
        "I/O operation completed"
    );
}
