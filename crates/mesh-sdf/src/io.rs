//! Mesh loading.
//!
//! Only Wavefront OBJ is read. Polygons are fan-triangulated by `tobj` and
//! every object in the file is merged into a single [`Mesh`].

use std::fs::File;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::error::{SdfError, SdfResult};
use crate::tracing_ext::log_mesh_stats;
use crate::types::{Mesh, Vertex};

/// Supported mesh file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshFormat {
    Obj,
}

impl MeshFormat {
    /// Detect format from file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase())
            .and_then(|ext| match ext.as_str() {
                "obj" => Some(MeshFormat::Obj),
                _ => None,
            })
    }
}

/// Load a mesh from file, choosing the reader by extension.
pub fn load_mesh(path: &Path) -> SdfResult<Mesh> {
    let format = MeshFormat::from_path(path).ok_or_else(|| SdfError::UnsupportedFormat {
        extension: path.extension().and_then(|e| e.to_str()).map(String::from),
    })?;

    info!(path = %path.display(), format = ?format, "Loading mesh");

    let mesh = match format {
        MeshFormat::Obj => load_obj(path)?,
    };

    if let Some((min, max)) = mesh.bounds() {
        let size = max - min;
        info!(
            vertices = mesh.vertex_count(),
            faces = mesh.face_count(),
            "Loaded mesh"
        );
        if size.x.max(size.y).max(size.z) == 0.0 {
            warn!("Mesh has zero extent; all vertices coincide");
        }
    }
    log_mesh_stats(&mesh, "loaded");

    Ok(mesh)
}

/// Load a Wavefront OBJ file.
///
/// Faces with more than three corners are triangulated. Index errors,
/// empty files and non-finite coordinates are rejected.
pub fn load_obj(path: &Path) -> SdfResult<Mesh> {
    // tobj folds open failures into its own error type; check first so a
    // missing file is reported as a read error with its cause.
    File::open(path).map_err(|e| SdfError::io_read(path, e))?;

    let (models, _materials) = tobj::load_obj(
        path,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
    )
    .map_err(|e| SdfError::parse_error(path, e.to_string()))?;

    if models.is_empty() {
        return Err(SdfError::empty_mesh("OBJ file contains no geometry"));
    }

    let vertex_total = models.iter().map(|m| m.mesh.positions.len() / 3).sum();
    let face_total = models.iter().map(|m| m.mesh.indices.len() / 3).sum();
    let mut mesh = Mesh::with_capacity(vertex_total, face_total);

    for model in &models {
        let offset = u32::try_from(mesh.vertices.len()).map_err(|_| {
            SdfError::parse_error(path, "more vertices than a 32-bit index can address")
        })?;
        debug!(
            model = %model.name,
            vertices = model.mesh.positions.len() / 3,
            faces = model.mesh.indices.len() / 3,
            "OBJ model"
        );

        mesh.vertices.extend(
            model
                .mesh
                .positions
                .chunks_exact(3)
                .map(|c| Vertex::from_coords(c[0] as f64, c[1] as f64, c[2] as f64)),
        );
        mesh.faces.extend(
            model
                .mesh
                .indices
                .chunks_exact(3)
                .map(|c| [c[0] + offset, c[1] + offset, c[2] + offset]),
        );
    }

    debug!(
        vertices = mesh.vertex_count(),
        faces = mesh.face_count(),
        models = models.len(),
        "OBJ loaded"
    );

    mesh.validate()?;
    Ok(mesh)
}

impl Mesh {
    /// Load a mesh from file.
    ///
    /// ```no_run
    /// use mesh_sdf::Mesh;
    ///
    /// let mesh = Mesh::load("bunny.obj")?;
    /// println!("{} triangles", mesh.face_count());
    /// # Ok::<(), mesh_sdf::SdfError>(())
    /// ```
    pub fn load(path: impl AsRef<Path>) -> SdfResult<Self> {
        load_mesh(path.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_obj(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::with_suffix(".obj").unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_tetrahedron() {
        let file = write_obj(
            "v 0 0 0\nv 1 0 0\nv 0 1 0\nv 0 0 1\n\
             f 1 3 2\nf 1 2 4\nf 1 4 3\nf 2 3 4\n",
        );
        let mesh = load_mesh(file.path()).unwrap();
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.face_count(), 4);
        assert!((mesh.signed_volume() - 1.0 / 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_quads_are_triangulated() {
        let file = write_obj("v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4\n");
        let mesh = Mesh::load(file.path()).unwrap();
        assert_eq!(mesh.face_count(), 2);
        assert!((mesh.surface_area() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_objects_are_merged() {
        let file = write_obj(
            "o a\nv 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n\
             o b\nv 0 0 5\nv 1 0 5\nv 0 1 5\nf 4 5 6\n",
        );
        let mesh = load_mesh(file.path()).unwrap();
        assert_eq!(mesh.vertex_count(), 6);
        assert_eq!(mesh.face_count(), 2);
        let second = mesh.triangle(1).unwrap();
        assert_eq!(second.v0.z, 5.0);
    }

    #[test]
    fn test_unsupported_extension() {
        let err = load_mesh(Path::new("model.stl")).unwrap_err();
        match err {
            SdfError::UnsupportedFormat { extension } => {
                assert_eq!(extension.as_deref(), Some("stl"));
            }
            other => panic!("Expected UnsupportedFormat, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_file() {
        let err = load_mesh(Path::new("/nonexistent/dir/model.obj")).unwrap_err();
        assert!(matches!(err, SdfError::IoRead { .. }));
    }

    #[test]
    fn test_vertices_without_faces() {
        let file = write_obj("v 0 0 0\nv 1 0 0\nv 0 1 0\n");
        assert!(load_mesh(file.path()).is_err());
    }
}
