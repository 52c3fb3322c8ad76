//! JavaScript asset output.
//!
//! A distance field is written as a `let asset = {...}` block and spliced
//! into a user-supplied template wherever [`SDF_PLACEHOLDER`] appears:
//!
//! ```text
//! let asset = {
//!      metadata: { ORIG: [-0.7, -0.7, -0.7],
//!                  EDGE: [1.4, 1.4, 1.4],
//!                  GRES: [14, 14, 14] },
//!      data: new Float32Array( [ 0.6928203, 0.6403124, ... ] )
//! };
//! ```
//!
//! `ORIG` is the world position of grid point (0, 0, 0), `EDGE` the world
//! size `dims * dx` and `GRES` the point counts. Data is in grid order,
//! `i` fastest.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{SdfError, SdfResult};
use crate::grid::DistanceField;
use crate::tracing_ext::log_io_operation;

/// Marker replaced by the asset block.
pub const SDF_PLACEHOLDER: &str = "${SDF}";

/// Render the asset block for a field.
pub fn render_asset(field: &DistanceField) -> String {
    let spec = field.spec();
    let edge = spec.extent();
    let [ni, nj, nk] = spec.dims;

    // Roughly ten characters per value.
    let mut out = String::with_capacity(field.values().len() * 11 + 256);
    out.push_str("\tlet asset = {\n");
    // Writing to a String cannot fail.
    let _ = writeln!(
        out,
        "\t\t metadata: {{ ORIG: [{}, {}, {}],",
        spec.origin.x as f32, spec.origin.y as f32, spec.origin.z as f32
    );
    let _ = writeln!(
        out,
        "\t\t             EDGE: [{}, {}, {}],",
        edge.x as f32, edge.y as f32, edge.z as f32
    );
    let _ = writeln!(out, "\t\t             GRES: [{}, {}, {}] }},", ni, nj, nk);
    out.push_str("\t\t data: new Float32Array( [ ");
    for (idx, value) in field.values().iter().enumerate() {
        if idx > 0 {
            out.push_str(", ");
        }
        let _ = write!(out, "{}", value);
    }
    out.push_str(" ] )\n\t};\n");
    out
}

/// Replace every placeholder in `template` with `asset`.
pub fn fill_template(template: &str, asset: &str) -> SdfResult<String> {
    if !template.contains(SDF_PLACEHOLDER) {
        return Err(SdfError::MissingPlaceholder {
            placeholder: SDF_PLACEHOLDER,
        });
    }
    Ok(template.replace(SDF_PLACEHOLDER, asset))
}

/// Render `field` into the template at `template_path` and write `output_path`.
///
/// Returns the number of bytes written.
pub fn write_template_output(
    field: &DistanceField,
    template_path: &Path,
    output_path: &Path,
) -> SdfResult<usize> {
    let template =
        std::fs::read_to_string(template_path).map_err(|e| SdfError::io_read(template_path, e))?;
    debug!(
        template = %template_path.display(),
        bytes = template.len(),
        "Template read"
    );

    let mut generated = fill_template(&template, &render_asset(field))?;
    generated.push('\n');

    std::fs::write(output_path, &generated).map_err(|e| SdfError::io_write(output_path, e))?;
    log_io_operation("write", output_path, Some(generated.len()));
    Ok(generated.len())
}

/// Output path for an input mesh: the same path with an `.html` extension.
pub fn default_output_path(input: &Path) -> PathBuf {
    input.with_extension("html")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridSpec;
    use nalgebra::Point3;

    fn small_field() -> DistanceField {
        let spec = GridSpec::new(Point3::new(-1.0, 0.5, 2.0), 0.5, [2, 1, 2]).unwrap();
        DistanceField::from_values(spec, vec![-0.25, 0.5, 1.0, 1.5]).unwrap()
    }

    #[test]
    fn test_render_asset() {
        let asset = render_asset(&small_field());
        assert!(asset.starts_with("\tlet asset = {\n"));
        assert!(asset.contains("ORIG: [-1, 0.5, 2],"));
        assert!(asset.contains("EDGE: [1, 0.5, 1],"));
        assert!(asset.contains("GRES: [2, 1, 2] },"));
        assert!(asset.contains("new Float32Array( [ -0.25, 0.5, 1, 1.5 ] )"));
        assert!(asset.trim_end().ends_with("};"));
    }

    #[test]
    fn test_fill_template_replaces_all() {
        let out = fill_template("<a>${SDF}</a><b>${SDF}</b>", "X").unwrap();
        assert_eq!(out, "<a>X</a><b>X</b>");
    }

    #[test]
    fn test_missing_placeholder() {
        let err = fill_template("<html></html>", "X").unwrap_err();
        assert!(matches!(err, SdfError::MissingPlaceholder { .. }));
        assert_eq!(err.code().as_str(), "SDF-3001");
    }

    #[test]
    fn test_write_template_output() {
        let dir = tempfile::tempdir().unwrap();
        let template = dir.path().join("view.html");
        std::fs::write(&template, "<script>\n${SDF}\n</script>").unwrap();
        let output = dir.path().join("out.html");

        let bytes = write_template_output(&small_field(), &template, &output).unwrap();
        let written = std::fs::read_to_string(&output).unwrap();
        assert_eq!(bytes, written.len());
        assert!(written.starts_with("<script>\n\tlet asset"));
        assert!(written.ends_with("</script>\n"));
        assert!(!written.contains(SDF_PLACEHOLDER));
    }

    #[test]
    fn test_write_template_missing_template() {
        let dir = tempfile::tempdir().unwrap();
        let err = write_template_output(
            &small_field(),
            &dir.path().join("missing.html"),
            &dir.path().join("out.html"),
        )
        .unwrap_err();
        assert!(matches!(err, SdfError::IoRead { .. }));
    }

    #[test]
    fn test_default_output_path() {
        assert_eq!(
            default_output_path(Path::new("models/bunny.obj")),
            PathBuf::from("models/bunny.html")
        );
    }
}
