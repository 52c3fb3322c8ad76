//! sdfgen generate command - build a distance field and fill a template.

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use mesh_sdf::{
    Mesh, MeshFormat, SdfError, SdfParams, SdfStats, SweepMode, default_output_path,
    generate_sdf, write_template_output,
};
use serde::Serialize;

use crate::{Cli, OutputFormat, output};

#[derive(Serialize)]
struct GenerateResult {
    input: String,
    template: String,
    output: String,
    success: bool,
    faces: usize,
    dx: f64,
    dims: [usize; 3],
    origin: [f64; 3],
    voxels: usize,
    min_value: f32,
    max_value: f32,
    bytes_written: usize,
    stats: SdfStats,
}

#[allow(clippy::too_many_arguments)]
pub fn run(
    input: &Path,
    template: &Path,
    dx: f64,
    padding: usize,
    output_path: Option<&Path>,
    config: Option<&Path>,
    no_sweep: bool,
    serial: bool,
    cli: &Cli,
) -> Result<()> {
    // Only OBJ input is accepted; reject anything else before touching the file.
    if MeshFormat::from_path(input).is_none() {
        return Err(SdfError::UnsupportedFormat {
            extension: input.extension().and_then(|e| e.to_str()).map(String::from),
        }
        .into());
    }

    let mut params = match config {
        Some(path) => SdfParams::from_file(path)
            .with_context(|| format!("Failed to load parameters from {:?}", path))?,
        None => SdfParams::default(),
    };
    if no_sweep {
        params.sweep = SweepMode::Disabled;
    }
    if serial {
        params.parallel = false;
    }

    let mesh =
        Mesh::load(input).with_context(|| format!("Failed to load mesh from {:?}", input))?;

    output::info(
        &format!(
            "Generating distance field for {} triangles (dx = {})...",
            mesh.face_count(),
            dx
        ),
        cli.format,
        cli.quiet,
    );

    let result = generate_sdf(&mesh, dx, padding, &params)?;
    let field = &result.field;
    let spec = *field.spec();

    let output_path = output_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_output_path(input));
    let bytes_written = write_template_output(field, template, &output_path)
        .with_context(|| format!("Failed to write output to {:?}", output_path))?;

    let report = GenerateResult {
        input: input.display().to_string(),
        template: template.display().to_string(),
        output: output_path.display().to_string(),
        success: true,
        faces: mesh.face_count(),
        dx,
        dims: spec.dims,
        origin: [spec.origin.x, spec.origin.y, spec.origin.z],
        voxels: spec.total_points(),
        min_value: field.min_value(),
        max_value: field.max_value(),
        bytes_written,
        stats: result.stats,
    };

    match cli.format {
        OutputFormat::Json => {
            output::print(&report, cli.format, cli.quiet);
        }
        OutputFormat::Text => {
            if !cli.quiet {
                output::success(
                    &format!("Distance field written to {}", output_path.display()),
                    cli.format,
                    cli.quiet,
                );
                println!(
                    "  {}: {} x {} x {} ({} voxels)",
                    "Grid".cyan(),
                    report.dims[0],
                    report.dims[1],
                    report.dims[2],
                    report.voxels
                );
                println!(
                    "  {}: ({:.4}, {:.4}, {:.4})",
                    "Origin".cyan(),
                    report.origin[0],
                    report.origin[1],
                    report.origin[2]
                );
                println!(
                    "  {}: {:.4} .. {:.4}",
                    "Range".cyan(),
                    report.min_value,
                    report.max_value
                );
                println!(
                    "  {}: {} inside, {} seeded",
                    "Points".cyan(),
                    report.stats.inside_points,
                    report.stats.seeded_points
                );
                let sweep = if params.sweep == SweepMode::Disabled {
                    "disabled".yellow()
                } else if report.stats.converged {
                    format!("converged in {} cycles", report.stats.sweep_cycles)
                        .as_str()
                        .green()
                } else {
                    format!(
                        "stopped after {} cycles, {} points unconverged",
                        report.stats.sweep_cycles, report.stats.unconverged_points
                    )
                    .as_str()
                    .yellow()
                };
                println!("  {}: {}", "Sweep".cyan(), sweep);
                println!("  {}: {:.1} ms", "Time".cyan(), report.stats.elapsed_ms);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    const TETRAHEDRON: &str = "v 0 0 0\nv 1 0 0\nv 0 1 0\nv 0 0 1\n\
                               f 1 3 2\nf 1 2 4\nf 1 4 3\nf 2 3 4\n";

    fn quiet_cli() -> Cli {
        Cli::try_parse_from(["sdfgen", "-q", "info", "x.obj", "0.1", "1"]).unwrap()
    }

    #[test]
    fn test_generate_writes_default_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("tet.obj");
        let template = dir.path().join("view.html");
        std::fs::write(&input, TETRAHEDRON).unwrap();
        std::fs::write(&template, "<script>${SDF}</script>").unwrap();

        run(&input, &template, 0.25, 1, None, None, false, true, &quiet_cli()).unwrap();

        let written = std::fs::read_to_string(dir.path().join("tet.html")).unwrap();
        assert!(written.starts_with("<script>\tlet asset = {"));
        assert!(written.contains("GRES: "));
    }

    #[test]
    fn test_generate_rejects_non_obj() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("tet.stl");
        let template = dir.path().join("view.html");
        let err = run(&input, &template, 0.1, 1, None, None, false, false, &quiet_cli())
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SdfError>(),
            Some(SdfError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn test_generate_tiny_cell_size() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("tet.obj");
        let template = dir.path().join("view.html");
        std::fs::write(&input, TETRAHEDRON).unwrap();
        std::fs::write(&template, "${SDF}").unwrap();

        let err = run(&input, &template, 1e-7, 1, None, None, false, false, &quiet_cli())
            .unwrap_err();
        let sdf_err = err.downcast_ref::<SdfError>().unwrap();
        assert!(matches!(sdf_err, SdfError::GridTooLarge { .. }));
        assert!(matches!(
            sdf_err.recovery_suggestion(),
            mesh_sdf::RecoverySuggestion::IncreaseCellSize { factor } if factor.is_finite()
        ));
        assert!(!dir.path().join("tet.html").exists());
    }

    #[test]
    fn test_generate_missing_placeholder() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("tet.obj");
        let template = dir.path().join("view.html");
        let out = dir.path().join("out.html");
        std::fs::write(&input, TETRAHEDRON).unwrap();
        std::fs::write(&template, "<html></html>").unwrap();

        let err = run(
            &input,
            &template,
            0.25,
            1,
            Some(&out),
            None,
            true,
            false,
            &quiet_cli(),
        )
        .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SdfError>(),
            Some(SdfError::MissingPlaceholder { .. })
        ));
        assert!(!out.exists());
    }
}
