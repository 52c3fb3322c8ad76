//! sdfgen info command - mesh statistics and the grid that would be built.

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use mesh_sdf::{GridSpec, Mesh};
use serde::Serialize;

use crate::{Cli, OutputFormat, output};

#[derive(Serialize)]
struct MeshInfo {
    path: String,
    vertices: usize,
    faces: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    bounds: Option<BoundsInfo>,
    surface_area: f64,
    signed_volume: f64,
    grid: GridInfo,
}

#[derive(Serialize)]
struct BoundsInfo {
    min: [f64; 3],
    max: [f64; 3],
    dimensions: [f64; 3],
}

#[derive(Serialize)]
struct GridInfo {
    dx: f64,
    padding: usize,
    dims: [usize; 3],
    origin: [f64; 3],
    /// `None` when the point count overflows `usize`.
    voxels: Option<usize>,
    /// Size of the `f32` values alone.
    field_bytes: Option<usize>,
}

pub fn run(input: &Path, dx: f64, padding: usize, cli: &Cli) -> Result<()> {
    let mesh =
        Mesh::load(input).with_context(|| format!("Failed to load mesh from {:?}", input))?;

    // Sizing only; the voxel limit applies when the field is generated.
    let spec = GridSpec::from_mesh(&mesh, dx, padding, usize::MAX)?;

    let bounds = mesh.bounds().map(|(min, max)| {
        let dims = max - min;
        BoundsInfo {
            min: [min.x, min.y, min.z],
            max: [max.x, max.y, max.z],
            dimensions: [dims.x, dims.y, dims.z],
        }
    });

    let voxels = spec.checked_total_points();
    let info = MeshInfo {
        path: input.display().to_string(),
        vertices: mesh.vertex_count(),
        faces: mesh.face_count(),
        bounds,
        surface_area: mesh.surface_area(),
        signed_volume: mesh.signed_volume(),
        grid: GridInfo {
            dx,
            padding: padding.max(1),
            dims: spec.dims,
            origin: [spec.origin.x, spec.origin.y, spec.origin.z],
            voxels,
            field_bytes: voxels.and_then(|n| n.checked_mul(std::mem::size_of::<f32>())),
        },
    };

    match cli.format {
        OutputFormat::Json => {
            output::print(&info, cli.format, cli.quiet);
        }
        OutputFormat::Text => {
            if !cli.quiet {
                println!("{}", "Mesh Information".bold().underline());
                println!("  {}: {}", "File".cyan(), input.display());
                println!("  {}: {}", "Vertices".cyan(), info.vertices);
                println!("  {}: {}", "Faces".cyan(), info.faces);

                if let Some(ref b) = info.bounds {
                    println!(
                        "  {}: {:.4} x {:.4} x {:.4}",
                        "Dimensions".cyan(),
                        b.dimensions[0],
                        b.dimensions[1],
                        b.dimensions[2]
                    );
                    println!(
                        "  {}: ({:.4}, {:.4}, {:.4})",
                        "Min bounds".cyan(),
                        b.min[0],
                        b.min[1],
                        b.min[2]
                    );
                    println!(
                        "  {}: ({:.4}, {:.4}, {:.4})",
                        "Max bounds".cyan(),
                        b.max[0],
                        b.max[1],
                        b.max[2]
                    );
                }
                println!("  {}: {:.4}", "Surface area".cyan(), info.surface_area);
                println!("  {}: {:.4}", "Signed volume".cyan(), info.signed_volume);
                if info.signed_volume < 0.0 {
                    println!(
                        "  {}",
                        "Negative volume: faces may be wound inward".yellow()
                    );
                }

                let g = &info.grid;
                println!();
                println!("{}", "Distance Grid".bold().underline());
                println!(
                    "  {}: {} (padding {} cells)",
                    "Cell size".cyan(),
                    g.dx,
                    g.padding
                );
                println!(
                    "  {}: {} x {} x {}",
                    "Resolution".cyan(),
                    g.dims[0],
                    g.dims[1],
                    g.dims[2]
                );
                println!(
                    "  {}: ({:.4}, {:.4}, {:.4})",
                    "Origin".cyan(),
                    g.origin[0],
                    g.origin[1],
                    g.origin[2]
                );
                match (g.voxels, g.field_bytes) {
                    (Some(voxels), Some(bytes)) => {
                        println!("  {}: {}", "Voxels".cyan(), voxels);
                        println!(
                            "  {}: {:.1} MiB",
                            "Field size".cyan(),
                            bytes as f64 / (1024.0 * 1024.0)
                        );
                    }
                    (Some(voxels), None) => {
                        println!("  {}: {}", "Voxels".cyan(), voxels);
                        println!("  {}", "Field size overflows memory".yellow());
                    }
                    _ => println!("  {}", "Voxel count overflows: increase dx".yellow()),
                }
            }
        }
    }

    Ok(())
}
