//! End-to-end tests for distance field generation.
//!
//! Run with: cargo test -p mesh-sdf --test integration_tests

use std::io::Write;

use mesh_sdf::{
    DistanceField, GridSpec, Mesh, SdfBuilder, SdfError, SdfParams, SweepMode, Vertex,
    default_output_path, generate_sdf, load_mesh, make_level_set, write_template_output,
};
use nalgebra::Point3;
use tempfile::NamedTempFile;

// =============================================================================
// Test Mesh Creation Helpers
// =============================================================================

/// Axis-aligned box centred on the origin, outward winding.
fn create_box(half: f64) -> Mesh {
    let mut mesh = Mesh::new();
    for &(x, y, z) in &[
        (-1.0, -1.0, -1.0),
        (1.0, -1.0, -1.0),
        (1.0, 1.0, -1.0),
        (-1.0, 1.0, -1.0),
        (-1.0, -1.0, 1.0),
        (1.0, -1.0, 1.0),
        (1.0, 1.0, 1.0),
        (-1.0, 1.0, 1.0),
    ] {
        mesh.vertices
            .push(Vertex::from_coords(x * half, y * half, z * half));
    }
    mesh.faces = vec![
        [0, 2, 1],
        [0, 3, 2], // bottom
        [4, 5, 6],
        [4, 6, 7], // top
        [0, 1, 5],
        [0, 5, 4], // front
        [3, 7, 6],
        [3, 6, 2], // back
        [0, 4, 7],
        [0, 7, 3], // left
        [1, 2, 6],
        [1, 6, 5], // right
    ];
    mesh
}

/// Unit icosphere with outward winding.
fn create_sphere(subdivisions: u32) -> Mesh {
    use std::collections::HashMap;

    let phi = (1.0 + 5.0_f64.sqrt()) / 2.0;
    let (a, b) = (1.0, 1.0 / phi);
    let ico = [
        [0.0, b, -a],
        [b, a, 0.0],
        [-b, a, 0.0],
        [0.0, b, a],
        [0.0, -b, a],
        [-a, 0.0, b],
        [0.0, -b, -a],
        [a, 0.0, -b],
        [a, 0.0, b],
        [-a, 0.0, -b],
        [b, -a, 0.0],
        [-b, -a, 0.0],
    ];
    let mut mesh = Mesh::new();
    for v in &ico {
        let p = Point3::from(*v);
        mesh.vertices.push(Vertex::new(Point3::from(p.coords.normalize())));
    }
    mesh.faces = vec![
        [0, 2, 1],
        [3, 1, 2],
        [3, 5, 4],
        [3, 4, 8],
        [0, 7, 6],
        [0, 6, 9],
        [4, 11, 10],
        [6, 10, 11],
        [2, 9, 5],
        [11, 5, 9],
        [1, 8, 7],
        [10, 7, 8],
        [3, 2, 5],
        [3, 8, 1],
        [0, 9, 2],
        [0, 1, 7],
        [6, 11, 9],
        [6, 7, 10],
        [4, 5, 11],
        [4, 10, 8],
    ];

    for _ in 0..subdivisions {
        let mut next = Mesh::new();
        next.vertices = mesh.vertices.clone();
        let mut midpoints: HashMap<(u32, u32), u32> = HashMap::new();
        let mut midpoint = |v1: u32, v2: u32, vertices: &mut Vec<Vertex>| -> u32 {
            let key = (v1.min(v2), v1.max(v2));
            *midpoints.entry(key).or_insert_with(|| {
                let m = (vertices[v1 as usize].position.coords
                    + vertices[v2 as usize].position.coords)
                    .normalize();
                vertices.push(Vertex::new(Point3::from(m)));
                (vertices.len() - 1) as u32
            })
        };
        for &[v0, v1, v2] in &mesh.faces {
            let m01 = midpoint(v0, v1, &mut next.vertices);
            let m12 = midpoint(v1, v2, &mut next.vertices);
            let m20 = midpoint(v2, v0, &mut next.vertices);
            next.faces.push([v0, m01, m20]);
            next.faces.push([v1, m12, m01]);
            next.faces.push([v2, m20, m12]);
            next.faces.push([m01, m12, m20]);
        }
        mesh = next;
    }
    mesh
}

fn index_of(spec: &GridSpec, axis: usize, coord: f64) -> usize {
    ((coord - spec.origin[axis]) / spec.dx).round() as usize
}

fn center_index(spec: &GridSpec) -> [usize; 3] {
    [
        index_of(spec, 0, 0.0),
        index_of(spec, 1, 0.0),
        index_of(spec, 2, 0.0),
    ]
}

// =============================================================================
// Box Scenarios
// =============================================================================

#[test]
fn test_unit_cube_end_to_end() {
    let mesh = create_box(0.5);
    let output = generate_sdf(&mesh, 0.1, 2, &SdfParams::default()).unwrap();
    let field = &output.field;
    let spec = field.spec();

    assert_eq!(spec.dims, [14, 14, 14]);
    assert!((spec.origin - Point3::new(-0.7, -0.7, -0.7)).norm() < 1e-9);
    assert!(output.stats.seeded_points > 0);

    let [ci, cj, ck] = center_index(spec);
    assert_eq!([ci, cj, ck], [7, 7, 7]);
    let center = field.get(ci, cj, ck);
    assert!((center + 0.5).abs() < 0.01, "center = {}", center);

    // Last grid point along +x is 0.1 outside the face.
    let outside = field.get(13, cj, ck);
    assert!((outside - 0.1).abs() < 0.01, "outside = {}", outside);

    // Two cells outside along -z.
    let below = field.get(ci, cj, 0);
    assert!((below - 0.2).abs() < 0.01, "below = {}", below);
}

#[test]
fn test_cube_distance_outside_face() {
    let mesh = create_box(0.5);
    let field = generate_sdf(&mesh, 0.1, 4, &SdfParams::default())
        .unwrap()
        .field;
    let spec = *field.spec();
    let [_, cj, ck] = center_index(&spec);

    let i = index_of(&spec, 0, 0.8);
    assert!((spec.position(i, cj, ck).x - 0.8).abs() < 1e-9);
    let value = field.get(i, cj, ck);
    assert!((value - 0.3).abs() < 0.01, "value = {}", value);
}

#[test]
fn test_box_half_extent() {
    // Half-extent 0.4 is a whole number of cells.
    let half = 0.4;
    let mesh = create_box(half);
    let spec = GridSpec::new(Point3::new(-0.8, -0.8, -0.8), 0.1, [17, 17, 17]).unwrap();
    let field = make_level_set(&mesh, &spec).unwrap();
    let [ci, cj, ck] = center_index(&spec);
    assert_eq!(ci, 8);

    assert!((field.get(ci, cj, ck) as f64 + half).abs() < 0.01);
    for d in 1..=4 {
        let v = field.get(ci + 4 + d, cj, ck) as f64;
        assert!((v - d as f64 * spec.dx).abs() < 0.01, "d = {}: {}", d, v);
    }
}

#[test]
fn test_sign_flips_once_along_row() {
    let mesh = create_box(0.5);
    let field = generate_sdf(&mesh, 0.1, 2, &SdfParams::default())
        .unwrap()
        .field;
    let [ci, cj, ck] = center_index(field.spec());
    let ni = field.spec().dims[0];

    let signs: Vec<bool> = (ci..ni).map(|i| field.get(i, cj, ck) < 0.0).collect();
    assert!(signs[0]);
    assert!(!signs[signs.len() - 1]);
    let flips = signs.windows(2).filter(|w| w[0] != w[1]).count();
    assert_eq!(flips, 1);
}

#[test]
fn test_vertices_have_zero_distance() {
    let mesh = create_box(0.5);
    let field = generate_sdf(&mesh, 0.1, 2, &SdfParams::default())
        .unwrap()
        .field;
    let spec = *field.spec();
    for v in &mesh.vertices {
        let p = v.position;
        let [i, j, k] = [0, 1, 2].map(|axis| index_of(&spec, axis, p[axis]));
        assert!((spec.position(i, j, k) - p).norm() < 1e-9);
        assert!(field.get(i, j, k).abs() < 1e-6);
    }
}

#[test]
fn test_surface_points_on_lattice() {
    // Box faces at grid indices 2 and 5 on every axis.
    let mesh = create_box(1.5);
    let spec = GridSpec::new(Point3::new(-3.5, -3.5, -3.5), 1.0, [8, 8, 8]).unwrap();
    let field = SdfBuilder::new(&mesh, spec).build().unwrap().field;

    // Bottom, top and side face points.
    for (i, j, k) in [(3, 3, 2), (3, 4, 5), (5, 3, 4), (2, 4, 3)] {
        let value = field.get(i, j, k);
        assert!(value.abs() < 1e-6, "({}, {}, {}) = {}", i, j, k, value);
    }

    // One cell off the exit face on either side.
    assert!((field.get(3, 3, 4) + 1.0).abs() < 1e-6);
    assert!((field.get(3, 3, 6) - 1.0).abs() < 1e-6);
}

#[test]
fn test_deterministic() {
    let mesh = create_sphere(2);
    let spec = GridSpec::from_mesh(&mesh, 0.1, 2, 1_000_000).unwrap();
    let first = make_level_set(&mesh, &spec).unwrap();
    let second = make_level_set(&mesh, &spec).unwrap();
    let serial = SdfBuilder::new(&mesh, spec)
        .parallel(false)
        .build()
        .unwrap()
        .field;

    let bits = |f: &DistanceField| f.values().iter().map(|v| v.to_bits()).collect::<Vec<_>>();
    assert_eq!(bits(&first), bits(&second));
    assert_eq!(bits(&first), bits(&serial));
}

#[test]
fn test_mirror_symmetry() {
    let mesh = create_box(0.5);
    // Odd point count so the grid is symmetric about the origin.
    let spec = GridSpec::new(Point3::new(-0.7, -0.7, -0.7), 0.1, [15, 15, 15]).unwrap();
    let field = make_level_set(&mesh, &spec).unwrap();
    for k in 0..15 {
        for j in 0..15 {
            for i in 0..15 {
                let a = field.get(i, j, k);
                let b = field.get(14 - i, j, k);
                assert!((a - b).abs() < 1e-3, "({}, {}, {}): {} vs {}", i, j, k, a, b);
            }
        }
    }
}

#[test]
fn test_scan_only_never_below_full() {
    let mesh = create_sphere(1);
    let spec = GridSpec::from_mesh(&mesh, 0.1, 3, 1_000_000).unwrap();
    let full = make_level_set(&mesh, &spec).unwrap();
    let scan = SdfBuilder::new(&mesh, spec)
        .sweep(SweepMode::Disabled)
        .build()
        .unwrap()
        .field;
    for (s, f) in scan.values().iter().zip(full.values()) {
        assert!(s.abs() >= f.abs());
    }
    assert_eq!(scan.max_value(), f32::MAX);
}

// =============================================================================
// Sphere Accuracy
// =============================================================================

#[test]
fn test_sphere_matches_analytic_distance() {
    let mesh = create_sphere(3);
    let output = generate_sdf(&mesh, 0.1, 3, &SdfParams::exact()).unwrap();
    let field = &output.field;
    let spec = *field.spec();
    assert!(output.stats.sweep_cycles > 0);

    for idx in 0..spec.total_points() {
        let [i, j, k] = spec.delinearize(idx);
        let p = spec.position(i, j, k);
        let analytic = p.coords.norm() - 1.0;
        let value = field.get(i, j, k) as f64;
        assert!(
            (value - analytic).abs() < spec.dx,
            "({}, {}, {}): {} vs {}",
            i,
            j,
            k,
            value,
            analytic
        );
        if analytic.abs() > 0.05 {
            assert_eq!(value < 0.0, analytic < 0.0, "sign at ({}, {}, {})", i, j, k);
        }
    }
}

#[test]
fn test_mesh_far_outside_grid() {
    let mut mesh = create_box(0.5);
    mesh.translate(nalgebra::Vector3::new(10.0, 0.0, 0.0));
    let spec = GridSpec::new(Point3::new(-1.0, -1.0, -1.0), 0.25, [9, 9, 9]).unwrap();
    let output = SdfBuilder::new(&mesh, spec).build().unwrap();
    assert_eq!(output.stats.seeded_points, 8);
    assert_eq!(output.stats.inside_points, 0);

    let field = &output.field;
    assert!(field.values().iter().all(|v| v.is_finite() && *v > 0.0));
    // Distance from the grid's +x face to the box's -x face is 8.5.
    let near = field.get(8, 4, 4) as f64;
    assert!((near - 8.5).abs() < 0.25, "near = {}", near);
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn test_empty_mesh_rejected() {
    let spec = GridSpec::new(Point3::origin(), 1.0, [2, 2, 2]).unwrap();
    let err = make_level_set(&Mesh::new(), &spec).unwrap_err();
    assert!(matches!(err, SdfError::EmptyMesh { .. }));
    assert_eq!(err.code().as_str(), "SDF-1101");
}

#[test]
fn test_invalid_cell_size_rejected() {
    let mesh = create_box(0.5);
    for dx in [0.0, -0.1] {
        let err = generate_sdf(&mesh, dx, 2, &SdfParams::default()).unwrap_err();
        assert!(matches!(err, SdfError::InvalidGrid { .. }));
    }
}

// =============================================================================
// File Round Trip
// =============================================================================

const CUBE_OBJ: &str = "\
v -0.5 -0.5 -0.5
v 0.5 -0.5 -0.5
v 0.5 0.5 -0.5
v -0.5 0.5 -0.5
v -0.5 -0.5 0.5
v 0.5 -0.5 0.5
v 0.5 0.5 0.5
v -0.5 0.5 0.5
f 1 4 3 2
f 5 6 7 8
f 1 2 6 5
f 4 8 7 3
f 1 5 8 4
f 2 3 7 6
";

#[test]
fn test_obj_to_template() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("cube.obj");
    std::fs::write(&input, CUBE_OBJ).unwrap();
    let mut template = NamedTempFile::with_suffix(".html").unwrap();
    write!(template, "<script>${{SDF}}</script>").unwrap();
    template.flush().unwrap();

    let mesh = load_mesh(&input).unwrap();
    assert_eq!(mesh.face_count(), 12);
    assert!((mesh.signed_volume() - 1.0).abs() < 1e-9);

    let output = generate_sdf(&mesh, 0.1, 2, &SdfParams::default()).unwrap();
    let out_path = default_output_path(&input);
    assert_eq!(out_path, dir.path().join("cube.html"));
    write_template_output(&output.field, template.path(), &out_path).unwrap();

    let html = std::fs::read_to_string(&out_path).unwrap();
    assert!(html.contains("GRES: [14, 14, 14]"));
    assert!(html.contains("EDGE: [1.4, 1.4, 1.4]"));
    let data = html
        .split("new Float32Array( [ ")
        .nth(1)
        .and_then(|rest| rest.split(" ] )").next())
        .unwrap();
    let values: Vec<f32> = data.split(", ").map(|v| v.parse().unwrap()).collect();
    assert_eq!(values, output.field.values());
}
