//! Basic usage of meshpost
//!
//! Builds a small surface with a stray fragment, writes it to disk and runs
//! each operator on it in turn.

use meshpost_core::{Point3f, TriangleMesh};
use meshpost_postprocess::{
    DegenerateFaceRemover, FaceReducer, FloaterRemover, MeshPostprocessor, MeshRef, Pipeline,
    PostprocessConfig, ValueExport,
};

fn grid(n: usize) -> TriangleMesh {
    let mut mesh = TriangleMesh::new();
    for y in 0..n {
        for x in 0..n {
            let h = ((x as f32 * 0.5).sin() * (y as f32 * 0.5).cos()) * 0.2;
            mesh.add_vertex(Point3f::new(x as f32 * 0.1, y as f32 * 0.1, h));
        }
    }
    for y in 0..n - 1 {
        for x in 0..n - 1 {
            let a = y * n + x;
            let b = a + 1;
            let c = a + n;
            let d = c + 1;
            mesh.add_face([a, c, b]);
            mesh.add_face([b, c, d]);
        }
    }
    mesh
}

fn main() -> anyhow::Result<()> {
    println!("meshpost basic usage");
    println!("====================");

    let mut mesh = grid(40);
    let fragment = TriangleMesh::from_vertices_and_faces(
        vec![
            Point3f::new(20.0, 20.0, 20.0),
            Point3f::new(20.1, 20.0, 20.0),
            Point3f::new(20.0, 20.1, 20.0),
        ],
        vec![[0, 1, 2]],
    );
    mesh.append(&fragment);
    println!(
        "Input mesh: {} vertices, {} faces",
        mesh.vertex_count(),
        mesh.face_count()
    );

    let config = PostprocessConfig::from_env().with_value_export(ValueExport::Extract);
    println!("Interchange directory: {}", config.temp_dir.display());

    let floaters = FloaterRemover::new(config.clone());
    let cleaned = floaters.process(MeshRef::Value(mesh.clone()))?;
    println!("\nAfter floater removal: {:?} faces", cleaned.face_count());

    let degenerate = DegenerateFaceRemover::new(config.clone());
    let cleaned = degenerate.process(cleaned)?;
    println!("After degenerate removal: {:?} faces", cleaned.face_count());

    let reducer = FaceReducer::new(config.clone()).with_max_face_count(500);
    let reduced = reducer.process(cleaned)?;
    println!("After reduction to 500: {:?} faces", reduced.face_count());

    // The same work as a single pipeline over a file on disk
    let path = config.ensure_temp_dir()?.join("basic_usage_input.ply");
    meshpost_io::write_mesh(&mesh, &path)?;

    let pipeline = Pipeline::standard(config);
    println!("\nPipeline stages: {:?}", pipeline.stage_names());
    let out = pipeline.run(MeshRef::Path(path.clone()))?;
    println!("Pipeline output: {:?} faces", out.face_count());
    std::fs::remove_file(&path)?;

    Ok(())
}
