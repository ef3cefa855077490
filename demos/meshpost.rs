//! Command-line driver for the meshpost operators
//!
//! Reads a mesh file (PLY, OBJ, glTF/GLB), runs one operator or the standard
//! pipeline and writes the result as PLY or OBJ.
//!
//! Log verbosity follows `RUST_LOG`, e.g. `RUST_LOG=meshpost=debug`.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use meshpost_postprocess::{
    DegenerateFaceRemover, FaceReducer, FloaterRemover, MeshPostprocessor, MeshRef, Pipeline,
    PlyFormat, PostprocessConfig, DEFAULT_REDUCER_FACE_COUNT,
};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "meshpost")]
#[command(about = "Clean up and decimate generated meshes", long_about = None)]
struct Cli {
    /// Directory for interchange artifacts (overrides MESHPOST_TEMP_DIR)
    #[arg(long, global = true)]
    temp_dir: Option<PathBuf>,

    /// Write interchange artifacts as ASCII PLY
    #[arg(long, global = true)]
    ascii_artifacts: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decimate to a face budget
    Reduce {
        input: PathBuf,
        output: PathBuf,
        #[arg(short, long, default_value_t = DEFAULT_REDUCER_FACE_COUNT)]
        max_faces: usize,
    },
    /// Remove small disconnected fragments
    Floaters { input: PathBuf, output: PathBuf },
    /// Remove degenerate and duplicate geometry
    Degenerate { input: PathBuf, output: PathBuf },
    /// Floaters, degenerate faces, then reduction
    Pipeline {
        input: PathBuf,
        output: PathBuf,
        #[arg(short, long, default_value_t = DEFAULT_REDUCER_FACE_COUNT)]
        max_faces: usize,
    },
}

fn config(cli: &Cli) -> PostprocessConfig {
    let mut config = PostprocessConfig::from_env();
    if let Some(dir) = &cli.temp_dir {
        config = config.with_temp_dir(dir);
    }
    if cli.ascii_artifacts {
        config = config.with_artifact_format(PlyFormat::Ascii);
    }
    config
}

fn process(processor: &dyn MeshPostprocessor, input: &Path, output: &Path) -> Result<()> {
    let result = processor
        .process(MeshRef::Path(input.to_path_buf()))
        .with_context(|| format!("{} failed on {}", processor.name(), input.display()))?;
    write(result, output)
}

fn write(result: MeshRef, output: &Path) -> Result<()> {
    let Some(mesh) = result.into_value() else {
        bail!("operator did not return a mesh");
    };
    meshpost_io::write_mesh(&mesh, output)
        .with_context(|| format!("writing {}", output.display()))?;
    info!(
        path = %output.display(),
        vertices = mesh.vertex_count(),
        faces = mesh.face_count(),
        "wrote mesh"
    );
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    let config = config(&cli);

    match &cli.command {
        Commands::Reduce { input, output, max_faces } => {
            let reducer = FaceReducer::new(config).with_max_face_count(*max_faces);
            process(&reducer, input, output)
        }
        Commands::Floaters { input, output } => {
            process(&FloaterRemover::new(config), input, output)
        }
        Commands::Degenerate { input, output } => {
            process(&DegenerateFaceRemover::new(config), input, output)
        }
        Commands::Pipeline { input, output, max_faces } => {
            let pipeline = Pipeline::new(config.clone())
                .with_stage(FloaterRemover::new(config.clone()))
                .with_stage(DegenerateFaceRemover::new(config.clone()))
                .with_stage(FaceReducer::new(config).with_max_face_count(*max_faces));
            let result = pipeline
                .run(MeshRef::Path(input.clone()))
                .with_context(|| format!("pipeline failed on {}", input.display()))?;
            write(result, output)
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
