//! Mesh post-processing operators
//!
//! Every operator converts its input into a session, runs one engine
//! operation and converts the result back into the caller's shape class.

use crate::config::PostprocessConfig;
use crate::error::Result;
use crate::interchange::{InterchangeAdapter, MeshRef};
use crate::operations;
use meshpost_session::MeshSet;
use tracing::info;

/// Face budget of [`FaceReducer::new`]
pub const DEFAULT_REDUCER_FACE_COUNT: usize = 40_000;

/// A single post-processing step
pub trait MeshPostprocessor {
    fn name(&self) -> &'static str;

    /// Process a mesh, returning it in the same shape class it arrived in
    fn process(&self, mesh: MeshRef) -> Result<MeshRef>;
}

fn run<F>(
    adapter: &InterchangeAdapter,
    name: &'static str,
    mesh: MeshRef,
    operation: F,
) -> Result<MeshRef>
where
    F: FnOnce(MeshSet) -> Result<MeshSet>,
{
    let kind = mesh.kind();
    let faces_in = mesh.face_count();

    let imported = adapter.to_session_mesh(mesh)?;
    let processed = operation(imported.session)?;
    let output = adapter.to_value_mesh(imported.shape, processed)?;

    info!(
        operator = name,
        input = kind,
        faces_in = ?faces_in,
        faces_out = ?output.face_count(),
        "post-processing step finished"
    );
    Ok(output)
}

/// Decimates meshes down to a face budget
#[derive(Debug, Clone)]
pub struct FaceReducer {
    adapter: InterchangeAdapter,
    max_face_count: usize,
}

impl FaceReducer {
    pub fn new(config: PostprocessConfig) -> Self {
        Self {
            adapter: InterchangeAdapter::new(config),
            max_face_count: DEFAULT_REDUCER_FACE_COUNT,
        }
    }

    pub fn with_max_face_count(mut self, max_face_count: usize) -> Self {
        self.max_face_count = max_face_count;
        self
    }

    pub fn max_face_count(&self) -> usize {
        self.max_face_count
    }

    /// Reduce with an explicit face budget for this call
    pub fn reduce(&self, mesh: MeshRef, max_face_count: usize) -> Result<MeshRef> {
        run(&self.adapter, self.name(), mesh, |session| {
            operations::reduce_face(session, max_face_count)
        })
    }
}

impl Default for FaceReducer {
    fn default() -> Self {
        Self::new(PostprocessConfig::default())
    }
}

impl MeshPostprocessor for FaceReducer {
    fn name(&self) -> &'static str {
        "face_reducer"
    }

    fn process(&self, mesh: MeshRef) -> Result<MeshRef> {
        self.reduce(mesh, self.max_face_count)
    }
}

/// Removes small disconnected fragments
#[derive(Debug, Clone, Default)]
pub struct FloaterRemover {
    adapter: InterchangeAdapter,
}

impl FloaterRemover {
    pub fn new(config: PostprocessConfig) -> Self {
        Self {
            adapter: InterchangeAdapter::new(config),
        }
    }
}

impl MeshPostprocessor for FloaterRemover {
    fn name(&self) -> &'static str {
        "floater_remover"
    }

    fn process(&self, mesh: MeshRef) -> Result<MeshRef> {
        run(&self.adapter, self.name(), mesh, operations::remove_floater)
    }
}

/// Removes degenerate and duplicate geometry
#[derive(Debug, Clone, Default)]
pub struct DegenerateFaceRemover {
    adapter: InterchangeAdapter,
}

impl DegenerateFaceRemover {
    pub fn new(config: PostprocessConfig) -> Self {
        Self {
            adapter: InterchangeAdapter::new(config),
        }
    }
}

impl MeshPostprocessor for DegenerateFaceRemover {
    fn name(&self) -> &'static str {
        "degenerate_face_remover"
    }

    fn process(&self, mesh: MeshRef) -> Result<MeshRef> {
        let config = self.adapter.config();
        run(&self.adapter, self.name(), mesh, |session| {
            operations::remove_degenerate_faces(session, config)
        })
    }
}

/// Runs post-processors in sequence, feeding each output to the next.
///
/// The input is converted into a session once; stages exchange sessions and
/// the final session is converted back into the input's shape class.
#[derive(Default)]
pub struct Pipeline {
    adapter: InterchangeAdapter,
    stages: Vec<Box<dyn MeshPostprocessor + Send + Sync>>,
}

impl Pipeline {
    pub fn new(config: PostprocessConfig) -> Self {
        Self {
            adapter: InterchangeAdapter::new(config),
            stages: Vec::new(),
        }
    }

    /// Floater removal, then degenerate face removal, then face reduction
    pub fn standard(config: PostprocessConfig) -> Self {
        Self::new(config.clone())
            .with_stage(FloaterRemover::new(config.clone()))
            .with_stage(DegenerateFaceRemover::new(config.clone()))
            .with_stage(FaceReducer::new(config))
    }

    pub fn with_stage<P>(mut self, stage: P) -> Self
    where
        P: MeshPostprocessor + Send + Sync + 'static,
    {
        self.push(stage);
        self
    }

    pub fn push<P>(&mut self, stage: P)
    where
        P: MeshPostprocessor + Send + Sync + 'static,
    {
        self.stages.push(Box::new(stage));
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn run(&self, mesh: MeshRef) -> Result<MeshRef> {
        let imported = self.adapter.to_session_mesh(mesh)?;

        let mut session = imported.session;
        for stage in &self.stages {
            session = match stage.process(MeshRef::Session(session))? {
                MeshRef::Session(next) => next,
                other => self.adapter.to_session_mesh(other)?.session,
            };
        }

        self.adapter.to_value_mesh(imported.shape, session)
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("stages", &self.stage_names())
            .finish()
    }
}
