//! Scoped interchange artifacts

use crate::config::PostprocessConfig;
use crate::error::{PostprocessError, Result};
use std::path::{Path, PathBuf};
use tempfile::TempPath;
use tracing::{debug, warn};

/// A uniquely named temporary PLY file inside the configured temp directory.
///
/// The file is deleted when the guard is dropped, whichever way the owning
/// scope exits. Deletion failures are logged and never replace the error
/// that is already propagating.
#[derive(Debug)]
pub struct InterchangeArtifact {
    path: PathBuf,
    temp: Option<TempPath>,
}

impl InterchangeArtifact {
    /// Reserve a fresh artifact path, creating the temp directory if needed.
    ///
    /// `step` names the conversion step in the error if the file cannot be
    /// created.
    pub fn create(config: &PostprocessConfig, step: &'static str) -> Result<Self> {
        let dir = config.ensure_temp_dir()?;
        let temp = tempfile::Builder::new()
            .prefix("meshpost-")
            .suffix(".ply")
            .tempfile_in(dir)
            .map_err(|e| PostprocessError::conversion(step, e.into()))?
            .into_temp_path();

        let path = temp.to_path_buf();
        debug!(path = %path.display(), step, "interchange artifact reserved");
        Ok(Self {
            path,
            temp: Some(temp),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for InterchangeArtifact {
    fn drop(&mut self) {
        if let Some(temp) = self.temp.take() {
            if let Err(e) = temp.close() {
                warn!(path = %self.path.display(), error = %e, "failed to remove interchange artifact");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn config_in(dir: &Path) -> PostprocessConfig {
        PostprocessConfig::new().with_temp_dir(dir.join("scratch"))
    }

    #[test]
    fn test_artifact_removed_on_drop() {
        let root = tempfile::tempdir().unwrap();
        let config = config_in(root.path());

        let path = {
            let artifact = InterchangeArtifact::create(&config, "test").unwrap();
            assert!(artifact.path().exists());
            assert_eq!(artifact.path().extension().unwrap(), "ply");
            artifact.path().to_path_buf()
        };

        assert!(!path.exists());
        assert_eq!(fs::read_dir(&config.temp_dir).unwrap().count(), 0);
    }

    #[test]
    fn test_artifact_names_are_unique() {
        let root = tempfile::tempdir().unwrap();
        let config = config_in(root.path());

        let a = InterchangeArtifact::create(&config, "test").unwrap();
        let b = InterchangeArtifact::create(&config, "test").unwrap();
        assert_ne!(a.path(), b.path());
    }

    #[test]
    fn test_drop_tolerates_missing_file() {
        let root = tempfile::tempdir().unwrap();
        let config = config_in(root.path());

        let artifact = InterchangeArtifact::create(&config, "test").unwrap();
        fs::remove_file(artifact.path()).unwrap();
        drop(artifact);
    }

    #[test]
    fn test_uncreatable_temp_dir() {
        let root = tempfile::tempdir().unwrap();
        let blocker = root.path().join("blocker");
        fs::write(&blocker, b"").unwrap();
        let config = PostprocessConfig::new().with_temp_dir(&blocker);

        assert!(matches!(
            InterchangeArtifact::create(&config, "test"),
            Err(PostprocessError::TempDir { .. })
        ));
    }
}
