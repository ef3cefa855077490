//! Pipeline configuration

use crate::error::{PostprocessError, Result};
use meshpost_io::{PlyFormat, PlyWriteOptions};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable overriding the temporary directory
pub const TEMP_DIR_ENV: &str = "MESHPOST_TEMP_DIR";

/// How a value-mesh input is handed back after processing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ValueExport {
    /// Return the caller's original vertices and faces untouched
    #[default]
    PassThrough,
    /// Return the processed session's current mesh
    Extract,
}

/// Settings shared by the adapter and the operators
#[derive(Debug, Clone, PartialEq)]
pub struct PostprocessConfig {
    /// Directory holding interchange artifacts. Created on demand; only the
    /// artifacts themselves are ever removed.
    pub temp_dir: PathBuf,
    /// Encoding of interchange artifacts
    pub artifact_format: PlyFormat,
    pub value_export: ValueExport,
}

impl Default for PostprocessConfig {
    fn default() -> Self {
        Self {
            temp_dir: std::env::temp_dir().join("meshpost"),
            artifact_format: PlyFormat::BinaryLittleEndian,
            value_export: ValueExport::default(),
        }
    }
}

impl PostprocessConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults, with the temporary directory taken from `MESHPOST_TEMP_DIR`
    /// when it is set and non-empty
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(dir) = std::env::var_os(TEMP_DIR_ENV).filter(|v| !v.is_empty()) {
            config.temp_dir = PathBuf::from(dir);
        }
        config
    }

    pub fn with_temp_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.temp_dir = dir.into();
        self
    }

    pub fn with_artifact_format(mut self, format: PlyFormat) -> Self {
        self.artifact_format = format;
        self
    }

    pub fn with_value_export(mut self, export: ValueExport) -> Self {
        self.value_export = export;
        self
    }

    /// Create the temporary directory if it does not exist yet
    pub fn ensure_temp_dir(&self) -> Result<&Path> {
        fs::create_dir_all(&self.temp_dir).map_err(|source| PostprocessError::TempDir {
            path: self.temp_dir.clone(),
            source,
        })?;
        Ok(&self.temp_dir)
    }

    /// PLY options used for interchange artifacts: positions and faces only
    pub fn artifact_options(&self) -> PlyWriteOptions {
        PlyWriteOptions {
            format: self.artifact_format,
            ..PlyWriteOptions::default()
        }
        .geometry_only()
        .with_comment("meshpost interchange")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PostprocessConfig::default();
        assert!(config.temp_dir.ends_with("meshpost"));
        assert_eq!(config.artifact_format, PlyFormat::BinaryLittleEndian);
        assert_eq!(config.value_export, ValueExport::PassThrough);
    }

    #[test]
    fn test_builders() {
        let config = PostprocessConfig::new()
            .with_temp_dir("/tmp/elsewhere")
            .with_artifact_format(PlyFormat::Ascii)
            .with_value_export(ValueExport::Extract);
        assert_eq!(config.temp_dir, PathBuf::from("/tmp/elsewhere"));
        assert_eq!(config.artifact_options().format, PlyFormat::Ascii);
        assert!(!config.artifact_options().include_normals);
        assert_eq!(config.value_export, ValueExport::Extract);
    }

    #[test]
    fn test_ensure_temp_dir_creates_nested() {
        let root = tempfile::tempdir().unwrap();
        let config = PostprocessConfig::new().with_temp_dir(root.path().join("a/b"));
        let dir = config.ensure_temp_dir().unwrap();
        assert!(dir.is_dir());
    }

    #[test]
    fn test_ensure_temp_dir_reports_failure() {
        let root = tempfile::tempdir().unwrap();
        let blocker = root.path().join("file");
        fs::write(&blocker, b"x").unwrap();

        let config = PostprocessConfig::new().with_temp_dir(blocker.join("sub"));
        assert!(matches!(
            config.ensure_temp_dir(),
            Err(PostprocessError::TempDir { .. })
        ));
    }
}
