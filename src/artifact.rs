//! Persistence for the trained pipeline artifact.
//!
//! The fitted vectorizer and classifier are saved together as one JSON
//! document with a SHA-256 sidecar checksum. Load verifies the checksum
//! before deserializing, so a truncated or corrupted artifact is rejected
//! instead of producing a silently-wrong model.

use log::info;
use sha2::{Digest, Sha256};
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::classifier::pipeline::TrainedPipeline;

const ARTIFACT_FILE: &str = "pipeline.json";
const CHECKSUM_FILE: &str = "pipeline.json.sha256";

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("artifact not found at {0}")]
    NotFound(PathBuf),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },
}

/// Filesystem location of the model artifact.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    /// Creates a store at the default models directory.
    pub fn new_default() -> io::Result<Self> {
        Self::new(Self::default_dir())
    }

    /// Resolves the default models directory:
    /// 1. `REVIEWGUARD_CACHE` environment variable
    /// 2. the platform cache directory
    /// 3. `~/.cache`
    /// 4. the system temp directory
    pub fn default_dir() -> PathBuf {
        if let Ok(path) = env::var("REVIEWGUARD_CACHE") {
            return PathBuf::from(path).join("models");
        }
        if let Some(cache_dir) = dirs::cache_dir() {
            return cache_dir.join("reviewguard").join("models");
        }
        if let Some(home_dir) = dirs::home_dir() {
            return home_dir.join(".cache").join("reviewguard").join("models");
        }
        env::temp_dir().join("reviewguard").join("models")
    }

    pub fn new<P: AsRef<Path>>(dir: P) -> io::Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn artifact_path(&self) -> PathBuf {
        self.dir.join(ARTIFACT_FILE)
    }

    pub fn checksum_path(&self) -> PathBuf {
        self.dir.join(CHECKSUM_FILE)
    }

    pub fn exists(&self) -> bool {
        self.artifact_path().exists()
    }

    fn digest(bytes: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        format!("{:x}", hasher.finalize())
    }

    /// Serializes the pipeline and writes it with its checksum sidecar.
    pub fn save(&self, pipeline: &TrainedPipeline) -> Result<(), ArtifactError> {
        let bytes = serde_json::to_vec(pipeline)?;
        let path = self.artifact_path();
        fs::write(&path, &bytes)?;
        fs::write(self.checksum_path(), Self::digest(&bytes))?;
        info!("saved model artifact to {}", path.display());
        Ok(())
    }

    /// Reads, verifies and deserializes the artifact.
    pub fn load(&self) -> Result<TrainedPipeline, ArtifactError> {
        let path = self.artifact_path();
        if !path.exists() {
            return Err(ArtifactError::NotFound(path));
        }
        let bytes = fs::read(&path)?;

        let expected = fs::read_to_string(self.checksum_path())
            .map_err(|_| ArtifactError::NotFound(self.checksum_path()))?;
        let expected = expected.trim().to_string();
        let actual = Self::digest(&bytes);
        if expected != actual {
            return Err(ArtifactError::ChecksumMismatch { expected, actual });
        }

        let pipeline = serde_json::from_slice(&bytes)?;
        info!("loaded model artifact from {}", path.display());
        Ok(pipeline)
    }

    /// Removes the artifact and its checksum, ignoring absent files.
    pub fn remove(&self) -> Result<(), ArtifactError> {
        for path in [self.artifact_path(), self.checksum_path()] {
            if path.exists() {
                fs::remove_file(&path)?;
            }
        }
        Ok(())
    }
}
