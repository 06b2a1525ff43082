use std::fs;
use std::path::PathBuf;
use tracing::info;

const FILENAME_PREFIX: &str = "restaurants-";
const FALLBACK_STEM: &str = "results";

/// Named byte artifact handed to the host for download or storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvArtifact {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Derives `restaurants-<term>.csv`, replacing characters that are unsafe in
/// file names with `_`.
pub fn artifact_filename(search_term: &str) -> String {
    let stem: String = search_term
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    let stem = stem.trim_matches(|c: char| c == '.' || c.is_whitespace());
    let stem = if stem.is_empty() { FALLBACK_STEM } else { stem };
    format!("{FILENAME_PREFIX}{stem}.csv")
}

/// Host capability that makes an artifact available to the user.
pub trait ArtifactSink {
    fn deliver(&self, artifact: &CsvArtifact) -> Result<PathBuf, ArtifactError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Delivers artifacts as files inside a directory, creating it on demand.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl ArtifactSink for DirectorySink {
    fn deliver(&self, artifact: &CsvArtifact) -> Result<PathBuf, ArtifactError> {
        fs::create_dir_all(&self.dir).map_err(|source| ArtifactError::Io {
            path: self.dir.clone(),
            source,
        })?;

        let path = self.dir.join(&artifact.filename);
        fs::write(&path, &artifact.bytes).map_err(|source| ArtifactError::Io {
            path: path.clone(),
            source,
        })?;

        info!(path = %path.display(), bytes = artifact.bytes.len(), "artifact delivered");
        Ok(path)
    }
}
