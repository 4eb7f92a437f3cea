use std::fs;
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};

use export_logging::export_debug;
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::OutputFile;

#[derive(Debug, Error)]
pub enum WriteError {
    #[error("output directory missing or not writable: {0}")]
    OutputDir(String),
    #[error("refusing to write outside the output directory: {0}")]
    UnsafePath(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Persists the output of one route.
#[async_trait::async_trait]
pub trait Writer: Send + Sync {
    /// Write `output` and return the path it landed at.
    async fn write(&self, output: &OutputFile) -> Result<PathBuf, WriteError>;
}

/// Ensure output directory exists; create if missing.
pub fn ensure_output_dir(dir: &Path) -> Result<(), WriteError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| WriteError::OutputDir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(WriteError::OutputDir("path is not a directory".into()));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| WriteError::OutputDir(e.to_string()))?;
    }
    Ok(())
}

/// Turn a mapped route file such as `/docs/index.html` into a path relative to
/// the output directory. Parent and root components are rejected.
pub fn relative_output_path(file: &str) -> Result<PathBuf, WriteError> {
    let mut relative = PathBuf::new();
    for component in Path::new(file.trim_start_matches('/')).components() {
        match component {
            Component::Normal(part) => relative.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(WriteError::UnsafePath(file.to_string()));
            }
        }
    }
    if relative.as_os_str().is_empty() {
        return Err(WriteError::UnsafePath(file.to_string()));
    }
    Ok(relative)
}

/// Atomically write content below `dir` by writing a temp file then renaming.
#[derive(Debug, Clone)]
pub struct AtomicFileWriter {
    dir: PathBuf,
}

impl AtomicFileWriter {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Write `content` to `{dir}/{relative}`, creating intermediate directories.
    pub fn write(&self, relative: &Path, content: &str) -> Result<PathBuf, WriteError> {
        ensure_output_dir(&self.dir)?;

        let target = self.dir.join(relative);
        let parent = target.parent().unwrap_or(&self.dir);
        fs::create_dir_all(parent)?;

        let mut tmp = NamedTempFile::new_in(parent)?;
        tmp.write_all(content.as_bytes())?;
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;

        // Renames over an existing target; concurrent writers of one path all succeed.
        tmp.persist(&target).map_err(|e| WriteError::Io(e.error))?;
        Ok(target)
    }
}

/// Writes route output into a directory tree mirroring the site's paths.
#[derive(Debug, Clone)]
pub struct FsWriter {
    inner: AtomicFileWriter,
}

impl FsWriter {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            inner: AtomicFileWriter::new(out_dir.into()),
        }
    }
}

#[async_trait::async_trait]
impl Writer for FsWriter {
    async fn write(&self, output: &OutputFile) -> Result<PathBuf, WriteError> {
        let relative = relative_output_path(&output.path)?;
        let writer = self.inner.clone();
        let content = output.content.clone();
        let target = tokio::task::spawn_blocking(move || writer.write(&relative, &content))
            .await
            .map_err(|err| WriteError::Io(io::Error::other(err)))??;
        export_debug!("Wrote {} bytes to {:?}", output.content.len(), target);
        Ok(target)
    }
}
