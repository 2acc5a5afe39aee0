use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("directory {path:?} missing or not writable: {reason}")]
    Directory { path: PathBuf, reason: String },
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

impl PersistError {
    fn directory(path: &Path, reason: impl ToString) -> Self {
        Self::Directory {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }
}

/// Ensure output directory exists; create if missing. Existing content is kept.
pub fn ensure_output_dir(dir: &Path) -> Result<(), PersistError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| PersistError::directory(dir, e))?;
        if !meta.is_dir() {
            return Err(PersistError::directory(dir, "path is not a directory"));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| PersistError::directory(dir, e))?;
    }
    // Basic writability probe: try creating a temp file.
    NamedTempFile::new_in(dir).map_err(|e| PersistError::directory(dir, e))?;
    Ok(())
}

/// Recreate the scratch directory empty so artifacts from earlier runs are never picked up.
pub fn prepare_scratch_dir(dir: &Path) -> Result<(), PersistError> {
    match fs::remove_dir_all(dir) {
        Ok(()) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => return Err(PersistError::directory(dir, err)),
    }
    ensure_output_dir(dir)
}

/// Outcome of a write that refuses to replace an existing file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NewFile {
    Created(PathBuf),
    AlreadyExists(PathBuf),
}

/// Atomically write content to `{dir}/{filename}` by writing a temp file then renaming.
#[derive(Debug, Clone)]
pub struct AtomicFileWriter {
    dir: PathBuf,
}

impl AtomicFileWriter {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn write(&self, filename: &str, content: &str) -> Result<PathBuf, PersistError> {
        let target = self.dir.join(filename);
        let tmp = self.stage(content)?;

        // Rename replaces any existing file.
        tmp.persist(&target).map_err(|e| PersistError::Io(e.error))?;
        Ok(target)
    }

    /// Like [`write`](Self::write), but an existing target is left untouched
    /// and reported as [`NewFile::AlreadyExists`]. Exactly one of several
    /// concurrent writers to the same name gets [`NewFile::Created`].
    pub fn write_new(&self, filename: &str, content: &str) -> Result<NewFile, PersistError> {
        let target = self.dir.join(filename);
        let tmp = self.stage(content)?;

        match tmp.persist_noclobber(&target) {
            Ok(_) => Ok(NewFile::Created(target)),
            Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => {
                Ok(NewFile::AlreadyExists(target))
            }
            Err(e) => Err(PersistError::Io(e.error)),
        }
    }

    fn stage(&self, content: &str) -> Result<NamedTempFile, PersistError> {
        ensure_output_dir(&self.dir)?;

        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;
        Ok(tmp)
    }
}
