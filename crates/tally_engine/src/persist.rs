//! Report files appear in one step or not at all.

use std::io::{self, Write};
use std::path::PathBuf;

use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("cannot create a file in {dir}: {source}")]
    Create {
        dir: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{0} already exists")]
    AlreadyExists(PathBuf),
}

/// Creates new files in `dir` via a synced temp file linked into place.
///
/// The directory must already exist. An existing file with the same name is
/// never replaced.
pub struct AtomicFileWriter {
    dir: PathBuf,
}

impl AtomicFileWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn create(&self, filename: &str, content: &str) -> Result<PathBuf, PersistError> {
        let target = self.dir.join(filename);
        let mut tmp = NamedTempFile::new_in(&self.dir).map_err(|source| PersistError::Create {
            dir: self.dir.clone(),
            source,
        })?;
        write_synced(&mut tmp, content).map_err(|source| PersistError::Write {
            path: target.clone(),
            source,
        })?;

        // A failed persist drops the temp file, so nothing partial is left.
        tmp.persist_noclobber(&target).map_err(|err| match err.error.kind() {
            io::ErrorKind::AlreadyExists => PersistError::AlreadyExists(target.clone()),
            _ => PersistError::Write {
                path: target.clone(),
                source: err.error,
            },
        })?;
        Ok(target)
    }
}

fn write_synced(tmp: &mut NamedTempFile, content: &str) -> io::Result<()> {
    tmp.write_all(content.as_bytes())?;
    tmp.flush()?;
    tmp.as_file().sync_all()
}
