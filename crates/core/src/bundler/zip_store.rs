//! Zip archives on the local filesystem.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::error::ArchiveError;
use super::traits::{ArchiveStore, ArchiveWriter};

/// Writes `<dir>/<task_id>.zip` and reports `<base_url>/archives/<task_id>.zip`.
///
/// Archives are written under a `.part` name and renamed on finish, so the
/// published file is always complete.
#[derive(Debug, Clone)]
pub struct ZipArchiveStore {
    dir: PathBuf,
    public_base_url: String,
}

impl ZipArchiveStore {
    pub fn new(dir: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Final path of a task's archive.
    pub fn archive_path(&self, task_id: &str) -> PathBuf {
        self.dir.join(format!("{}.zip", task_id))
    }

    fn location(&self, task_id: &str) -> String {
        format!("{}/archives/{}.zip", self.public_base_url, task_id)
    }
}

impl ArchiveStore for ZipArchiveStore {
    fn name(&self) -> &str {
        "zip"
    }

    fn create(&self, task_id: &str) -> Result<Box<dyn ArchiveWriter>, ArchiveError> {
        fs::create_dir_all(&self.dir).map_err(|source| ArchiveError::CreateFailed {
            path: self.dir.clone(),
            source,
        })?;

        let path = self.archive_path(task_id);
        let part_path = self.dir.join(format!("{}.zip.part", task_id));
        let file = File::create(&part_path).map_err(|source| ArchiveError::CreateFailed {
            path: part_path.clone(),
            source,
        })?;

        Ok(Box::new(ZipArchiveWriter {
            zip: ZipWriter::new(file),
            part_path,
            path,
            location: self.location(task_id),
        }))
    }
}

struct ZipArchiveWriter {
    zip: ZipWriter<File>,
    part_path: PathBuf,
    path: PathBuf,
    location: String,
}

impl ArchiveWriter for ZipArchiveWriter {
    fn add_entry(&mut self, name: &str, content: &[u8]) -> Result<(), ArchiveError> {
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .large_file(content.len() as u64 >= u32::MAX as u64);

        self.zip
            .start_file(name, options)
            .map_err(|e| self.write_failed(name, e.to_string()))?;
        self.zip
            .write_all(content)
            .map_err(|e| self.write_failed(name, e.to_string()))?;

        debug!(entry = name, bytes = content.len(), path = %self.part_path.display(), "Wrote archive entry");
        Ok(())
    }

    fn finish(self: Box<Self>) -> Result<String, ArchiveError> {
        let ZipArchiveWriter {
            zip,
            part_path,
            path,
            location,
        } = *self;

        let finalize_failed = |reason: String| ArchiveError::FinalizeFailed {
            path: path.clone(),
            reason,
        };

        let file = zip.finish().map_err(|e| finalize_failed(e.to_string()))?;
        file.sync_all().map_err(|e| finalize_failed(e.to_string()))?;
        drop(file);
        fs::rename(&part_path, &path).map_err(|e| finalize_failed(e.to_string()))?;

        Ok(location)
    }
}

impl ZipArchiveWriter {
    fn write_failed(&self, entry: &str, reason: String) -> ArchiveError {
        ArchiveError::WriteFailed {
            path: self.part_path.clone(),
            entry: entry.to_string(),
            reason,
        }
    }
}
