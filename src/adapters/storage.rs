use crate::core::Storage;
use crate::utils::error::{CookbookError, Result};
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::NamedTempFile;

/// Files below a base directory.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.base_path.join(path)
    }
}

impl Storage for LocalStorage {
    fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let full_path = self.resolve(path);
        fs::read(&full_path).map_err(|e| CookbookError::io(full_path.display().to_string(), e))
    }

    fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = self.resolve(path);
        let parent = match full_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent)
            .map_err(|e| CookbookError::io(parent.display().to_string(), e))?;

        // Readers see either the old file or the complete new one. The temp
        // file is removed when dropped on any error path.
        let mut temp = NamedTempFile::new_in(parent)
            .map_err(|e| CookbookError::io(parent.display().to_string(), e))?;
        temp.write_all(data)
            .map_err(|e| CookbookError::io(full_path.display().to_string(), e))?;
        temp.persist(&full_path)
            .map_err(|e| CookbookError::io(full_path.display().to_string(), e.error))?;

        tracing::debug!("Wrote {} bytes to {}", data.len(), full_path.display());
        Ok(())
    }
}

/// In-process storage, mainly for tests and callers that keep cookbooks in memory.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    files: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored bytes for `path`, or `None` when nothing was written there.
    pub fn get_file(&self, path: &str) -> Result<Option<Vec<u8>>> {
        let files = self.files.lock().map_err(|_| poisoned(path))?;
        Ok(files.get(path).cloned())
    }
}

impl Storage for MemoryStorage {
    fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let files = self.files.lock().map_err(|_| poisoned(path))?;
        files.get(path).cloned().ok_or_else(|| {
            CookbookError::io(
                path,
                std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ),
            )
        })
    }

    fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let mut files = self.files.lock().map_err(|_| poisoned(path))?;
        files.insert(path.to_string(), data.to_vec());
        Ok(())
    }
}

fn poisoned(path: &str) -> CookbookError {
    CookbookError::io(
        path,
        std::io::Error::new(std::io::ErrorKind::Other, "storage lock poisoned"),
    )
}
