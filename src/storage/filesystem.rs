use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::{GeneratorError, GeneratorResult};
use crate::storage::traits::ObjectStore;

/// Writes objects as files in a local directory.
pub struct FilesystemStore {
    root: PathBuf,
}

impl FilesystemStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Keys are plain file names, never paths.
    fn path_for(&self, key: &str) -> GeneratorResult<PathBuf> {
        let name = Path::new(key).file_name().and_then(|n| n.to_str());
        if name != Some(key) || key == "." || key == ".." {
            return Err(GeneratorError::Storage(format!("Invalid object key: {}", key)));
        }
        Ok(self.root.join(key))
    }
}

impl ObjectStore for FilesystemStore {
    fn put(&self, key: &str, body: &[u8], _content_type: &str) -> GeneratorResult<()> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.root)?;
        fs::write(&path, body)?;
        Ok(())
    }

    fn location(&self, key: &str) -> String {
        self.root.join(key).display().to_string()
    }
}
