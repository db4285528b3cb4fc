//! Flat-directory binary asset store.
//!
//! Stored names are server-generated UUIDs plus the original extension, so
//! they carry no user input. Writes go to a temp file in the same directory
//! followed by an atomic rename, so a concurrent reader never observes a
//! partial file.

use anyhow::{Context, Result};
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Creates the backing directory if it does not exist.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)
            .with_context(|| format!("Failed to create upload directory {}", root.display()))?;
        Ok(Self { root })
    }

    /// Stores `bytes` under a freshly generated name, returning that name.
    pub async fn save(&self, bytes: &[u8], extension: &str) -> Result<String> {
        let extension = extension.trim_start_matches('.');
        let stored_name = if extension.is_empty() {
            Uuid::new_v4().to_string()
        } else {
            format!("{}.{}", Uuid::new_v4(), extension)
        };

        let tmp_path = self.root.join(format!(".{stored_name}.tmp"));
        let final_path = self.root.join(&stored_name);

        tokio::fs::write(&tmp_path, bytes)
            .await
            .with_context(|| format!("Failed to write {}", tmp_path.display()))?;
        tokio::fs::rename(&tmp_path, &final_path)
            .await
            .with_context(|| format!("Failed to move {} into place", final_path.display()))?;

        Ok(stored_name)
    }

    /// Reads a stored blob; `None` when it does not exist.
    pub async fn read(&self, stored_name: &str) -> Result<Option<Vec<u8>>> {
        if !Self::is_valid_name(stored_name) {
            return Ok(None);
        }

        let path = self.root.join(stored_name);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("Failed to read {}", path.display())),
        }
    }

    /// Removes a stored blob; removing a missing one is not an error.
    pub async fn delete(&self, stored_name: &str) -> Result<()> {
        if !Self::is_valid_name(stored_name) {
            return Ok(());
        }

        let path = self.root.join(stored_name);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("Failed to delete {}", path.display())),
        }
    }

    // Stored names never contain separators; anything else is not ours.
    fn is_valid_name(name: &str) -> bool {
        !name.is_empty()
            && !name.starts_with('.')
            && !name.contains('/')
            && !name.contains('\\')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn save_read_delete_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path()).unwrap();

        let name = store.save(b"%PDF-1.4 test", "pdf").await.unwrap();
        assert!(name.ends_with(".pdf"));
        assert_eq!(
            store.read(&name).await.unwrap().as_deref(),
            Some(b"%PDF-1.4 test".as_slice())
        );

        store.delete(&name).await.unwrap();
        assert!(store.read(&name).await.unwrap().is_none());
        // deleting again stays a no-op
        store.delete(&name).await.unwrap();
    }

    #[tokio::test]
    async fn generated_names_are_unique() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path()).unwrap();

        let a = store.save(b"a", "pdf").await.unwrap();
        let b = store.save(b"b", "pdf").await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn traversal_names_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path()).unwrap();

        assert!(store.read("../secret").await.unwrap().is_none());
        assert!(store.read(".hidden").await.unwrap().is_none());
        store.delete("../secret").await.unwrap();
    }
}
