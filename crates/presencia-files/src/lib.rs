//! Local-disk implementation of [`FileStore`].
//!
//! Keys are slash-separated relative paths (e.g.
//! `justificantes/1001-2024-03-01.pdf`) resolved under a configured root
//! directory. Parent directories are created on demand.

use std::{
  io,
  path::{Component, Path, PathBuf},
};

use presencia_core::files::FileStore;

/// Document storage rooted at a single directory on the local filesystem.
#[derive(Debug, Clone)]
pub struct DiskFileStore {
  root: PathBuf,
}

impl DiskFileStore {
  pub fn new(root: impl Into<PathBuf>) -> Self { Self { root: root.into() } }

  /// Map a key to an on-disk path, rejecting absolute keys and `..`
  /// components so a key can never escape the root.
  fn resolve(&self, key: &str) -> io::Result<PathBuf> {
    let relative = Path::new(key);
    let safe = relative
      .components()
      .all(|c| matches!(c, Component::Normal(_)));
    if key.is_empty() || !safe {
      return Err(io::Error::new(
        io::ErrorKind::InvalidInput,
        format!("invalid file key: {key:?}"),
      ));
    }
    Ok(self.root.join(relative))
  }
}

impl FileStore for DiskFileStore {
  type Error = io::Error;

  async fn put(&self, key: &str, content: &[u8]) -> io::Result<()> {
    let path = self.resolve(key)?;
    if let Some(parent) = path.parent() {
      tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(&path, content).await
  }

  async fn get(&self, key: &str) -> io::Result<Option<Vec<u8>>> {
    let path = self.resolve(key)?;
    match tokio::fs::read(&path).await {
      Ok(bytes) => Ok(Some(bytes)),
      Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
      Err(e) => Err(e),
    }
  }

  async fn exists(&self, key: &str) -> io::Result<bool> {
    let path = self.resolve(key)?;
    tokio::fs::try_exists(&path).await
  }

  async fn delete(&self, key: &str) -> io::Result<bool> {
    let path = self.resolve(key)?;
    match tokio::fs::remove_file(&path).await {
      Ok(()) => Ok(true),
      Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
      Err(e) => Err(e),
    }
  }
}

#[cfg(test)]
mod tests {
  use uuid::Uuid;

  use super::*;

  fn temp_store() -> DiskFileStore {
    let root = std::env::temp_dir().join(format!("presencia-files-{}", Uuid::new_v4()));
    DiskFileStore::new(root)
  }

  #[tokio::test]
  async fn put_get_roundtrip() {
    let store = temp_store();
    store
      .put("justificantes/1001-2024-03-01.pdf", b"%PDF-1.4 test")
      .await
      .unwrap();

    let bytes = store
      .get("justificantes/1001-2024-03-01.pdf")
      .await
      .unwrap();
    assert_eq!(bytes.as_deref(), Some(b"%PDF-1.4 test".as_slice()));
    assert!(store.exists("justificantes/1001-2024-03-01.pdf").await.unwrap());
  }

  #[tokio::test]
  async fn put_overwrites_existing_key() {
    let store = temp_store();
    store.put("justificantes/a.pdf", b"first").await.unwrap();
    store.put("justificantes/a.pdf", b"second").await.unwrap();

    let bytes = store.get("justificantes/a.pdf").await.unwrap().unwrap();
    assert_eq!(bytes, b"second");
  }

  #[tokio::test]
  async fn get_missing_returns_none() {
    let store = temp_store();
    assert!(store.get("justificantes/missing.pdf").await.unwrap().is_none());
    assert!(!store.exists("justificantes/missing.pdf").await.unwrap());
  }

  #[tokio::test]
  async fn delete_is_best_effort() {
    let store = temp_store();
    store.put("justificantes/b.pdf", b"bytes").await.unwrap();

    assert!(store.delete("justificantes/b.pdf").await.unwrap());
    // Second delete finds nothing and says so instead of failing.
    assert!(!store.delete("justificantes/b.pdf").await.unwrap());
  }

  #[tokio::test]
  async fn traversal_keys_are_rejected() {
    let store = temp_store();
    assert!(store.put("../escape.pdf", b"x").await.is_err());
    assert!(store.get("/etc/passwd").await.is_err());
  }
}
