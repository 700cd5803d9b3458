//! The `FileStore` trait — blob storage keyed by a path-like string.
//!
//! The workflow treats the file store as content-addressed-by-name: `put`
//! overwrites whatever is at the key. Deletion is best-effort; a failed
//! delete is logged by the caller, never fatal.

use std::future::Future;

/// Abstraction over document blob storage (local disk in production).
pub trait FileStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Store `content` at `key`, replacing any existing blob.
  fn put<'a>(
    &'a self,
    key: &'a str,
    content: &'a [u8],
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Fetch the blob at `key`. `None` if absent.
  fn get<'a>(
    &'a self,
    key: &'a str,
  ) -> impl Future<Output = Result<Option<Vec<u8>>, Self::Error>> + Send + 'a;

  fn exists<'a>(
    &'a self,
    key: &'a str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// Remove the blob at `key`. Returns `false` when there was nothing to
  /// remove.
  fn delete<'a>(
    &'a self,
    key: &'a str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;
}
