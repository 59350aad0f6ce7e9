//! Wishlist store with write-through blob persistence.
//!
//! The wishlist is an insertion-ordered set of product ids, held in memory
//! for the lifetime of the process and mirrored to a backing blob on every
//! mutation. The blob is plain JSON (`[1,5,3]`), loaded once at startup.
//!
//! Persistence is strictly best-effort: a missing or malformed blob loads
//! as an empty set, and a failed save is logged and otherwise ignored - the
//! in-memory state keeps working either way. Nothing in here is allowed to
//! take the storefront down.
//!
//! There is a single writer (the one session driving this process), so a
//! `Mutex` around the set is all the coordination the write-through needs.

use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use thiserror::Error;

use sockworks_core::ProductId;

/// Errors from the backing blob store.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// Reading or writing the blob failed.
    #[error("blob I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serializing the wishlist failed.
    #[error("blob serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// A key-value blob the wishlist persists itself into.
///
/// The production implementation is a JSON file; tests use an in-memory
/// store.
pub trait BlobStore: Send + Sync {
    /// Load the blob, `None` if it has never been written.
    ///
    /// # Errors
    ///
    /// Returns a [`PersistenceError`] if the underlying read fails.
    fn load(&self) -> Result<Option<String>, PersistenceError>;

    /// Overwrite the blob.
    ///
    /// # Errors
    ///
    /// Returns a [`PersistenceError`] if the underlying write fails.
    fn save(&self, blob: &str) -> Result<(), PersistenceError>;
}

/// Blob store backed by a single JSON file on disk.
pub struct FileBlobStore {
    path: PathBuf,
}

impl FileBlobStore {
    /// Create a store over `path`. The file is created on first save.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl BlobStore for FileBlobStore {
    fn load(&self) -> Result<Option<String>, PersistenceError> {
        match std::fs::read_to_string(&self.path) {
            Ok(blob) => Ok(Some(blob)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, blob: &str) -> Result<(), PersistenceError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, blob)?;
        Ok(())
    }
}

/// In-memory blob store for tests.
#[derive(Default)]
pub struct MemoryBlobStore {
    inner: Mutex<Option<String>>,
    fail_saves: bool,
}

impl MemoryBlobStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-seeded with a blob.
    #[must_use]
    pub fn with_blob(blob: impl Into<String>) -> Self {
        Self {
            inner: Mutex::new(Some(blob.into())),
            fail_saves: false,
        }
    }

    /// A store whose saves always fail, for exercising the non-fatal path.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            inner: Mutex::new(None),
            fail_saves: true,
        }
    }

    /// The last saved blob, if any.
    #[must_use]
    pub fn blob(&self) -> Option<String> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl BlobStore for MemoryBlobStore {
    fn load(&self) -> Result<Option<String>, PersistenceError> {
        Ok(self.blob())
    }

    fn save(&self, blob: &str) -> Result<(), PersistenceError> {
        if self.fail_saves {
            return Err(PersistenceError::Io(std::io::Error::other(
                "saves disabled",
            )));
        }
        *self.inner.lock().unwrap_or_else(PoisonError::into_inner) = Some(blob.to_owned());
        Ok(())
    }
}

/// Process-wide wishlist state.
///
/// Membership is a set, iteration order is insertion order (so rendering is
/// deterministic). Every mutation writes the whole set back to the blob
/// store synchronously.
pub struct WishlistStore {
    store: Box<dyn BlobStore>,
    state: Mutex<Vec<ProductId>>,
}

impl WishlistStore {
    /// Load the wishlist from the backing store.
    ///
    /// Never fails: an absent blob is an empty set, and a malformed blob is
    /// logged and treated the same way.
    #[must_use]
    pub fn load(store: Box<dyn BlobStore>) -> Self {
        let state = match store.load() {
            Ok(Some(blob)) => match serde_json::from_str::<Vec<ProductId>>(&blob) {
                Ok(ids) => ids,
                Err(e) => {
                    tracing::warn!(error = %e, "malformed wishlist blob, starting empty");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!(error = %e, "failed to read wishlist blob, starting empty");
                Vec::new()
            }
        };

        Self {
            store,
            state: Mutex::new(state),
        }
    }

    /// Toggle a product's membership; returns the new membership.
    ///
    /// Set semantics: two toggles in a row net to a no-op.
    pub fn toggle(&self, product_id: ProductId) -> bool {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);

        let in_wishlist = if let Some(pos) = state.iter().position(|id| *id == product_id) {
            state.remove(pos);
            false
        } else {
            state.push(product_id);
            true
        };

        self.persist(&state);
        in_wishlist
    }

    /// Whether a product is in the wishlist.
    #[must_use]
    pub fn contains(&self, product_id: ProductId) -> bool {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&product_id)
    }

    /// Snapshot of the wishlist, in insertion order.
    #[must_use]
    pub fn product_ids(&self) -> Vec<ProductId> {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Write the full set through to the blob store. Failures are logged
    /// and the in-memory state stays authoritative.
    fn persist(&self, state: &[ProductId]) {
        let blob = match serde_json::to_string(state) {
            Ok(blob) => blob,
            Err(e) => {
                tracing::warn!(error = %e, "failed to serialize wishlist");
                return;
            }
        };
        if let Err(e) = self.store.save(&blob) {
            tracing::warn!(error = %e, "failed to persist wishlist, keeping in-memory state");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const SOCKS: ProductId = ProductId::new(1);
    const BOOTS: ProductId = ProductId::new(2);

    #[test]
    fn test_toggle_adds_then_removes() {
        let wishlist = WishlistStore::load(Box::new(MemoryBlobStore::new()));

        assert!(wishlist.toggle(SOCKS));
        assert!(wishlist.contains(SOCKS));

        assert!(!wishlist.toggle(SOCKS));
        assert!(!wishlist.contains(SOCKS));
    }

    #[test]
    fn test_double_toggle_restores_original_membership() {
        let wishlist = WishlistStore::load(Box::new(MemoryBlobStore::new()));
        let _ = wishlist.toggle(BOOTS);
        let before = wishlist.product_ids();

        let _ = wishlist.toggle(SOCKS);
        let _ = wishlist.toggle(SOCKS);

        assert_eq!(wishlist.product_ids(), before);
    }

    #[test]
    fn test_iteration_is_insertion_ordered() {
        let wishlist = WishlistStore::load(Box::new(MemoryBlobStore::new()));
        let _ = wishlist.toggle(BOOTS);
        let _ = wishlist.toggle(SOCKS);
        let _ = wishlist.toggle(ProductId::new(3));

        assert_eq!(
            wishlist.product_ids(),
            vec![BOOTS, SOCKS, ProductId::new(3)]
        );
    }

    #[test]
    fn test_mutations_write_through() {
        let store = Box::new(MemoryBlobStore::new());
        let wishlist = WishlistStore::load(store);
        let _ = wishlist.toggle(SOCKS);
        let _ = wishlist.toggle(BOOTS);

        // Reload from the same blob contents
        let blob = serde_json::to_string(&wishlist.product_ids()).unwrap();
        let reloaded = WishlistStore::load(Box::new(MemoryBlobStore::with_blob(blob)));
        assert_eq!(reloaded.product_ids(), vec![SOCKS, BOOTS]);
    }

    #[test]
    fn test_malformed_blob_loads_empty() {
        let wishlist =
            WishlistStore::load(Box::new(MemoryBlobStore::with_blob("{not json".to_string())));
        assert!(wishlist.product_ids().is_empty());
    }

    #[test]
    fn test_save_failure_is_non_fatal() {
        let wishlist = WishlistStore::load(Box::new(MemoryBlobStore::failing()));
        assert!(wishlist.toggle(SOCKS));
        assert!(wishlist.contains(SOCKS));
    }

    #[test]
    fn test_file_store_roundtrip() {
        let dir = std::env::temp_dir().join(format!("sockworks-wishlist-{}", std::process::id()));
        let path = dir.join("wishlist.json");
        let _ = std::fs::remove_file(&path);

        let store = FileBlobStore::new(&path);
        assert!(store.load().unwrap().is_none());

        store.save("[1,2]").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("[1,2]"));

        let _ = std::fs::remove_file(&path);
        let _ = std::fs::remove_dir(&dir);
    }
}
