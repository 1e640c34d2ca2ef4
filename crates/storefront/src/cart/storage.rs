//! Local persistence of the cart snapshot.
//!
//! The record is a single JSON document `{"cart": Cart | null}` stored under
//! the configured data directory. Loading and error flags are never written.

use std::io;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::fs;

use crate::shopify::Cart;

/// Fixed name of the persisted cart record.
pub const STORE_NAME: &str = "cart-storage";

/// Errors from reading or writing the persisted cart record.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem failure.
    #[error("storage I/O error at {path}: {source}")]
    Io {
        /// File being read or written.
        path: PathBuf,
        /// Underlying error.
        source: io::Error,
    },

    /// The record could not be encoded or decoded.
    #[error("storage format error: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Deserialize)]
struct PersistedCart {
    cart: Option<Cart>,
}

/// File-backed store for the last known cart.
#[derive(Debug, Clone)]
pub struct CartStorage {
    path: PathBuf,
}

impl CartStorage {
    /// Storage rooted at `data_dir`.
    #[must_use]
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            path: data_dir.as_ref().join(format!("{STORE_NAME}.json")),
        }
    }

    /// Path of the persisted record.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the persisted cart.
    ///
    /// A missing file is `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid record.
    pub async fn load(&self) -> Result<Option<Cart>, StorageError> {
        let record: Option<PersistedCart> = read_json(&self.path).await?;
        Ok(record.and_then(|r| r.cart))
    }

    /// Replace the persisted cart.
    ///
    /// Writes to a temporary file and renames it over the record so a crash
    /// never leaves a half-written file behind.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written.
    pub async fn save(&self, cart: Option<&Cart>) -> Result<(), StorageError> {
        #[derive(Serialize)]
        struct Record<'a> {
            cart: Option<&'a Cart>,
        }

        write_json_atomic(&self.path, &Record { cart }).await
    }
}

/// Read a JSON document. A missing file is `Ok(None)`.
pub(crate) async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StorageError> {
    let bytes = match fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(StorageError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    Ok(Some(serde_json::from_slice(&bytes)?))
}

/// Write a JSON document next to `path` and rename it into place.
pub(crate) async fn write_json_atomic<T: Serialize + Sync>(
    path: &Path,
    value: &T,
) -> Result<(), StorageError> {
    let io_err = |source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).await.map_err(io_err)?;
    }

    let json = serde_json::to_vec_pretty(value)?;
    let tmp_path = path.with_extension("tmp");

    fs::write(&tmp_path, json).await.map_err(io_err)?;
    fs::rename(&tmp_path, path).await.map_err(io_err)?;

    Ok(())
}
