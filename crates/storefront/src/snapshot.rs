//! Durable cart snapshot persistence.
//!
//! The whole cart is mirrored to a single JSON file (the serialized line
//! array) after every successful mutation, and read once at startup to seed
//! the cart service. Writes are atomic via a temp-rename pattern to prevent
//! corruption from crashes mid-write.

use std::io;
use std::path::{Path, PathBuf};

use sole_supply_core::{Cart, CartLine};
use thiserror::Error;

/// Errors that can occur while writing the snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// Filesystem operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Cart serialization failed.
    #[error("Serialize error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// File-backed store for the durable cart snapshot.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    /// Create a store writing to the given snapshot file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The snapshot file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the snapshot's parent directory if it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns `io::Error` if the directory cannot be created.
    pub fn ensure_dir(&self) -> io::Result<()> {
        match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => std::fs::create_dir_all(dir),
            _ => Ok(()),
        }
    }

    /// Load the persisted cart.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(cart))` if the file exists and deserializes successfully.
    ///   Invariants are re-established via [`Cart::from_lines`].
    /// - `Ok(None)` if the file does not exist or contains invalid JSON.
    ///   Deserialization failures are logged as warnings via `tracing::warn!`.
    ///
    /// # Errors
    ///
    /// Returns `io::Error` only for unexpected I/O failures (e.g. permission
    /// denied).
    pub fn load(&self) -> io::Result<Option<Cart>> {
        let bytes = match std::fs::read(&self.path) {
            Ok(b) => b,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };

        match serde_json::from_slice::<Vec<CartLine>>(&bytes) {
            Ok(lines) => Ok(Some(Cart::from_lines(lines))),
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "failed to deserialize cart snapshot; starting with an empty cart"
                );
                Ok(None)
            }
        }
    }

    /// Overwrite the snapshot with the full serialized cart.
    ///
    /// Writes to a temporary file in the same directory, then renames it
    /// over the snapshot. Readers never see a partially-written file.
    ///
    /// # Errors
    ///
    /// Returns `SnapshotError` if serialization, directory creation, file
    /// writing, or renaming fails.
    pub fn save(&self, cart: &Cart) -> Result<(), SnapshotError> {
        self.ensure_dir()?;

        let tmp_path = self.path.with_extension("json.tmp");
        let json = serde_json::to_vec_pretty(cart.lines())?;
        std::fs::write(&tmp_path, &json)?;
        std::fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use sole_supply_core::ProductId;

    fn sample_cart() -> Cart {
        let mut cart = Cart::new();
        cart.push_line(CartLine {
            id: ProductId::new(1),
            title: "Runner XT".to_string(),
            price: Decimal::new(17990, 2),
            image: "https://cdn.example.com/1.jpg".to_string(),
            amount: 2,
        });
        cart.push_line(CartLine {
            id: ProductId::new(4),
            title: "Court Classic".to_string(),
            price: Decimal::new(9990, 2),
            image: "https://cdn.example.com/4.jpg".to_string(),
            amount: 1,
        });
        cart
    }

    #[test]
    fn test_missing_snapshot_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("cart.json"));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_save_then_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("cart.json"));

        let cart = sample_cart();
        store.save(&cart).unwrap();

        let loaded = store.load().unwrap().expect("snapshot present");
        assert_eq!(loaded, cart);
    }

    #[test]
    fn test_save_creates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("nested/deeper/cart.json"));
        store.save(&sample_cart()).unwrap();
        assert!(store.load().unwrap().is_some());
    }

    #[test]
    fn test_save_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("cart.json"));
        store.save(&sample_cart()).unwrap();

        let entries: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("cart.json")]);
    }

    #[test]
    fn test_corrupt_snapshot_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cart.json");
        std::fs::write(&path, b"{not json").unwrap();

        let store = SnapshotStore::new(path);
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_load_drops_invalid_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cart.json");
        // Duplicate id and a zero amount, as a tampered snapshot might hold.
        std::fs::write(
            &path,
            r#"[
                {"id":1,"title":"A","price":"10.00","image":"a.jpg","amount":2},
                {"id":1,"title":"A","price":"10.00","image":"a.jpg","amount":9},
                {"id":2,"title":"B","price":"5.00","image":"b.jpg","amount":0}
            ]"#,
        )
        .unwrap();

        let store = SnapshotStore::new(path);
        let cart = store.load().unwrap().expect("snapshot present");
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.amount_of(ProductId::new(1)), 2);
    }
}
