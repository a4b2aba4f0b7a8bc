//! LocalStorage backend (WASM only)

use web_sys::Storage;

use crate::error::ArcadeError;
use crate::persistence::Backend;

pub struct LocalStorageBackend {
    storage: Storage,
}

impl LocalStorageBackend {
    /// The window's LocalStorage. Fails when storage is disabled.
    pub fn new() -> Result<Self, ArcadeError> {
        let storage = web_sys::window()
            .ok_or(ArcadeError::NoWindow)?
            .local_storage()
            .ok()
            .flatten()
            .ok_or(ArcadeError::StorageUnavailable)?;
        Ok(Self { storage })
    }
}

impl Backend for LocalStorageBackend {
    fn get_item(&self, key: &str) -> Option<String> {
        self.storage.get_item(key).ok().flatten()
    }

    fn set_item(&mut self, key: &str, value: &str) -> bool {
        self.storage.set_item(key, value).is_ok()
    }

    fn remove_item(&mut self, key: &str) {
        if self.storage.remove_item(key).is_err() {
            log::warn!("Failed to remove {}", key);
        }
    }

    fn keys(&self) -> Vec<String> {
        let len = self.storage.length().unwrap_or(0);
        (0..len)
            .filter_map(|i| self.storage.key(i).ok().flatten())
            .collect()
    }
}
