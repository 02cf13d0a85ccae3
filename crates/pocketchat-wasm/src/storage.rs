use web_sys::Storage;

use pocketchat_chat::{Clock, KeyValueStore, StoreError, StoreResult};

use crate::utils::describe_js_error;

/// `localStorage` behind the core key-value seam
#[derive(Debug, Clone)]
pub struct LocalStore {
    storage: Storage,
}

impl LocalStore {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    /// The window's `localStorage`, if the browser exposes one
    pub fn from_window() -> StoreResult<Self> {
        let window = web_sys::window().ok_or_else(|| StoreError::Unavailable {
            message: "No window object".to_string(),
        })?;
        match window.local_storage() {
            Ok(Some(storage)) => Ok(Self::new(storage)),
            Ok(None) => Err(StoreError::Unavailable {
                message: "localStorage is disabled".to_string(),
            }),
            Err(e) => Err(StoreError::Unavailable {
                message: describe_js_error(&e),
            }),
        }
    }
}

impl KeyValueStore for LocalStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        self.storage
            .get_item(key)
            .map_err(|e| StoreError::Unavailable {
                message: describe_js_error(&e),
            })
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        // Throws QuotaExceededError when the origin is out of space
        self.storage
            .set_item(key, value)
            .map_err(|e| StoreError::WriteRejected {
                key: key.to_string(),
                message: describe_js_error(&e),
            })
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        self.storage
            .remove_item(key)
            .map_err(|e| StoreError::Unavailable {
                message: describe_js_error(&e),
            })
    }
}

/// Wall clock from `Date.now()`
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserClock;

impl Clock for BrowserClock {
    fn now_millis(&self) -> i64 {
        js_sys::Date::now() as i64
    }
}
