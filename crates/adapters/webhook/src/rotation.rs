//! Round-robin selection over a fixed set of API keys.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Hands out API keys in order, wrapping around at the end.
///
/// The cursor is atomic so concurrent submissions share one rotation.
#[derive(Debug, Default)]
pub struct KeyRotation {
    keys: Vec<String>,
    cursor: AtomicUsize,
}

impl KeyRotation {
    /// Rotate over `keys` in the given order. Blank keys are dropped.
    pub fn new(keys: impl IntoIterator<Item = String>) -> Self {
        Self {
            keys: keys
                .into_iter()
                .map(|key| key.trim().to_string())
                .filter(|key| !key.is_empty())
                .collect(),
            cursor: AtomicUsize::new(0),
        }
    }

    /// Number of keys in the rotation.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// The next key, or `None` when the rotation is empty.
    pub fn next_key(&self) -> Option<&str> {
        if self.keys.is_empty() {
            return None;
        }
        let index = self.cursor.fetch_add(1, Ordering::Relaxed) % self.keys.len();
        self.keys.get(index).map(String::as_str)
    }
}
