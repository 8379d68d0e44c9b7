//! Outcome of submitting a field container

use objectstore_core::ObjectStoreItem;

/// Success or failure of a store operation, with the items the store reported
///
/// On success the items are whatever the store assigned (identity items are
/// consumed by the field container before the result reaches the caller).
/// On failure they are the conflicting items, e.g. the existing row's
/// identity when an "if not exists" write hit a row.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreResult {
    success: bool,
    items: Vec<ObjectStoreItem>,
}

impl StoreResult {
    /// Successful result
    pub fn success(items: Vec<ObjectStoreItem>) -> Self {
        StoreResult {
            success: true,
            items,
        }
    }

    /// Failed result carrying the conflicting items
    pub fn failure(items: Vec<ObjectStoreItem>) -> Self {
        StoreResult {
            success: false,
            items,
        }
    }

    /// Check if the write was applied
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Reported items
    pub fn items(&self) -> &[ObjectStoreItem] {
        &self.items
    }

    /// Look up a reported item by key
    pub fn item(&self, key: &str) -> Option<&ObjectStoreItem> {
        self.items.iter().find(|i| i.key() == key)
    }

    /// Take the reported items
    pub fn into_items(self) -> Vec<ObjectStoreItem> {
        self.items
    }
}
