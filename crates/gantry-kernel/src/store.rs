//! Process-wide key-value store shared by all plugins.

use std::collections::HashMap;
use std::ffi::{CStr, CString};

/// String → string mapping with last-write-wins semantics.
///
/// Values are owned as `CString` so the pointer handed across the ABI by
/// `get_data` stays stable until the same key is set or deleted, regardless
/// of unrelated map growth.
#[derive(Default)]
pub(crate) struct DataStore {
    entries: HashMap<String, CString>,
}

impl DataStore {
    /// Stores `value` under `key`, replacing any previous value.
    pub fn set(&mut self, key: &str, value: CString) {
        self.entries.insert(key.to_string(), value);
    }

    /// The value under `key`, if present.
    pub fn get(&self, key: &str) -> Option<&CStr> {
        self.entries.get(key).map(CString::as_c_str)
    }

    /// Presence predicate.
    pub fn has(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Removes `key`; returns whether a removal actually occurred.
    pub fn delete(&mut self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(s: &str) -> CString {
        CString::new(s).unwrap()
    }

    #[test]
    fn set_then_get_round_trips() {
        let mut store = DataStore::default();
        store.set("greeting", c("hello"));
        assert_eq!(store.get("greeting").unwrap().to_str().unwrap(), "hello");
        assert!(store.has("greeting"));
    }

    #[test]
    fn last_write_wins() {
        let mut store = DataStore::default();
        store.set("k", c("one"));
        store.set("k", c("two"));
        assert_eq!(store.get("k").unwrap().to_str().unwrap(), "two");
    }

    #[test]
    fn delete_reports_whether_a_removal_occurred() {
        let mut store = DataStore::default();
        store.set("k", c("v"));
        assert!(store.delete("k"));
        assert!(!store.delete("k"));
        assert!(!store.has("k"));
        assert!(store.get("k").is_none());
    }

    #[test]
    fn value_pointer_survives_unrelated_inserts() {
        let mut store = DataStore::default();
        store.set("stable", c("payload"));
        let ptr = store.get("stable").unwrap().as_ptr();
        for i in 0..256 {
            store.set(&format!("filler-{i}"), c("x"));
        }
        assert_eq!(store.get("stable").unwrap().as_ptr(), ptr);
    }
}
