//! The persisted set of nodes whose direct children are shown.

use crate::persistence::Persistence;
use indexmap::IndexSet;
use shared::{decode_expanded_ids, encode_expanded_ids};

/// Ordered set of expanded node ids, written through to [`Persistence`]
/// after every mutation.
///
/// Ids are not checked against the hierarchy; stale ids are inert.
pub struct ExpansionState<P: Persistence> {
    expanded: IndexSet<String>,
    storage: P,
    key: String,
}

impl<P: Persistence> ExpansionState<P> {
    /// Builds the state from whatever is stored under `key`.
    pub fn new(storage: P, key: impl Into<String>) -> Self {
        let mut state = Self {
            expanded: IndexSet::new(),
            storage,
            key: key.into(),
        };
        state.expanded = state.load();
        state
    }

    /// Reads the persisted ids. Absent or malformed data yields an empty set.
    pub fn load(&self) -> IndexSet<String> {
        let raw = match self.storage.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return IndexSet::new(),
            Err(e) => {
                log::warn!("Could not read expansion state '{}': {}", self.key, e);
                return IndexSet::new();
            }
        };

        match decode_expanded_ids(&raw) {
            Some(ids) => ids.into_iter().collect(),
            None => {
                log::warn!("Ignoring malformed expansion state under '{}'", self.key);
                IndexSet::new()
            }
        }
    }

    pub fn is_expanded(&self, id: &str) -> bool {
        self.expanded.contains(id)
    }

    pub fn add(&mut self, id: &str) {
        if !self.expanded.contains(id) {
            self.expanded.insert(id.to_string());
        }
        self.persist();
    }

    pub fn remove(&mut self, id: &str) {
        self.expanded.shift_remove(id);
        self.persist();
    }

    /// Removes several ids with a single write.
    pub fn remove_all<'a>(&mut self, ids: impl IntoIterator<Item = &'a str>) {
        for id in ids {
            self.expanded.shift_remove(id);
        }
        self.persist();
    }

    /// Drops ids from memory only, leaving the persisted record untouched.
    pub fn forget<'a>(&mut self, ids: impl IntoIterator<Item = &'a str>) {
        for id in ids {
            self.expanded.shift_remove(id);
        }
    }

    /// Expanded ids in stored order, for startup replay.
    pub fn all(&self) -> Vec<String> {
        self.expanded.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.expanded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expanded.is_empty()
    }

    /// Forgets everything, including the persisted key.
    pub fn clear(&mut self) {
        self.expanded.clear();
        if let Err(e) = self.storage.remove(&self.key) {
            log::warn!("Could not clear expansion state '{}': {}", self.key, e);
        }
    }

    fn persist(&mut self) {
        let raw = encode_expanded_ids(self.expanded.iter());
        if let Err(e) = self.storage.set(&self.key, &raw) {
            log::warn!("Could not persist expansion state '{}': {}", self.key, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::{MemoryStorage, StorageError};

    const KEY: &str = "expandedNodes";

    #[test]
    fn absent_state_is_empty() {
        let state = ExpansionState::new(MemoryStorage::new(), KEY);
        assert!(state.is_empty());
    }

    #[test]
    fn malformed_state_is_empty() {
        for raw in ["not json", "{\"a\":true}", "[1,2,3]", "null"] {
            let state = ExpansionState::new(MemoryStorage::with_entry(KEY, raw), KEY);
            assert!(state.is_empty(), "expected empty state for {raw}");
        }
    }

    #[test]
    fn add_and_remove_are_idempotent_and_persist() {
        let storage = MemoryStorage::new();
        let mut state = ExpansionState::new(storage.clone(), KEY);

        state.add("a");
        state.add("b");
        state.add("a");
        assert_eq!(state.all(), vec!["a", "b"]);
        assert_eq!(storage.snapshot(KEY).as_deref(), Some(r#"["a","b"]"#));

        state.remove("a");
        state.remove("a");
        assert_eq!(storage.snapshot(KEY).as_deref(), Some(r#"["b"]"#));
    }

    #[test]
    fn forget_leaves_storage_alone() {
        let storage = MemoryStorage::with_entry(KEY, r#"["a","b"]"#);
        let mut state = ExpansionState::new(storage.clone(), KEY);

        state.forget(["a"]);

        assert_eq!(state.all(), vec!["b"]);
        assert_eq!(storage.snapshot(KEY).as_deref(), Some(r#"["a","b"]"#));
    }

    #[test]
    fn persisted_state_reloads_in_order() {
        let storage = MemoryStorage::new();
        let mut state = ExpansionState::new(storage.clone(), KEY);
        for id in ["seguranca", "cultura", "stale"] {
            state.add(id);
        }

        let reloaded = ExpansionState::new(storage, KEY);
        assert_eq!(reloaded.all(), vec!["seguranca", "cultura", "stale"]);
        assert_eq!(reloaded.load(), state.load());
    }

    #[test]
    fn removal_keeps_remaining_order() {
        let mut state = ExpansionState::new(MemoryStorage::new(), KEY);
        for id in ["a", "b", "c", "d"] {
            state.add(id);
        }
        state.remove_all(["b", "d"]);
        assert_eq!(state.all(), vec!["a", "c"]);
    }

    #[test]
    fn clear_drops_persisted_key() {
        let storage = MemoryStorage::new();
        let mut state = ExpansionState::new(storage.clone(), KEY);
        state.add("a");
        state.clear();
        assert!(state.is_empty());
        assert_eq!(storage.snapshot(KEY), None);
    }

    struct BrokenStorage;

    impl Persistence for BrokenStorage {
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Unavailable("offline".into()))
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("offline".into()))
        }

        fn remove(&mut self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("offline".into()))
        }
    }

    #[test]
    fn storage_failures_never_reach_the_caller() {
        let mut state = ExpansionState::new(BrokenStorage, KEY);
        state.add("a");
        assert!(state.is_expanded("a"));
        state.clear();
        assert!(!state.is_expanded("a"));
    }
}
