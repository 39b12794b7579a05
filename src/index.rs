//! Per-root index cache.
//!
//! The index maps the decimal id of every record in a root to the fields a
//! listing needs (title, priority, tags). It is derived data: every write
//! rewrites the whole file, and [`crate::reindex`] rebuilds it from the
//! record files when it drifts or gets corrupted.

use std::fs;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, Result};
use crate::record::{Task, TaskId};
use crate::storage::{Root, Storage};

/// Display projection of a task stored in the index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub title: String,
    #[serde(deserialize_with = "priority_token")]
    pub pri: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl From<&Task> for IndexEntry {
    fn from(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            pri: task.pri.clone(),
            tags: task.tags.clone(),
        }
    }
}

// Older indexes may carry numeric priorities.
fn priority_token<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Token {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Token::deserialize(deserializer)? {
        Token::Text(text) => text,
        Token::Number(number) => number.to_string(),
    })
}

/// Index of one root, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Index {
    entries: IndexMap<String, IndexEntry>,
}

impl Index {
    /// Read a root's index from disk.
    pub fn load(storage: &Storage, root: Root) -> Result<Self> {
        let path = storage.index_file(root);
        let content = fs::read_to_string(&path)?;
        serde_json::from_str(&content).map_err(|source| Error::CorruptIndex { path, source })
    }

    /// Overwrite a root's index on disk.
    pub fn save(&self, storage: &Storage, root: Root) -> Result<()> {
        storage.write_json(&storage.index_file(root), self)
    }

    /// Insert or replace the entry for `id` and persist the whole index.
    pub fn upsert(storage: &Storage, root: Root, id: TaskId, task: &Task) -> Result<()> {
        let mut index = Self::load(storage, root)?;
        index.insert(id, IndexEntry::from(task));
        index.save(storage, root)?;
        tracing::debug!(id, %root, "index entry written");
        Ok(())
    }

    /// Drop the entry for `id` (if any) and persist the whole index.
    pub fn remove(storage: &Storage, root: Root, id: TaskId) -> Result<()> {
        let mut index = Self::load(storage, root)?;
        index.entries.shift_remove(&id.to_string());
        index.save(storage, root)?;
        tracing::debug!(id, %root, "index entry removed");
        Ok(())
    }

    /// Whether the cached index of `root` lists `id`.
    ///
    /// This reflects the cache, not the record files.
    pub fn contains(storage: &Storage, root: Root, id: TaskId) -> Result<bool> {
        Ok(Self::load(storage, root)?.contains_id(id))
    }

    pub fn insert(&mut self, id: TaskId, entry: IndexEntry) {
        self.insert_key(id.to_string(), entry);
    }

    /// Insert under a raw key. Reindexing keys entries by file name, which
    /// is not guaranteed to be numeric.
    pub fn insert_key(&mut self, key: String, entry: IndexEntry) {
        self.entries.insert(key, entry);
    }

    pub fn contains_id(&self, id: TaskId) -> bool {
        self.entries.contains_key(&id.to_string())
    }

    pub fn get(&self, id: TaskId) -> Option<&IndexEntry> {
        self.entries.get(&id.to_string())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &IndexEntry)> {
        self.entries.iter().map(|(key, entry)| (key.as_str(), entry))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn task(title: &str, pri: &str, tags: &[&str]) -> Task {
        Task {
            title: title.to_string(),
            pri: pri.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            description: "not indexed".to_string(),
        }
    }

    #[test]
    fn upsert_then_remove() {
        let temp = TempDir::new().unwrap();
        let storage = Storage::open(temp.path()).unwrap();

        Index::upsert(&storage, Root::Active, 1, &task("one", "5", &["a"])).unwrap();
        Index::upsert(&storage, Root::Active, 2, &task("two", "3", &[])).unwrap();
        assert!(Index::contains(&storage, Root::Active, 1).unwrap());
        assert!(!Index::contains(&storage, Root::Archive, 1).unwrap());

        Index::remove(&storage, Root::Active, 1).unwrap();
        let index = Index::load(&storage, Root::Active).unwrap();
        assert_eq!(index.keys().collect::<Vec<_>>(), vec!["2"]);
        assert_eq!(index.get(2).unwrap().title, "two");
    }

    #[test]
    fn upsert_replaces_in_place() {
        let temp = TempDir::new().unwrap();
        let storage = Storage::open(temp.path()).unwrap();

        Index::upsert(&storage, Root::Active, 1, &task("one", "5", &[])).unwrap();
        Index::upsert(&storage, Root::Active, 2, &task("two", "5", &[])).unwrap();
        Index::upsert(&storage, Root::Active, 1, &task("uno", "9", &["x"])).unwrap();

        let index = Index::load(&storage, Root::Active).unwrap();
        assert_eq!(index.keys().collect::<Vec<_>>(), vec!["1", "2"]);
        assert_eq!(
            index.get(1).unwrap(),
            &IndexEntry {
                title: "uno".to_string(),
                pri: "9".to_string(),
                tags: vec!["x".to_string()],
            }
        );
    }

    #[test]
    fn persisted_form_omits_description() {
        let temp = TempDir::new().unwrap();
        let storage = Storage::open(temp.path()).unwrap();

        Index::upsert(&storage, Root::Active, 4, &task("t", "1", &["a"])).unwrap();
        let raw = fs::read_to_string(storage.index_file(Root::Active)).unwrap();
        assert_eq!(
            raw,
            "{\n \"4\": {\n  \"title\": \"t\",\n  \"pri\": \"1\",\n  \"tags\": [\n   \"a\"\n  ]\n }\n}\n"
        );
    }

    #[test]
    fn numeric_priority_is_accepted() {
        let temp = TempDir::new().unwrap();
        let storage = Storage::open(temp.path()).unwrap();
        fs::write(
            storage.index_file(Root::Active),
            r#"{"1":{"title":"legacy","pri":5,"tags":["x"]}}"#,
        )
        .unwrap();

        let index = Index::load(&storage, Root::Active).unwrap();
        assert_eq!(index.get(1).unwrap().pri, "5");
    }

    #[test]
    fn unparsable_index_is_corrupt() {
        let temp = TempDir::new().unwrap();
        let storage = Storage::open(temp.path()).unwrap();
        fs::write(storage.index_file(Root::Archive), "{\"1\": {").unwrap();

        let err = Index::load(&storage, Root::Archive).unwrap_err();
        assert!(matches!(err, Error::CorruptIndex { .. }));
    }
}
