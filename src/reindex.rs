//! Rebuilding index caches from record files.
//!
//! Both indexes are derived data. After manual edits, a crash mid-write or a
//! corrupt index, `reindex` discards them and rebuilds each from the records
//! present in its root. Malformed records are indexed with whatever the codec
//! recovers from them.

use serde::Serialize;

use crate::error::Result;
use crate::index::{Index, IndexEntry};
use crate::record;
use crate::storage::{Root, Storage};

/// Entry counts of the rebuilt indexes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReindexReport {
    pub active: usize,
    pub archive: usize,
}

/// Rebuild the index of every root.
pub fn reindex(storage: &Storage) -> Result<ReindexReport> {
    Ok(ReindexReport {
        active: reindex_root(storage, Root::Active)?,
        archive: reindex_root(storage, Root::Archive)?,
    })
}

/// Rebuild one root's index, returning how many entries it now holds.
pub fn reindex_root(storage: &Storage, root: Root) -> Result<usize> {
    let mut index = Index::default();
    for name in storage.list_record_names(root)? {
        let text = storage.read_record_named(root, &name)?;
        let task = record::parse(&text);
        index.insert_key(name, IndexEntry::from(&task));
    }
    index.save(storage, root)?;
    tracing::debug!(%root, entries = index.len(), "index rebuilt");
    Ok(index.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn rebuilds_from_records_only() {
        let temp = TempDir::new().unwrap();
        let storage = Storage::open(temp.path()).unwrap();
        storage
            .write_record(Root::Active, 2, "two\n\n1 a\n\nbody")
            .unwrap();
        storage.write_record(Root::Archive, 5, "five\n\n3\n\n").unwrap();
        fs::write(storage.index_file(Root::Active), "not json").unwrap();

        let report = reindex(&storage).unwrap();
        assert_eq!(report, ReindexReport { active: 1, archive: 1 });

        let active = Index::load(&storage, Root::Active).unwrap();
        assert_eq!(active.keys().collect::<Vec<_>>(), vec!["2"]);
        assert_eq!(active.get(2).unwrap().tags, vec!["a"]);

        let archive = Index::load(&storage, Root::Archive).unwrap();
        assert_eq!(archive.get(5).unwrap().title, "five");
    }

    #[test]
    fn malformed_record_gets_degraded_entry() {
        let temp = TempDir::new().unwrap();
        let storage = Storage::open(temp.path()).unwrap();
        storage.write_record(Root::Active, 1, "just a title").unwrap();

        assert_eq!(reindex_root(&storage, Root::Active).unwrap(), 1);
        let entry = Index::load(&storage, Root::Active)
            .unwrap()
            .get(1)
            .cloned()
            .unwrap();
        assert_eq!(entry.title, "just a title");
        assert_eq!(entry.pri, "");
        assert!(entry.tags.is_empty());
    }
}
