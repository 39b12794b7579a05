#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use ted::{Patch, Root, TaskDb};
use tempfile::TempDir;

pub struct TestDir {
    dir: TempDir,
    db: TaskDb,
}

impl TestDir {
    pub fn init() -> Self {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        let db = TaskDb::open(dir.path()).expect("failed to open task directory");
        Self { dir, db }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn db(&self) -> &TaskDb {
        &self.db
    }

    pub fn root_dir(&self, root: Root) -> PathBuf {
        self.db.storage().root_dir(root)
    }

    /// Write a file straight into a root, bypassing the index.
    pub fn write_file(&self, root: Root, name: &str, contents: &str) -> PathBuf {
        let path = self.root_dir(root).join(name);
        fs::write(&path, contents).expect("write file");
        path
    }

    pub fn remove_file(&self, root: Root, name: &str) {
        fs::remove_file(self.root_dir(root).join(name)).expect("remove file");
    }

    pub fn index_keys(&self, root: Root) -> Vec<String> {
        let raw = fs::read_to_string(self.db.storage().index_file(root)).expect("read index");
        let value: serde_json::Value = serde_json::from_str(&raw).expect("parse index");
        value
            .as_object()
            .expect("index is an object")
            .keys()
            .cloned()
            .collect()
    }

    pub fn record_names(&self, root: Root) -> Vec<String> {
        self.db
            .storage()
            .list_record_names(root)
            .expect("list records")
    }

    pub fn create(&self, title: &str, pri: &str, tags: &[&str]) -> u64 {
        let mut patch = Patch::default()
            .title(title)
            .pri(pri)
            .description(format!("about {title}"));
        for tag in tags {
            patch = patch.tag(*tag);
        }
        self.db.create(&patch, Root::Active).expect("create task")
    }
}
