//! The task database handle.
//!
//! [`TaskDb`] binds the record files, index caches and id counter of one
//! storage directory into the operations the CLI consumes.
//!
//! # Concurrency
//!
//! Every call reads what it needs from disk and writes whole files back. There
//! is no locking and no conflict detection: two processes mutating the same
//! directory can lose counter or index updates, the last writer winning. Run
//! one writer per directory.

use std::path::PathBuf;

use crate::archive;
use crate::counter;
use crate::error::Result;
use crate::index::Index;
use crate::patch::Patch;
use crate::query::{self, ListOptions, TaskSummary};
use crate::record::{self, Task, TaskId};
use crate::reindex::{self, ReindexReport};
use crate::storage::{Root, Storage};

#[derive(Debug, Clone)]
pub struct TaskDb {
    storage: Storage,
}

impl TaskDb {
    /// Open a storage directory, creating its skeleton when it is missing or
    /// empty. Any other non-empty directory is rejected.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let storage = Storage::open(path)?;
        tracing::debug!(base = %storage.base().display(), "opened task directory");
        Ok(Self { storage })
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// Allocate an id and write `patch` as a new task under it.
    pub fn create(&self, patch: &Patch, root: Root) -> Result<TaskId> {
        let id = counter::next_id(&self.storage)?;
        self.update(id, patch, root)?;
        Ok(id)
    }

    /// Create a task from record text.
    pub fn create_raw(&self, text: &str, root: Root) -> Result<TaskId> {
        let id = counter::next_id(&self.storage)?;
        self.update_raw(id, text, root)?;
        Ok(id)
    }

    pub fn read(&self, id: TaskId, root: Root) -> Result<Task> {
        Ok(record::parse(&self.read_raw(id, root)?))
    }

    /// The record file's text, unparsed.
    pub fn read_raw(&self, id: TaskId, root: Root) -> Result<String> {
        self.storage.read_record(root, id)
    }

    pub fn list(&self, options: &ListOptions, root: Root) -> Result<Vec<TaskSummary>> {
        let index = Index::load(&self.storage, root)?;
        Ok(query::list(&index, options))
    }

    /// Every tag used by an active task, in first-seen index order.
    pub fn list_tags(&self) -> Result<Vec<String>> {
        let tasks = self.list(&ListOptions::default(), Root::Active)?;
        Ok(record::dedupe(tasks.into_iter().flat_map(|task| task.tags)))
    }

    /// Merge `patch` into the task (or into nothing, if the index does not
    /// know `id`), then rewrite its index entry and record file.
    pub fn update(&self, id: TaskId, patch: &Patch, root: Root) -> Result<Task> {
        let existing = self.existing(id, root)?;
        self.write(id, patch.apply(existing.as_ref()), root)
    }

    /// Parse record text and apply it to the task as a patch.
    ///
    /// Tags in the text are added to the existing ones; none are removed.
    pub fn update_raw(&self, id: TaskId, text: &str, root: Root) -> Result<Task> {
        let patch = Patch::from(record::parse(text));
        self.update(id, &patch, root)
    }

    /// Remove the index entry, then the record file.
    ///
    /// Fails with [`crate::Error::NotFound`] when the record file is missing,
    /// after the index entry has already been dropped.
    pub fn delete(&self, id: TaskId, root: Root) -> Result<()> {
        Index::remove(&self.storage, root, id)?;
        self.storage.delete_record(root, id)?;
        tracing::debug!(id, %root, "task deleted");
        Ok(())
    }

    /// Whether the index of `root` lists `id`.
    pub fn exists(&self, id: TaskId, root: Root) -> Result<bool> {
        Index::contains(&self.storage, root, id)
    }

    /// Move an active task to the archive. `Ok(false)` if it is not active.
    pub fn archive(&self, id: TaskId) -> Result<bool> {
        archive::toggle(self, id, Root::Archive)
    }

    /// Move an archived task back. `Ok(false)` if it is not archived.
    pub fn unarchive(&self, id: TaskId) -> Result<bool> {
        archive::toggle(self, id, Root::Active)
    }

    /// Rebuild both index caches from the record files.
    pub fn reindex(&self) -> Result<ReindexReport> {
        reindex::reindex(&self.storage)
    }

    fn existing(&self, id: TaskId, root: Root) -> Result<Option<Task>> {
        if self.exists(id, root)? {
            self.read(id, root).map(Some)
        } else {
            Ok(None)
        }
    }

    fn write(&self, id: TaskId, task: Task, root: Root) -> Result<Task> {
        Index::upsert(&self.storage, root, id, &task)?;
        self.storage.write_record(root, id, &record::build(&task))?;
        tracing::debug!(id, %root, "task written");
        Ok(task)
    }
}
