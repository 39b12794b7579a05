//! Task id allocation from the persisted counter.
//!
//! The counter file holds the last id handed out. Allocation is a plain
//! read-increment-write with no lock, so two processes allocating against the
//! same directory at once can hand out the same id.

use std::fs;

use crate::error::{Error, Result};
use crate::record::TaskId;
use crate::storage::Storage;

/// Read the last allocated id without advancing it.
pub fn current(storage: &Storage) -> Result<TaskId> {
    let path = storage.counter_file();
    let raw = fs::read_to_string(&path)?;
    raw.trim()
        .parse::<TaskId>()
        .map_err(|_| Error::CorruptCounter {
            path,
            value: raw.clone(),
        })
}

/// Allocate the next id and persist it.
pub fn next_id(storage: &Storage) -> Result<TaskId> {
    let id = current(storage)? + 1;
    fs::write(storage.counter_file(), id.to_string())?;
    tracing::debug!(id, "allocated task id");
    Ok(id)
}
