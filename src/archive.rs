//! Moving tasks between the active and archive roots.
//!
//! A move is delete-then-recreate under the same id; ids are never
//! reassigned.

use crate::db::TaskDb;
use crate::error::Result;
use crate::patch::Patch;
use crate::record::TaskId;
use crate::storage::Root;

/// Move task `id` into `destination` from the other root.
///
/// Returns `Ok(false)` without touching anything when the source index does
/// not list the task.
pub fn toggle(db: &TaskDb, id: TaskId, destination: Root) -> Result<bool> {
    let source = destination.opposite();
    if !db.exists(id, source)? {
        return Ok(false);
    }

    let task = db.read(id, source)?;
    db.delete(id, source)?;
    db.update(id, &Patch::from(task), destination)?;
    tracing::debug!(id, from = %source, to = %destination, "task moved");
    Ok(true)
}
