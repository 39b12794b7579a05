//! ted - flat-file task tracker library
//!
//! Tasks live as one plain-text file each under a storage directory, with a
//! JSON index per root (active, archive) for fast listing. The record files
//! are the source of truth; the indexes are caches that `reindex` rebuilds.
//!
//! # Module Organization
//!
//! - `record`: record file codec
//! - `counter`: id allocation
//! - `storage`: directory layout, skeleton and record file I/O
//! - `index`: per-root index cache
//! - `patch`: partial updates with tag add/remove
//! - `query`: filtering, ordering and limits over an index
//! - `archive`: moving tasks between roots
//! - `reindex`: rebuilding indexes from record files
//! - `db`: the `TaskDb` handle composing the above
//! - `session`: caller-owned listing state for the shell
//! - `config`: optional TOML configuration
//! - `output`: human and JSON output
//! - `cli`: command-line interface using clap
//! - `error`: error types and result aliases

pub mod archive;
pub mod cli;
pub mod config;
pub mod counter;
pub mod db;
pub mod error;
pub mod index;
pub mod output;
pub mod patch;
pub mod query;
pub mod record;
pub mod reindex;
pub mod session;
pub mod storage;

pub use db::TaskDb;
pub use error::{Error, Result};
pub use patch::Patch;
pub use record::{Task, TaskId};
pub use storage::Root;
