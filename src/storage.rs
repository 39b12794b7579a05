//! Storage layer for ted
//!
//! All state lives under a single storage directory:
//!
//! ```text
//! <root>/                       # Active root
//!   counter                     # Last assigned task id ("0" initially)
//!   index                       # Index cache for active tasks ("{}" initially)
//!   <id>                        # One record file per active task
//!   archive/                    # Archive root
//!     index                     # Index cache for archived tasks
//!     <id>                      # One record file per archived task
//! ```
//!
//! Writes are plain whole-file overwrites. There is no locking: exactly one
//! process is expected to mutate a storage directory at a time.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{Error, Result};
use crate::record::TaskId;

/// Name of the counter file in the active root
pub const COUNTER_FILE: &str = "counter";

/// Name of the index file in each root
pub const INDEX_FILE: &str = "index";

/// Name of the archive subdirectory
pub const ARCHIVE_DIR: &str = "archive";

const INITIAL_COUNTER: &str = "0";
const INITIAL_INDEX: &str = "{}";

/// Which of the two parallel record locations an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Root {
    #[default]
    Active,
    Archive,
}

impl Root {
    pub fn from_archive_flag(archive: bool) -> Self {
        if archive {
            Root::Archive
        } else {
            Root::Active
        }
    }

    pub fn is_archive(self) -> bool {
        self == Root::Archive
    }

    /// The other root; where a task goes when it is archived or unarchived.
    pub fn opposite(self) -> Self {
        match self {
            Root::Active => Root::Archive,
            Root::Archive => Root::Active,
        }
    }
}

impl fmt::Display for Root {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Root::Active => f.write_str("active"),
            Root::Archive => f.write_str("archive"),
        }
    }
}

enum SkeletonKind {
    Dir,
    File(&'static str),
}

const SKELETON: [(&str, SkeletonKind); 4] = [
    (COUNTER_FILE, SkeletonKind::File(INITIAL_COUNTER)),
    (INDEX_FILE, SkeletonKind::File(INITIAL_INDEX)),
    (ARCHIVE_DIR, SkeletonKind::Dir),
    ("archive/index", SkeletonKind::File(INITIAL_INDEX)),
];

/// Storage manager for one task directory
#[derive(Debug, Clone)]
pub struct Storage {
    base: PathBuf,
}

impl Storage {
    /// Bind to a storage directory without touching the filesystem.
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    /// Bind to a storage directory, creating the skeleton when the directory
    /// is missing or empty.
    ///
    /// A non-empty directory that lacks any skeleton path is rejected with
    /// [`Error::InvalidRoot`] before anything is written.
    pub fn open(base: impl Into<PathBuf>) -> Result<Self> {
        let storage = Self::new(base);
        if storage.base.exists() {
            if !storage.base.is_dir() {
                return Err(Error::InvalidRoot(storage.base.clone()));
            }
            if !storage.is_initialized() && !is_empty_dir(&storage.base)? {
                return Err(Error::InvalidRoot(storage.base.clone()));
            }
        }
        storage.init_skeleton()?;
        Ok(storage)
    }

    // =========================================================================
    // Paths
    // =========================================================================

    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Directory holding the records of a root
    pub fn root_dir(&self, root: Root) -> PathBuf {
        match root {
            Root::Active => self.base.clone(),
            Root::Archive => self.base.join(ARCHIVE_DIR),
        }
    }

    pub fn counter_file(&self) -> PathBuf {
        self.base.join(COUNTER_FILE)
    }

    pub fn index_file(&self, root: Root) -> PathBuf {
        self.root_dir(root).join(INDEX_FILE)
    }

    pub fn record_file(&self, root: Root, id: TaskId) -> PathBuf {
        self.root_dir(root).join(id.to_string())
    }

    // =========================================================================
    // Skeleton
    // =========================================================================

    /// Check that every skeleton path exists
    pub fn is_initialized(&self) -> bool {
        SKELETON
            .iter()
            .all(|(rel, _)| self.base.join(rel).exists())
    }

    fn init_skeleton(&self) -> Result<()> {
        fs::create_dir_all(&self.base)?;
        for (rel, kind) in SKELETON.iter() {
            let path = self.base.join(rel);
            if path.exists() {
                continue;
            }
            match kind {
                SkeletonKind::Dir => fs::create_dir_all(&path)?,
                SkeletonKind::File(initial) => fs::write(&path, initial)?,
            }
            tracing::debug!(path = %path.display(), "created skeleton path");
        }
        Ok(())
    }

    // =========================================================================
    // Record files
    // =========================================================================

    /// Read a record file. Invalid UTF-8 is replaced rather than rejected.
    pub fn read_record(&self, root: Root, id: TaskId) -> Result<String> {
        read_lossy(&self.record_file(root, id)).map_err(|err| not_found(err, id, root))
    }

    /// Read a record by file name, for names that need not be numeric.
    pub fn read_record_named(&self, root: Root, name: &str) -> Result<String> {
        Ok(read_lossy(&self.root_dir(root).join(name))?)
    }

    pub fn write_record(&self, root: Root, id: TaskId, text: &str) -> Result<()> {
        fs::write(self.record_file(root, id), text)?;
        Ok(())
    }

    pub fn delete_record(&self, root: Root, id: TaskId) -> Result<()> {
        fs::remove_file(self.record_file(root, id)).map_err(|err| not_found(err, id, root))
    }

    /// Names of the record files in a root, sorted with numeric names first
    /// in ascending order.
    ///
    /// Reserved names (`index`, `counter`, `archive`) and hidden entries are
    /// skipped. Nothing else is validated: a stray file is reported as a
    /// record.
    pub fn list_record_names(&self, root: Root) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(self.root_dir(root))? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if is_reserved(&name) || name.starts_with('.') {
                continue;
            }
            names.push(name);
        }
        names.sort_by(|left, right| {
            match (left.parse::<TaskId>(), right.parse::<TaskId>()) {
                (Ok(l), Ok(r)) => l.cmp(&r),
                (Ok(_), Err(_)) => std::cmp::Ordering::Less,
                (Err(_), Ok(_)) => std::cmp::Ordering::Greater,
                (Err(_), Err(_)) => left.cmp(right),
            }
        });
        Ok(names)
    }

    // =========================================================================
    // File I/O helpers
    // =========================================================================

    /// Write JSON with one-space indentation and a trailing newline.
    ///
    /// This overwrites the file in place; a crash mid-write leaves it torn.
    pub fn write_json<T: Serialize>(&self, path: &Path, data: &T) -> Result<()> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b" ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        data.serialize(&mut serializer)?;
        buf.push(b'\n');
        fs::write(path, buf)?;
        Ok(())
    }
}

fn is_reserved(name: &str) -> bool {
    matches!(name, INDEX_FILE | COUNTER_FILE | ARCHIVE_DIR)
}

fn read_lossy(path: &Path) -> io::Result<String> {
    let bytes = fs::read(path)?;
    Ok(match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => {
            tracing::warn!(path = %path.display(), "record is not valid UTF-8");
            String::from_utf8_lossy(err.as_bytes()).into_owned()
        }
    })
}

fn is_empty_dir(path: &Path) -> Result<bool> {
    Ok(fs::read_dir(path)?.next().is_none())
}

fn not_found(err: io::Error, id: TaskId, root: Root) -> Error {
    if err.kind() == io::ErrorKind::NotFound {
        Error::NotFound { id, root }
    } else {
        Error::Io(err)
    }
}
