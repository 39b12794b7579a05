//! Record codec: one task per flat file.
//!
//! A record file is three blank-line separated parts:
//!
//! ```text
//! <title>
//!
//! <pri> <tag1> <tag2> ...
//!
//! <description, which may itself contain blank lines>
//! ```

use serde::{Deserialize, Serialize};

const PART_SEPARATOR: &str = "\n\n";
const TOKEN_SEPARATOR: char = ' ';

/// Numeric task identifier. Also the record's file name.
pub type TaskId = u64;

/// A task as stored in its record file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub title: String,
    pub pri: String,
    pub tags: Vec<String>,
    pub description: String,
}

/// Parse record text into a task.
///
/// Text with fewer than two blank-line boundaries is tolerated: missing parts
/// come back empty so a single bad file never blocks a reindex.
pub fn parse(text: &str) -> Task {
    let mut parts = text.split(PART_SEPARATOR);
    let title = parts.next().unwrap_or_default().to_string();
    let pri_line = parts.next();
    let description = parts.collect::<Vec<_>>().join(PART_SEPARATOR);

    let Some(pri_line) = pri_line else {
        tracing::warn!(title = %title, "record has no priority line");
        return Task {
            title,
            ..Task::default()
        };
    };

    // The first token is the priority even when empty; `build` writes an
    // empty priority as a leading separator.
    let mut tokens = pri_line.split(TOKEN_SEPARATOR);
    let pri = tokens.next().unwrap_or_default().to_string();
    let tags = dedupe(
        tokens
            .filter(|token| !token.is_empty())
            .map(str::to_string),
    );

    Task {
        title,
        pri,
        tags,
        description,
    }
}

/// Render a task as record text. Inverse of [`parse`].
pub fn build(task: &Task) -> String {
    let mut pri_line = task.pri.clone();
    for tag in &task.tags {
        pri_line.push(TOKEN_SEPARATOR);
        pri_line.push_str(tag);
    }
    format!(
        "{}{sep}{}{sep}{}",
        task.title,
        pri_line,
        task.description,
        sep = PART_SEPARATOR
    )
}

/// Keep the first occurrence of every tag, preserving order.
pub(crate) fn dedupe(tags: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for tag in tags {
        if !out.contains(&tag) {
            out.push(tag);
        }
    }
    out
}
