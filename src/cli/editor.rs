//! External editor invocation for record text.

use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::process::{Command, ExitStatus};

use tempfile::NamedTempFile;

use crate::error::{Error, Result};

/// Something that lets the user edit record text.
pub trait TextEditor {
    fn edit(&self, initial: &str) -> Result<String>;
}

/// `$VISUAL`, then `$EDITOR`, then `vi`, on a temporary file.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExternalEditor;

impl TextEditor for ExternalEditor {
    fn edit(&self, initial: &str) -> Result<String> {
        let mut temp = NamedTempFile::new()?;
        temp.write_all(initial.as_bytes())?;
        temp.flush()?;
        let path = temp.path().to_path_buf();

        let status = launch_editor(&path)?;
        if !status.success() {
            let detail = status
                .code()
                .map(|code| format!("exit code {code}"))
                .unwrap_or_else(|| "signal".to_string());
            return Err(Error::Editor(format!("editor exited with {detail}")));
        }

        Ok(fs::read_to_string(&path)?)
    }
}

fn launch_editor(path: &Path) -> Result<ExitStatus> {
    let mut attempted: Vec<String> = Vec::new();
    for candidate in editor_candidates() {
        let parts = split_editor_command(&candidate);
        if parts.is_empty() {
            continue;
        }
        attempted.push(parts[0].clone());
        let mut command = Command::new(&parts[0]);
        command.args(&parts[1..]).arg(path);
        tracing::debug!(editor = %parts[0], path = %path.display(), "launching editor");
        match command.status() {
            Ok(status) => return Ok(status),
            Err(err) if err.kind() == io::ErrorKind::NotFound => continue,
            Err(err) => {
                return Err(Error::Editor(format!(
                    "failed to launch editor '{}': {err}",
                    parts[0]
                )));
            }
        }
    }
    Err(Error::Editor(format!(
        "no editor found (tried {})",
        attempted.join(", ")
    )))
}

fn editor_candidates() -> Vec<String> {
    let mut out = Vec::new();
    for var in ["VISUAL", "EDITOR"] {
        if let Ok(value) = std::env::var(var) {
            if !value.trim().is_empty() {
                out.push(value);
            }
        }
    }
    out.push("vi".to_string());
    out
}

fn split_editor_command(value: &str) -> Vec<String> {
    value
        .split_whitespace()
        .map(|part| part.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn editor_command_splits_arguments() {
        assert_eq!(
            split_editor_command("code --wait"),
            vec!["code".to_string(), "--wait".to_string()]
        );
        assert!(split_editor_command("   ").is_empty());
    }

    #[test]
    fn vi_is_the_last_resort() {
        assert_eq!(editor_candidates().last().map(String::as_str), Some("vi"));
    }
}
