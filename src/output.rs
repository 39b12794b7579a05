//! Shared output formatting for ted CLI commands.

use serde::Serialize;

use crate::error::Result;

pub const SCHEMA_VERSION: &str = "ted.v1";

const COLUMN_GAP: &str = "  ";

#[derive(Debug, Clone, Copy)]
pub struct OutputOptions {
    pub json: bool,
    pub quiet: bool,
}

#[derive(Debug, Clone)]
pub struct HumanOutput {
    header: String,
    body: Option<String>,
    summary: Vec<(String, String)>,
    details: Vec<String>,
}

impl HumanOutput {
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            body: None,
            summary: Vec::new(),
            details: Vec::new(),
        }
    }

    /// Output printed verbatim, without header or sections.
    pub fn plain(body: impl Into<String>) -> Self {
        let mut output = Self::new("");
        output.body = Some(body.into());
        output
    }

    pub fn push_summary(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.summary.push((key.into(), value.into()));
    }

    pub fn push_detail(&mut self, value: impl Into<String>) {
        self.details.push(value.into());
    }
}

pub fn emit_success<T: Serialize>(
    options: OutputOptions,
    command: &str,
    data: &T,
    human: Option<&HumanOutput>,
) -> Result<()> {
    if options.json {
        #[derive(Serialize)]
        struct Envelope<'a, T: Serialize> {
            schema_version: &'static str,
            command: &'a str,
            status: &'static str,
            data: &'a T,
        }

        let payload = Envelope {
            schema_version: SCHEMA_VERSION,
            command,
            status: "success",
            data,
        };

        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    if options.quiet {
        return Ok(());
    }

    if let Some(human) = human {
        println!("{}", format_human(human));
    }

    Ok(())
}

pub fn emit_error(command: &str, err: &crate::error::Error, json: bool) -> Result<()> {
    let hint = error_hint(err);
    if json {
        #[derive(Serialize)]
        struct ErrorBody<'a> {
            message: &'a str,
            code: i32,
            kind: &'static str,
            #[serde(skip_serializing_if = "Option::is_none")]
            details: Option<serde_json::Value>,
        }

        #[derive(Serialize)]
        struct Envelope<'a> {
            schema_version: &'static str,
            command: &'a str,
            status: &'static str,
            error: ErrorBody<'a>,
            #[serde(skip_serializing_if = "Option::is_none")]
            hint: Option<&'a str>,
        }

        let payload = Envelope {
            schema_version: SCHEMA_VERSION,
            command,
            status: "error",
            error: ErrorBody {
                message: &err.to_string(),
                code: err.exit_code(),
                kind: error_kind(err),
                details: err.details(),
            },
            hint,
        };

        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    eprintln!("error: {err}");
    if let Some(hint) = hint {
        eprintln!("hint: {hint}");
    }
    Ok(())
}

pub fn format_human(output: &HumanOutput) -> String {
    if let Some(body) = output.body.as_ref() {
        return body.clone();
    }

    let mut lines = Vec::new();
    lines.push(output.header.clone());

    push_summary(&mut lines, &output.summary);
    push_section(&mut lines, "Details", &output.details);

    lines.join("\n")
}

/// Left-align rows into columns separated by two spaces.
///
/// Widths count chars, so non-ASCII titles line up in most terminals. The
/// last column is never padded.
pub fn columnize(rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = Vec::new();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            let width = cell.chars().count();
            match widths.get_mut(i) {
                Some(current) => *current = (*current).max(width),
                None => widths.push(width),
            }
        }
    }

    rows.iter()
        .map(|row| {
            let last = row.len().saturating_sub(1);
            let cells: Vec<String> = row
                .iter()
                .enumerate()
                .map(|(i, cell)| {
                    if i == last {
                        cell.clone()
                    } else {
                        format!("{cell:<width$}", width = widths[i])
                    }
                })
                .collect();
            cells.join(COLUMN_GAP).trim_end().to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn infer_command_name_from_args() -> String {
    let mut skip_value = false;

    for arg in std::env::args().skip(1) {
        if skip_value {
            skip_value = false;
            continue;
        }
        if matches!(arg.as_str(), "--root" | "--config") {
            skip_value = true;
            continue;
        }
        if arg.starts_with('-') {
            continue;
        }
        return arg;
    }

    "shell".to_string()
}

fn error_kind(err: &crate::error::Error) -> &'static str {
    match err.exit_code() {
        2 => "user_error",
        _ => "operation_failed",
    }
}

fn error_hint(err: &crate::error::Error) -> Option<&'static str> {
    use crate::error::Error;

    match err {
        Error::CorruptIndex { .. } => Some("ted reindex"),
        Error::NotFound { .. } => Some("ted list --all"),
        Error::InvalidRoot(_) => Some("point --root at an empty or existing task directory"),
        Error::InvalidConfig(_) => Some("fix the config file then retry"),
        Error::Editor(_) => Some("set $VISUAL or $EDITOR"),
        _ => None,
    }
}

fn push_summary(lines: &mut Vec<String>, summary: &[(String, String)]) {
    if summary.is_empty() {
        return;
    }

    lines.push(String::new());
    lines.push("Summary:".to_string());
    for (key, value) in summary {
        if value.is_empty() {
            lines.push(format!("- {key}"));
        } else {
            lines.push(format!("- {key}: {value}"));
        }
    }
}

fn push_section(lines: &mut Vec<String>, title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }

    lines.push(String::new());
    lines.push(format!("{title}:"));
    for item in items {
        lines.push(format!("- {item}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn columnize_aligns_cells() {
        let rows = vec![
            row(&["1", "Buy milk", "3", "errand"]),
            row(&["12", "Go", "10", ""]),
        ];
        assert_eq!(
            columnize(&rows),
            "1   Buy milk  3   errand\n12  Go        10"
        );
    }

    #[test]
    fn columnize_empty() {
        assert_eq!(columnize(&[]), "");
    }

    #[test]
    fn format_human_sections() {
        let mut human = HumanOutput::new("Task updated");
        human.push_summary("ID", "4");
        human.push_detail("careful");
        assert_eq!(
            format_human(&human),
            "Task updated\n\nSummary:\n- ID: 4\n\nDetails:\n- careful"
        );
    }

    #[test]
    fn plain_output_is_verbatim() {
        let human = HumanOutput::plain("a\n\nb");
        assert_eq!(format_human(&human), "a\n\nb");
    }
}
