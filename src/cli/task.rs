//! ted one-shot command implementations.

use std::io::{self, BufRead, Write};

use serde::Serialize;

use crate::cli::editor::{ExternalEditor, TextEditor};
use crate::cli::{load_context, split_tag_exprs, Context, Globals};
use crate::error::{Error, Result};
use crate::output::{columnize, emit_success, HumanOutput, OutputOptions};
use crate::patch::Patch;
use crate::query::{ListOptions, TaskSummary};
use crate::record::{Task, TaskId};
use crate::reindex::ReindexReport;
use crate::storage::Root;

pub struct ListArgs {
    pub filter: Option<String>,
    pub order: Option<String>,
    pub limit: Option<usize>,
    pub all: bool,
}

pub struct NewArgs {
    pub title: String,
    pub pri: Option<String>,
    pub tags: Vec<String>,
    pub description: Option<String>,
}

#[derive(Serialize)]
struct TaskListOutput {
    root: Root,
    total: usize,
    tasks: Vec<TaskSummary>,
}

#[derive(Serialize)]
struct TaskOutput {
    id: TaskId,
    root: Root,
    #[serde(flatten)]
    task: Task,
}

#[derive(Serialize)]
struct TaskIdOutput {
    id: TaskId,
    root: Root,
}

#[derive(Serialize)]
struct TagsOutput {
    tags: Vec<String>,
}

#[derive(Serialize)]
struct DeleteOutput {
    id: TaskId,
    root: Root,
    deleted: bool,
}

fn output_options(globals: &Globals) -> OutputOptions {
    OutputOptions {
        json: globals.json,
        quiet: globals.quiet,
    }
}

fn require_task(ctx: &Context, id: TaskId, root: Root) -> Result<()> {
    if ctx.db.exists(id, root)? {
        Ok(())
    } else {
        Err(Error::NotFound { id, root })
    }
}

/// Rows for a task table: id, title, pri, tags.
pub(crate) fn task_rows(tasks: &[TaskSummary]) -> Vec<Vec<String>> {
    tasks
        .iter()
        .map(|task| {
            vec![
                task.id.clone(),
                task.title.clone(),
                task.pri.clone(),
                task.tags.join(" "),
            ]
        })
        .collect()
}

pub fn run_list(globals: &Globals, args: ListArgs) -> Result<()> {
    let ctx = load_context(globals)?;
    let root = globals.root_kind();
    let defaults = &ctx.config.list;

    let filter = match args.filter.as_deref() {
        Some(raw) => raw.parse()?,
        None => defaults.parsed_filter()?,
    };
    let order = match args.order.as_deref() {
        Some(raw) => raw.parse()?,
        None => defaults.parsed_order()?,
    };
    let limit = if args.all {
        None
    } else {
        Some(args.limit.unwrap_or(defaults.limit))
    };

    let tasks = ctx.db.list(
        &ListOptions {
            filter,
            order,
            limit,
        },
        root,
    )?;

    let human = if tasks.is_empty() {
        HumanOutput::plain("No tasks")
    } else {
        HumanOutput::plain(columnize(&task_rows(&tasks)))
    };

    emit_success(
        output_options(globals),
        "list",
        &TaskListOutput {
            root,
            total: tasks.len(),
            tasks,
        },
        Some(&human),
    )
}

pub fn run_show(globals: &Globals, id: TaskId, raw: bool) -> Result<()> {
    let ctx = load_context(globals)?;
    let root = globals.root_kind();
    require_task(&ctx, id, root)?;

    let text = ctx.db.read_raw(id, root)?;
    let task = crate::record::parse(&text);

    let human = if raw {
        HumanOutput::plain(text)
    } else {
        let mut human = HumanOutput::new(format!("#{id} {}", task.title));
        human.push_summary("Priority", task.pri.clone());
        human.push_summary("Tags", task.tags.join(" "));
        if root.is_archive() {
            human.push_summary("Archived", "");
        }
        for line in task.description.lines() {
            human.push_detail(line);
        }
        human
    };

    emit_success(
        output_options(globals),
        "show",
        &TaskOutput { id, root, task },
        Some(&human),
    )
}

pub fn run_new(globals: &Globals, args: NewArgs) -> Result<()> {
    let ctx = load_context(globals)?;
    let root = globals.root_kind();
    let defaults = &ctx.config.tasks;

    let id = if args.title.trim().is_empty() {
        let template = format!(
            "{}\n\n{}\n\n{}",
            defaults.title, defaults.priority, defaults.description
        );
        let text = ExternalEditor.edit(&template)?;
        ctx.db.create_raw(&text, root)?
    } else {
        let patch = Patch {
            title: Some(args.title.trim().to_string()),
            pri: Some(args.pri.unwrap_or_else(|| defaults.priority.clone())),
            tags: args.tags,
            detags: Vec::new(),
            description: Some(
                args.description
                    .unwrap_or_else(|| defaults.description.clone()),
            ),
        };
        ctx.db.create(&patch, root)?
    };

    let human = HumanOutput::plain(id.to_string());
    emit_success(
        output_options(globals),
        "new",
        &TaskIdOutput { id, root },
        Some(&human),
    )
}

pub fn run_edit(globals: &Globals, id: TaskId) -> Result<()> {
    let ctx = load_context(globals)?;
    let root = globals.root_kind();
    require_task(&ctx, id, root)?;

    let current = ctx.db.read_raw(id, root)?;
    let edited = ExternalEditor.edit(&current)?;
    let task = ctx.db.update_raw(id, &edited, root)?;

    let mut human = HumanOutput::new("Task updated");
    human.push_summary("ID", id.to_string());
    human.push_summary("Title", task.title.clone());
    emit_success(
        output_options(globals),
        "edit",
        &TaskOutput { id, root, task },
        Some(&human),
    )
}

pub fn run_tag(globals: &Globals, id: TaskId, exprs: Vec<String>) -> Result<()> {
    let ctx = load_context(globals)?;
    let root = globals.root_kind();
    require_task(&ctx, id, root)?;

    let (tags, detags) = split_tag_exprs(&exprs);
    let patch = Patch {
        tags,
        detags,
        ..Patch::default()
    };
    let task = ctx.db.update(id, &patch, root)?;

    let mut human = HumanOutput::new("Task tagged");
    human.push_summary("ID", id.to_string());
    human.push_summary("Tags", task.tags.join(" "));
    emit_success(
        output_options(globals),
        "tag",
        &TaskOutput { id, root, task },
        Some(&human),
    )
}

pub fn run_tags(globals: &Globals) -> Result<()> {
    let ctx = load_context(globals)?;
    let tags = ctx.db.list_tags()?;
    let human = HumanOutput::plain(tags.join("\n"));
    emit_success(
        output_options(globals),
        "tags",
        &TagsOutput { tags },
        Some(&human),
    )
}

pub fn run_pri(globals: &Globals, id: TaskId, pri: String) -> Result<()> {
    let ctx = load_context(globals)?;
    let root = globals.root_kind();
    require_task(&ctx, id, root)?;

    let pri = pri.trim();
    if pri.is_empty() || pri.contains(char::is_whitespace) {
        return Err(Error::InvalidArgument(
            "priority must be a single word".to_string(),
        ));
    }
    let task = ctx.db.update(id, &Patch::default().pri(pri), root)?;

    let mut human = HumanOutput::new("Priority set");
    human.push_summary("ID", id.to_string());
    human.push_summary("Priority", task.pri.clone());
    emit_success(
        output_options(globals),
        "pri",
        &TaskOutput { id, root, task },
        Some(&human),
    )
}

pub fn run_rm(globals: &Globals, id: TaskId, yes: bool) -> Result<()> {
    let ctx = load_context(globals)?;
    let root = globals.root_kind();
    require_task(&ctx, id, root)?;

    let deleted = if yes {
        true
    } else {
        let task = ctx.db.read(id, root)?;
        confirm(&format!("Delete \"{}\"?\ny/n? ", task.title))?
    };
    if deleted {
        ctx.db.delete(id, root)?;
    }

    let human = if deleted {
        HumanOutput::plain(format!("Deleted #{id}"))
    } else {
        HumanOutput::plain("Kept")
    };
    emit_success(
        output_options(globals),
        "rm",
        &DeleteOutput { id, root, deleted },
        Some(&human),
    )
}

pub fn run_move(globals: &Globals, id: TaskId, destination: Root) -> Result<()> {
    let ctx = load_context(globals)?;
    let moved = match destination {
        Root::Archive => ctx.db.archive(id)?,
        Root::Active => ctx.db.unarchive(id)?,
    };
    if !moved {
        return Err(Error::NotFound {
            id,
            root: destination.opposite(),
        });
    }

    let command = match destination {
        Root::Archive => "archive",
        Root::Active => "unarchive",
    };
    let human = HumanOutput::plain(format!("#{id} moved to {destination}"));
    emit_success(
        output_options(globals),
        command,
        &TaskIdOutput {
            id,
            root: destination,
        },
        Some(&human),
    )
}

pub fn run_reindex(globals: &Globals) -> Result<()> {
    let ctx = load_context(globals)?;
    let report: ReindexReport = ctx.db.reindex()?;

    let mut human = HumanOutput::new("Reindexed");
    human.push_summary("Active", report.active.to_string());
    human.push_summary("Archived", report.archive.to_string());
    emit_success(output_options(globals), "reindex", &report, Some(&human))
}

fn confirm(question: &str) -> Result<bool> {
    let mut stderr = io::stderr();
    write!(stderr, "{question}")?;
    stderr.flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(answer.trim() == "y")
}
