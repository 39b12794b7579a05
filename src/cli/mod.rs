//! Command-line interface for ted
//!
//! This module defines the CLI structure using clap derive macros. One-shot
//! commands live in `task`, the interactive loop in `shell`.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::db::TaskDb;
use crate::error::{Error, Result};
use crate::storage::Root;

pub mod editor;
pub mod shell;
mod task;

/// ted - a flat-file task tracker
///
/// Tasks are plain text files in a directory, one per task, with a JSON index
/// for fast listing. Run without a subcommand for the interactive shell.
#[derive(Parser, Debug)]
#[command(name = "ted")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Task directory (must be an existing task directory or empty)
    #[arg(long, global = true, env = "TED_ROOT")]
    pub root: Option<PathBuf>,

    /// Configuration file
    #[arg(long, global = true, env = "TED_CONFIG")]
    pub config: Option<PathBuf>,

    /// Operate on archived tasks
    #[arg(short, long, global = true)]
    pub archive: bool,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Interactive shell (the default)
    Shell,

    /// List tasks
    List {
        /// Filter: "& tag..." (all), "| tag..." (any) or "/ regex" (title)
        #[arg(short, long, allow_hyphen_values = true)]
        filter: Option<String>,

        /// Order: column names (id, title, pri, tags), "-" prefix for descending
        #[arg(short, long, allow_hyphen_values = true)]
        order: Option<String>,

        /// Maximum number of tasks
        #[arg(short, long, conflicts_with = "all")]
        limit: Option<usize>,

        /// List every matching task
        #[arg(long)]
        all: bool,
    },

    /// Show a task
    Show {
        id: u64,

        /// Print the record file as stored
        #[arg(long)]
        raw: bool,
    },

    /// Create a task (opens the editor when no title is given)
    New {
        /// Title words
        title: Vec<String>,

        /// Priority (defaults to tasks.priority from config)
        #[arg(short, long)]
        pri: Option<String>,

        /// Tag to add (repeatable)
        #[arg(short, long = "tag")]
        tags: Vec<String>,

        /// Description (defaults to tasks.description from config)
        #[arg(short, long)]
        description: Option<String>,
    },

    /// Edit a task's record in the editor
    Edit { id: u64 },

    /// Add tags to a task; prefix a tag with "-" to remove it
    Tag {
        id: u64,

        #[arg(required = true, allow_hyphen_values = true)]
        tags: Vec<String>,
    },

    /// List every tag in use by active tasks
    Tags,

    /// Set a task's priority
    Pri { id: u64, pri: String },

    /// Delete a task
    Rm {
        id: u64,

        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Move an active task to the archive
    Archive { id: u64 },

    /// Move an archived task back to the active tasks
    Unarchive { id: u64 },

    /// Rebuild the indexes from the task files (run after manual edits)
    Reindex,
}

/// Flags shared by every command
#[derive(Debug, Clone)]
pub struct Globals {
    pub root: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub archive: bool,
    pub json: bool,
    pub quiet: bool,
}

impl Globals {
    pub fn root_kind(&self) -> Root {
        Root::from_archive_flag(self.archive)
    }
}

/// An opened task directory plus its configuration
pub struct Context {
    pub db: TaskDb,
    pub config: Config,
}

pub fn load_context(globals: &Globals) -> Result<Context> {
    let config = Config::load_or_default(globals.config.as_ref())?;
    let root = globals.root.clone().ok_or_else(|| {
        Error::InvalidArgument("no task directory given (use --root or TED_ROOT)".to_string())
    })?;
    let db = TaskDb::open(root)?;
    Ok(Context { db, config })
}

impl Cli {
    /// Run the CLI command
    pub fn run(self) -> Result<()> {
        let globals = Globals {
            root: self.root,
            config: self.config,
            archive: self.archive,
            json: self.json,
            quiet: self.quiet,
        };

        match self.command.unwrap_or(Commands::Shell) {
            Commands::Shell => shell::run(&globals),
            Commands::List {
                filter,
                order,
                limit,
                all,
            } => task::run_list(
                &globals,
                task::ListArgs {
                    filter,
                    order,
                    limit,
                    all,
                },
            ),
            Commands::Show { id, raw } => task::run_show(&globals, id, raw),
            Commands::New {
                title,
                pri,
                tags,
                description,
            } => task::run_new(
                &globals,
                task::NewArgs {
                    title: title.join(" "),
                    pri,
                    tags,
                    description,
                },
            ),
            Commands::Edit { id } => task::run_edit(&globals, id),
            Commands::Tag { id, tags } => task::run_tag(&globals, id, tags),
            Commands::Tags => task::run_tags(&globals),
            Commands::Pri { id, pri } => task::run_pri(&globals, id, pri),
            Commands::Rm { id, yes } => task::run_rm(&globals, id, yes),
            Commands::Archive { id } => task::run_move(&globals, id, Root::Archive),
            Commands::Unarchive { id } => task::run_move(&globals, id, Root::Active),
            Commands::Reindex => task::run_reindex(&globals),
        }
    }
}

/// Split tag words into additions and `-`-prefixed removals.
pub(crate) fn split_tag_exprs(exprs: &[String]) -> (Vec<String>, Vec<String>) {
    let mut tags = Vec::new();
    let mut detags = Vec::new();
    for expr in exprs {
        match expr.strip_prefix('-') {
            Some(tag) if !tag.is_empty() => detags.push(tag.to_string()),
            Some(_) => {}
            None => tags.push(expr.clone()),
        }
    }
    (tags, detags)
}
