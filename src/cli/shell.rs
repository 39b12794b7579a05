//! Interactive shell.
//!
//! Each input line is parsed into a [`Command`] and run against the task
//! directory with the caller's [`Session`]. The shell is generic over its
//! input, output and editor so it can be driven from tests.

use std::io::{self, BufRead, Write};

use crate::cli::editor::{ExternalEditor, TextEditor};
use crate::cli::task::task_rows;
use crate::cli::{load_context, split_tag_exprs, Globals};
use crate::config::{Config, TasksConfig};
use crate::db::TaskDb;
use crate::error::{Error, Result};
use crate::output::columnize;
use crate::patch::Patch;
use crate::record::TaskId;
use crate::session::Session;
use crate::storage::Root;

const PROMPT: &str = "> ";
const NO_SUCH_TASK: &str = "No such task!";

const HELP: &str = "
    <empty>               List tasks that match the current filter
    <id>                  Show task #<id>
    f                     Show current filter
    f & <t1> [<t2> ..]    Set filter for all matching tags
    f | <t1> [<t2> ..]    Set filter for any matching tag
    f / <regex>           Set filter for given regex
    F                     Reset filter
    o                     Show current order
    o <col1> [<col2> ..]  Set column(s) to order the list by. Prefix column names with \"-\" for descending order
    O                     Reset order
    l                     Show current limit
    l <lim>               Set limit
    L                     Reset limit
    c                     Create new task with system editor
    c <title>             Create new task immediately with the given title
    e <id>                Edit task with system editor
    t                     Show tag list
    t <id> <t1> [<t2> ..] Add/remove tags to/from task. Prefix a tag with \"-\" to remove it.
    p <id> <pri>          Set task priority
    d <id>                Delete task completely
    a <id>                Archive task
    A <id>                Unarchive task
    a                     Start working on archived tasks
    A                     Stop working on archived tasks
    h                     Help
    q                     Quit
    reindex               Update the internal index. Call after manual updates
";

/// One shell input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List,
    View(TaskId),
    /// Show (`None`) or set the filter
    Filter(Option<String>),
    ResetFilter,
    /// Show (`None`) or set the order
    Order(Option<String>),
    ResetOrder,
    /// Show (`None`) or set the limit
    Limit(Option<String>),
    ResetLimit,
    /// Quick-create with a title, or create in the editor
    Create(Option<String>),
    Edit(TaskId),
    Tags,
    Tag { id: TaskId, exprs: Vec<String> },
    Priority { id: TaskId, pri: String },
    Delete(TaskId),
    /// Archive a task, or switch the session to the archive
    Archive(Option<TaskId>),
    /// Unarchive a task, or switch the session back to active tasks
    Unarchive(Option<TaskId>),
    Help,
    Quit,
    Reindex,
}

impl Command {
    /// Parse one input line. Unknown verbs ask for help.
    pub fn parse(line: &str) -> Result<Self> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Ok(Command::List);
        };
        let args: Vec<&str> = words.collect();

        if let Ok(id) = verb.parse::<TaskId>() {
            return Ok(Command::View(id));
        }

        let rest = || (!args.is_empty()).then(|| args.join(" "));
        let command = match verb {
            "list" => Command::List,
            "f" => Command::Filter(rest()),
            "F" => Command::ResetFilter,
            "o" => Command::Order(rest()),
            "O" => Command::ResetOrder,
            "l" => Command::Limit(rest()),
            "L" => Command::ResetLimit,
            "c" => Command::Create(rest()),
            "e" => Command::Edit(required_id(&args)?),
            "t" if args.is_empty() => Command::Tags,
            "t" => Command::Tag {
                id: required_id(&args)?,
                exprs: args[1..].iter().map(|s| s.to_string()).collect(),
            },
            "p" => Command::Priority {
                id: required_id(&args)?,
                pri: args
                    .get(1)
                    .map(|s| s.to_string())
                    .ok_or_else(|| Error::InvalidArgument("missing priority".to_string()))?,
            },
            "d" => Command::Delete(required_id(&args)?),
            "a" => Command::Archive(optional_id(&args)?),
            "A" => Command::Unarchive(optional_id(&args)?),
            "q" => Command::Quit,
            "reindex" => Command::Reindex,
            _ => Command::Help,
        };
        Ok(command)
    }
}

fn optional_id(args: &[&str]) -> Result<Option<TaskId>> {
    args.first().map(|raw| parse_id(raw)).transpose()
}

fn required_id(args: &[&str]) -> Result<TaskId> {
    optional_id(args)?.ok_or_else(|| Error::InvalidArgument("missing task id".to_string()))
}

fn parse_id(raw: &str) -> Result<TaskId> {
    raw.parse()
        .map_err(|_| Error::InvalidArgument(format!("bad task id '{raw}'")))
}

/// Whether the loop keeps reading after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Shell<R, W, E> {
    db: TaskDb,
    defaults: TasksConfig,
    session: Session,
    input: R,
    output: W,
    editor: E,
}

impl<R: BufRead, W: Write, E: TextEditor> Shell<R, W, E> {
    pub fn new(
        db: TaskDb,
        config: &Config,
        session: Session,
        input: R,
        output: W,
        editor: E,
    ) -> Self {
        Self {
            db,
            defaults: config.tasks.clone(),
            session,
            input,
            output,
            editor,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Read and run commands until `q` or end of input.
    ///
    /// Command errors are printed and the loop goes on; only failures to
    /// read input or write output end it.
    pub fn run(&mut self) -> Result<()> {
        loop {
            self.prompt()?;
            let Some(line) = self.read_line()? else {
                break;
            };
            match Command::parse(&line).and_then(|command| self.execute(command)) {
                Ok(Flow::Continue) => {}
                Ok(Flow::Quit) => break,
                Err(err) => {
                    tracing::debug!(error = %err, line = %line, "shell command failed");
                    writeln!(self.output, "error: {err}")?;
                }
            }
        }
        Ok(())
    }

    pub fn execute(&mut self, command: Command) -> Result<Flow> {
        let root = self.session.root;
        match command {
            Command::List => {
                let tasks = self.db.list(&self.session.list, root)?;
                writeln!(self.output, "{}", columnize(&task_rows(&tasks)))?;
            }
            Command::View(id) => {
                if self.db.exists(id, root)? {
                    let text = self.db.read_raw(id, root)?;
                    writeln!(self.output, "{text}")?;
                } else {
                    writeln!(self.output, "{NO_SUCH_TASK}")?;
                }
            }
            Command::Filter(None) => writeln!(self.output, "{}", self.session.list.filter)?,
            Command::Filter(Some(raw)) => self.session.set_filter(&raw)?,
            Command::ResetFilter => self.session.reset_filter(),
            Command::Order(None) => writeln!(self.output, "{}", self.session.list.order)?,
            Command::Order(Some(raw)) => self.session.set_order(&raw)?,
            Command::ResetOrder => self.session.reset_order(),
            Command::Limit(None) => {
                let limit = self
                    .session
                    .list
                    .limit
                    .map(|limit| limit.to_string())
                    .unwrap_or_else(|| "none".to_string());
                writeln!(self.output, "{limit}")?;
            }
            Command::Limit(Some(raw)) => self.session.set_limit(&raw)?,
            Command::ResetLimit => self.session.reset_limit(),
            Command::Create(Some(title)) => {
                let patch = Patch::default()
                    .title(title)
                    .pri(self.defaults.priority.clone())
                    .description(self.defaults.description.clone());
                let id = self.db.create(&patch, root)?;
                writeln!(self.output, "{id}")?;
            }
            Command::Create(None) => {
                let template = format!(
                    "{}\n\n{}\n\n{}",
                    self.defaults.title, self.defaults.priority, self.defaults.description
                );
                let text = self.editor.edit(&template)?;
                let id = self.db.create_raw(&text, root)?;
                writeln!(self.output, "{id}")?;
            }
            Command::Edit(id) => {
                if self.require(id)? {
                    let current = self.db.read_raw(id, root)?;
                    let edited = self.editor.edit(&current)?;
                    self.db.update_raw(id, &edited, root)?;
                }
            }
            Command::Tags => {
                let tags = self.db.list_tags()?;
                writeln!(self.output, "{}", tags.join("\n"))?;
            }
            Command::Tag { id, exprs } => {
                if self.require(id)? {
                    let (tags, detags) = split_tag_exprs(&exprs);
                    let patch = Patch {
                        tags,
                        detags,
                        ..Patch::default()
                    };
                    self.db.update(id, &patch, root)?;
                }
            }
            Command::Priority { id, pri } => {
                if self.require(id)? {
                    self.db.update(id, &Patch::default().pri(pri), root)?;
                }
            }
            Command::Delete(id) => {
                if self.require(id)? {
                    let task = self.db.read(id, root)?;
                    write!(self.output, "Delete \"{}\"?\ny/n? ", task.title)?;
                    self.output.flush()?;
                    let answer = self.read_line()?.unwrap_or_default();
                    if answer.trim() == "y" {
                        self.db.delete(id, root)?;
                    }
                }
            }
            Command::Archive(Some(id)) => self.move_task(id, Root::Archive)?,
            Command::Archive(None) => self.session.switch_root(Some(Root::Archive)),
            Command::Unarchive(Some(id)) => self.move_task(id, Root::Active)?,
            Command::Unarchive(None) => self.session.switch_root(Some(Root::Active)),
            Command::Help => writeln!(self.output, "{HELP}")?,
            Command::Quit => return Ok(Flow::Quit),
            Command::Reindex => {
                let report = self.db.reindex()?;
                writeln!(
                    self.output,
                    "Reindexed {} active, {} archived",
                    report.active, report.archive
                )?;
            }
        }
        Ok(Flow::Continue)
    }

    /// Check the session's root lists `id`, telling the user when it does not.
    fn require(&mut self, id: TaskId) -> Result<bool> {
        if self.db.exists(id, self.session.root)? {
            return Ok(true);
        }
        writeln!(self.output, "{NO_SUCH_TASK}")?;
        Ok(false)
    }

    fn move_task(&mut self, id: TaskId, destination: Root) -> Result<()> {
        let moved = match destination {
            Root::Archive => self.db.archive(id)?,
            Root::Active => self.db.unarchive(id)?,
        };
        if !moved {
            writeln!(self.output, "{NO_SUCH_TASK}")?;
        }
        Ok(())
    }

    fn prompt(&mut self) -> Result<()> {
        let marker = if self.session.root.is_archive() { "a" } else { "" };
        write!(self.output, "\n{marker}{PROMPT}")?;
        self.output.flush()?;
        Ok(())
    }

    fn read_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }
}

/// Run the interactive shell on stdin/stdout.
pub fn run(globals: &Globals) -> Result<()> {
    let ctx = load_context(globals)?;
    let mut session = Session::from_config(&ctx.config.list)?;
    session.switch_root(Some(globals.root_kind()));

    let stdin = io::stdin();
    let mut shell = Shell::new(
        ctx.db,
        &ctx.config,
        session,
        stdin.lock(),
        io::stdout(),
        ExternalEditor,
    );
    shell.run()
}
