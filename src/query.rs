//! Filtering, ordering and limiting over an index.
//!
//! Text forms, shared by the CLI flags, the shell and the config file:
//!
//! - filter: `& t1 t2` (all tags), `| t1 t2` (any tag), `/ regex` (title
//!   match), empty for none
//! - order: space separated column names, `-` prefix for descending, e.g.
//!   `-pri id`

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use regex::{Regex, RegexBuilder};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::index::{Index, IndexEntry};

/// A listed task: its index key plus the indexed fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskSummary {
    pub id: String,
    pub title: String,
    pub pri: String,
    pub tags: Vec<String>,
}

impl TaskSummary {
    fn new(id: &str, entry: &IndexEntry) -> Self {
        Self {
            id: id.to_string(),
            title: entry.title.clone(),
            pri: entry.pri.clone(),
            tags: entry.tags.clone(),
        }
    }
}

/// Which tasks a listing keeps.
#[derive(Debug, Clone, Default)]
pub enum Filter {
    #[default]
    None,
    /// Tasks carrying every listed tag
    All(Vec<String>),
    /// Tasks carrying at least one listed tag
    Any(Vec<String>),
    /// Tasks whose title matches, case-insensitively
    Match(Regex),
}

impl Filter {
    pub fn title_match(pattern: &str) -> Result<Self> {
        RegexBuilder::new(pattern)
            .case_insensitive(true)
            .unicode(true)
            .build()
            .map(Filter::Match)
            .map_err(|err| Error::InvalidArgument(format!("bad filter pattern: {err}")))
    }

    pub fn matches(&self, entry: &IndexEntry) -> bool {
        match self {
            Filter::None => true,
            Filter::All(tags) => tags.iter().all(|tag| entry.tags.contains(tag)),
            Filter::Any(tags) => tags.iter().any(|tag| entry.tags.contains(tag)),
            Filter::Match(regex) => regex.is_match(&entry.title),
        }
    }
}

impl FromStr for Filter {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self> {
        let mut words = raw.split_whitespace();
        let Some(symbol) = words.next() else {
            return Ok(Filter::None);
        };
        let params: Vec<String> = words.map(str::to_string).collect();
        match symbol {
            "&" => Ok(Filter::All(params)),
            "|" => Ok(Filter::Any(params)),
            "/" => Filter::title_match(&params.join(" ")),
            other => Err(Error::InvalidArgument(format!(
                "bad filter symbol '{other}' (expected &, | or /)"
            ))),
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::None => Ok(()),
            Filter::All(tags) => write!(f, "& {}", tags.join(" ")),
            Filter::Any(tags) => write!(f, "| {}", tags.join(" ")),
            Filter::Match(regex) => write!(f, "/ {}", regex.as_str()),
        }
    }
}

/// A sortable column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Id,
    Title,
    Pri,
    Tags,
}

impl Column {
    fn is_numeric(self) -> bool {
        matches!(self, Column::Id | Column::Pri)
    }

    fn value(self, task: &TaskSummary) -> String {
        match self {
            Column::Id => task.id.clone(),
            Column::Title => task.title.clone(),
            Column::Pri => task.pri.clone(),
            Column::Tags => task.tags.join(" "),
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Column::Id => "id",
            Column::Title => "title",
            Column::Pri => "pri",
            Column::Tags => "tags",
        }
    }
}

impl FromStr for Column {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self> {
        match raw {
            "id" => Ok(Column::Id),
            "title" => Ok(Column::Title),
            "pri" => Ok(Column::Pri),
            "tags" => Ok(Column::Tags),
            other => Err(Error::InvalidArgument(format!(
                "unknown column '{other}' (expected id, title, pri or tags)"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderKey {
    pub column: Column,
    pub direction: Direction,
}

impl OrderKey {
    pub fn asc(column: Column) -> Self {
        Self {
            column,
            direction: Direction::Asc,
        }
    }

    pub fn desc(column: Column) -> Self {
        Self {
            column,
            direction: Direction::Desc,
        }
    }

    fn compare(&self, left: &TaskSummary, right: &TaskSummary) -> Ordering {
        let left = self.column.value(left);
        let right = self.column.value(right);
        let ordering = if self.column.is_numeric() {
            compare_numeric(&left, &right)
        } else {
            left.cmp(&right)
        };
        match self.direction {
            Direction::Asc => ordering,
            Direction::Desc => ordering.reverse(),
        }
    }
}

/// Numbers compare by value and sort before anything non-numeric; the rest
/// compares as text.
fn compare_numeric(left: &str, right: &str) -> Ordering {
    match (left.trim().parse::<f64>(), right.trim().parse::<f64>()) {
        (Ok(l), Ok(r)) => l.total_cmp(&r),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => left.cmp(right),
    }
}

/// Sort keys applied left to right; later keys break ties of earlier ones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Order(pub Vec<OrderKey>);

impl Order {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn compare(&self, left: &TaskSummary, right: &TaskSummary) -> Ordering {
        self.0
            .iter()
            .map(|key| key.compare(left, right))
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    }
}

impl FromStr for Order {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self> {
        raw.split_whitespace()
            .map(|expr| match expr.strip_prefix('-') {
                Some(column) => column.parse().map(OrderKey::desc),
                None => expr.parse().map(OrderKey::asc),
            })
            .collect::<Result<Vec<_>>>()
            .map(Order)
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let exprs: Vec<String> = self
            .0
            .iter()
            .map(|key| match key.direction {
                Direction::Asc => key.column.as_str().to_string(),
                Direction::Desc => format!("-{}", key.column.as_str()),
            })
            .collect();
        f.write_str(&exprs.join(" "))
    }
}

/// What a listing returns.
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    pub filter: Filter,
    pub order: Order,
    /// `None` lists everything
    pub limit: Option<usize>,
}

/// Filter, sort and truncate the entries of an index.
///
/// Ties on every order key keep index order.
pub fn list(index: &Index, options: &ListOptions) -> Vec<TaskSummary> {
    let mut tasks: Vec<TaskSummary> = index
        .iter()
        .filter(|(_, entry)| options.filter.matches(entry))
        .map(|(id, entry)| TaskSummary::new(id, entry))
        .collect();

    if !options.order.is_empty() {
        tasks.sort_by(|left, right| options.order.compare(left, right));
    }
    if let Some(limit) = options.limit {
        tasks.truncate(limit);
    }
    tasks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(title: &str, pri: &str, tags: &[&str]) -> IndexEntry {
        IndexEntry {
            title: title.to_string(),
            pri: pri.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    fn sample_index() -> Index {
        let mut index = Index::default();
        index.insert(1, entry("Buy milk", "9", &["x", "y"]));
        index.insert(2, entry("Write report", "10", &["x"]));
        index.insert(3, entry("Call Ölaf", "2", &["y", "z"]));
        index.insert(4, entry("buy stamps", "9", &["x", "y", "z"]));
        index
    }

    fn ids(tasks: &[TaskSummary]) -> Vec<&str> {
        tasks.iter().map(|t| t.id.as_str()).collect()
    }

    #[test]
    fn no_options_keeps_index_order() {
        let tasks = list(&sample_index(), &ListOptions::default());
        assert_eq!(ids(&tasks), vec!["1", "2", "3", "4"]);
    }

    #[test]
    fn all_filter_requires_superset() {
        let options = ListOptions {
            filter: "& x y".parse().unwrap(),
            ..ListOptions::default()
        };
        assert_eq!(ids(&list(&sample_index(), &options)), vec!["1", "4"]);
    }

    #[test]
    fn any_filter_requires_intersection() {
        let options = ListOptions {
            filter: "| z".parse().unwrap(),
            ..ListOptions::default()
        };
        assert_eq!(ids(&list(&sample_index(), &options)), vec!["3", "4"]);
    }

    #[test]
    fn match_filter_is_case_insensitive_and_unicode() {
        let options = ListOptions {
            filter: "/ ^buy".parse().unwrap(),
            ..ListOptions::default()
        };
        assert_eq!(ids(&list(&sample_index(), &options)), vec!["1", "4"]);

        let options = ListOptions {
            filter: "/ ölaf".parse().unwrap(),
            ..ListOptions::default()
        };
        assert_eq!(ids(&list(&sample_index(), &options)), vec!["3"]);
    }

    #[test]
    fn bad_filters_are_rejected() {
        assert!("? x".parse::<Filter>().is_err());
        assert!("/ (unclosed".parse::<Filter>().is_err());
        assert!(matches!("".parse::<Filter>().unwrap(), Filter::None));
    }

    #[test]
    fn priority_sorts_numerically() {
        let options = ListOptions {
            order: "-pri".parse().unwrap(),
            ..ListOptions::default()
        };
        let tasks = list(&sample_index(), &options);
        assert_eq!(ids(&tasks), vec!["2", "1", "4", "3"]);
    }

    #[test]
    fn later_keys_break_ties() {
        let options = ListOptions {
            order: "-pri -id".parse().unwrap(),
            ..ListOptions::default()
        };
        assert_eq!(ids(&list(&sample_index(), &options)), vec!["2", "4", "1", "3"]);

        let options = ListOptions {
            order: "pri title".parse().unwrap(),
            ..ListOptions::default()
        };
        assert_eq!(ids(&list(&sample_index(), &options)), vec!["3", "1", "4", "2"]);
    }

    #[test]
    fn non_numeric_priorities_sort_after_numbers() {
        let mut index = sample_index();
        index.insert(5, entry("someday", "later", &[]));
        let options = ListOptions {
            order: "pri".parse().unwrap(),
            ..ListOptions::default()
        };
        assert_eq!(ids(&list(&index, &options)).last(), Some(&"5"));
    }

    #[test]
    fn limit_truncates_after_sorting() {
        let options = ListOptions {
            order: "-pri".parse().unwrap(),
            limit: Some(2),
            ..ListOptions::default()
        };
        assert_eq!(ids(&list(&sample_index(), &options)), vec!["2", "1"]);

        let options = ListOptions {
            limit: Some(0),
            ..ListOptions::default()
        };
        assert!(list(&sample_index(), &options).is_empty());
    }

    #[test]
    fn order_text_roundtrips() {
        let order: Order = "-pri id title".parse().unwrap();
        assert_eq!(
            order,
            Order(vec![
                OrderKey::desc(Column::Pri),
                OrderKey::asc(Column::Id),
                OrderKey::asc(Column::Title),
            ])
        );
        assert_eq!(order.to_string(), "-pri id title");
        assert!("-colour".parse::<Order>().is_err());
    }
}
