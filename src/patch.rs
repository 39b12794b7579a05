//! Partial task updates.

use serde::{Deserialize, Serialize};

use crate::record::{dedupe, Task};

/// A partial update to a task.
///
/// Empty `title`, `pri` and `description` values count as absent. `tags` are
/// appended to the existing tags and `detags` removed from the result, so one
/// patch can both add and remove tags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pri: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub detags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Patch {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn pri(mut self, pri: impl Into<String>) -> Self {
        self.pri = Some(pri.into());
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn detag(mut self, tag: impl Into<String>) -> Self {
        self.detags.push(tag.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Merge this patch into `existing`, or into an empty task when there is
    /// none yet.
    pub fn apply(&self, existing: Option<&Task>) -> Task {
        let base = existing.cloned().unwrap_or_default();

        let tags = dedupe(base.tags.into_iter().chain(self.tags.iter().cloned()))
            .into_iter()
            .filter(|tag| !self.detags.contains(tag))
            .collect();

        Task {
            title: pick(&self.title, base.title),
            pri: pick(&self.pri, base.pri),
            tags,
            description: pick(&self.description, base.description),
        }
    }
}

/// A full task as a patch: every field set, every tag added.
impl From<Task> for Patch {
    fn from(task: Task) -> Self {
        Self {
            title: Some(task.title),
            pri: Some(task.pri),
            tags: task.tags,
            detags: Vec::new(),
            description: Some(task.description),
        }
    }
}

fn pick(patched: &Option<String>, existing: String) -> String {
    match patched {
        Some(value) if !value.is_empty() => value.clone(),
        _ => existing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn existing() -> Task {
        Task {
            title: "Buy milk".to_string(),
            pri: "3".to_string(),
            tags: vec!["y".to_string(), "z".to_string()],
            description: "2%".to_string(),
        }
    }

    #[test]
    fn tags_concat_then_dedupe_then_remove() {
        let patch = Patch::default().tag("x").detag("y");
        let merged = patch.apply(Some(&existing()));
        assert_eq!(merged.tags, vec!["z", "x"]);
    }

    #[test]
    fn dedupe_keeps_first_occurrence() {
        let patch = Patch::default().tag("z").tag("w").tag("y");
        let merged = patch.apply(Some(&existing()));
        assert_eq!(merged.tags, vec!["y", "z", "w"]);
    }

    #[test]
    fn adding_and_removing_the_same_tag_removes_it() {
        let patch = Patch::default().tag("x").detag("x");
        let merged = patch.apply(Some(&existing()));
        assert_eq!(merged.tags, vec!["y", "z"]);
    }

    #[test]
    fn scalar_fields_replace_only_when_non_empty() {
        let merged = Patch::default().pri("5").apply(Some(&existing()));
        assert_eq!(merged.title, "Buy milk");
        assert_eq!(merged.pri, "5");
        assert_eq!(merged.description, "2%");

        let merged = Patch::default()
            .title("")
            .description("")
            .apply(Some(&existing()));
        assert_eq!(merged.title, "Buy milk");
        assert_eq!(merged.description, "2%");
    }

    #[test]
    fn missing_existing_passes_patch_through() {
        let patch = Patch::default()
            .title("New")
            .pri("1")
            .tag("a")
            .tag("a")
            .description("body");
        let merged = patch.apply(None);
        assert_eq!(
            merged,
            Task {
                title: "New".to_string(),
                pri: "1".to_string(),
                tags: vec!["a".to_string()],
                description: "body".to_string(),
            }
        );

        assert!(Patch::default().apply(None).tags.is_empty());
    }

    #[test]
    fn full_task_patch_recreates_task() {
        let task = existing();
        assert_eq!(Patch::from(task.clone()).apply(None), task);
    }
}
