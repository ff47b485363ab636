//! The template entity and its id source.
use chrono::{SecondsFormat, Utc};
use log::warn;
use serde::{Deserialize, Serialize};

/// Identifier of a template.
pub type TemplateId = u64;

/// Represents a single saved message template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    /// Unique identifier, assigned at creation
    pub id: TemplateId,
    /// Template title, set at creation
    pub title: String,
    /// Message body
    #[serde(default)]
    pub content: String,
    /// Creation time as an ISO-8601 UTC string
    pub created_at: String,
}

impl Template {
    /// Creates a new template with empty content, stamped with the current time
    pub fn new(id: TemplateId, title: String) -> Self {
        Template {
            id,
            title,
            content: String::new(),
            created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }

    /// Applies a shallow merge of the given fields
    pub fn apply(&mut self, patch: &TemplatePatch) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(content) = &patch.content {
            self.content = content.clone();
        }
    }
}

/// Fields of a template that can be replaced by an update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplatePatch {
    pub title: Option<String>,
    pub content: Option<String>,
}

impl TemplatePatch {
    /// A patch that only replaces the content
    pub fn content(content: impl Into<String>) -> Self {
        Self {
            title: None,
            content: Some(content.into()),
        }
    }
}

/// Hands out template ids that are unique for the lifetime of the process.
///
/// Ids track wall-clock milliseconds so they stay roughly time-ordered, but
/// never repeat: two ids requested within the same millisecond differ by one.
#[derive(Debug, Default)]
pub struct IdGenerator {
    last: TemplateId,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the next id, strictly greater than every id handed out or observed.
    ///
    /// Once `u64::MAX` has been reached there is nothing greater left, so the
    /// smallest id for which `is_taken` returns `false` is used instead.
    pub fn next_id(&mut self, is_taken: impl Fn(TemplateId) -> bool) -> TemplateId {
        match self.last.checked_add(1) {
            Some(floor) => {
                let now = u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0);
                let id = now.max(floor);
                self.last = id;
                id
            }
            None => {
                warn!("Template ids exhausted, falling back to the smallest free id");
                (1..=TemplateId::MAX)
                    .find(|id| !is_taken(*id))
                    .unwrap_or_default()
            }
        }
    }

    /// Records an id that came from outside, so it will not be handed out again
    pub fn observe(&mut self, id: TemplateId) {
        self.last = self.last.max(id);
    }
}
