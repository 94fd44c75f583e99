//! UI-agnostic conversation state
//!
//! The log is append-only and lives only as long as the chat that owns it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::format::{self, FormattedSegment};

/// Who wrote a conversation entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Author {
    User,
    Assistant,
}

/// One finalized message in the conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationEntry {
    id: String,
    author: Author,
    text: String,
    segments: Vec<FormattedSegment>,
    created_at: DateTime<Utc>,
}

impl ConversationEntry {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn author(&self) -> Author {
        self.author
    }

    /// Display text with any emphasis markers already removed
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn segments(&self) -> &[FormattedSegment] {
        &self.segments
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[derive(Debug, Clone, Default)]
pub struct ConversationLog {
    entries: Vec<ConversationEntry>,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a user message verbatim.
    pub(crate) fn push_user(&mut self, text: &str) -> &ConversationEntry {
        self.push(Author::User, vec![FormattedSegment::plain(text)])
    }

    /// Append an assistant message from its formatted segments.
    pub(crate) fn push_assistant(&mut self, segments: Vec<FormattedSegment>) -> &ConversationEntry {
        self.push(Author::Assistant, segments)
    }

    fn push(&mut self, author: Author, segments: Vec<FormattedSegment>) -> &ConversationEntry {
        let entry = ConversationEntry {
            id: Uuid::new_v4().simple().to_string(),
            author,
            text: format::joined(&segments),
            segments,
            created_at: Utc::now(),
        };
        self.entries.push(entry);
        &self.entries[self.entries.len() - 1]
    }

    pub fn entries(&self) -> &[ConversationEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ConversationEntry> {
        self.entries.iter()
    }

    pub fn last(&self) -> Option<&ConversationEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a ConversationLog {
    type Item = &'a ConversationEntry;
    type IntoIter = std::slice::Iter<'a, ConversationEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_append_order_is_display_order() {
        let mut log = ConversationLog::new();
        log.push_user("first");
        log.push_assistant(vec![FormattedSegment::plain("second")]);
        log.push_user("third");

        let texts: Vec<&str> = log.iter().map(|e| e.text()).collect();
        assert_eq!(texts, vec!["first", "second", "third"]);
        assert_eq!(log.entries()[1].author(), Author::Assistant);
    }

    #[test]
    fn test_ids_are_unique() {
        let mut log = ConversationLog::new();
        for _ in 0..50 {
            log.push_user("hi");
        }
        let ids: HashSet<&str> = log.iter().map(|e| e.id()).collect();
        assert_eq!(ids.len(), 50);
    }

    #[test]
    fn test_assistant_text_joins_segments() {
        let mut log = ConversationLog::new();
        let entry = log.push_assistant(vec![
            FormattedSegment::plain("Total: "),
            FormattedSegment::emphasized("500.000 VND"),
        ]);
        assert_eq!(entry.text(), "Total: 500.000 VND");
        assert_eq!(entry.segments().len(), 2);
    }
}
