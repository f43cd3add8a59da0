use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use super::render::{Rendered, render_event};
use crate::event::{InteractionEnvelope, InteractionKind, UserProfile};

/// Default number of entries kept on screen.
pub const DEFAULT_LOG_CAPACITY: usize = 8;

/// Monotonic entry identifier, assigned by the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LogEntryId(pub u64);

/// A rendered interaction as shown in the overlay. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: LogEntryId,
    pub text: String,
    pub icon: String,
    pub kind: InteractionKind,
    pub user: Option<UserProfile>,
    /// Anonymous viewer.
    pub guest: bool,
}

/// Everything about an entry except its id.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryDraft {
    pub text: String,
    pub icon: String,
    pub kind: InteractionKind,
    pub user: Option<UserProfile>,
    pub guest: bool,
}

impl EntryDraft {
    /// Builds a draft from an interaction envelope.
    ///
    /// Returns `None` when the interaction kind is not rendered.
    pub fn from_envelope(envelope: InteractionEnvelope) -> Option<Self> {
        let Rendered { text, icon } =
            render_event(&envelope.live_interaction, envelope.user_profile.as_ref())?;
        Some(Self {
            text,
            icon: icon.to_string(),
            kind: envelope.live_interaction.kind,
            guest: envelope.live_interaction.is_guest(),
            user: envelope.user_profile,
        })
    }
}

/// Fixed-capacity, insertion-ordered interaction log.
///
/// Appending at capacity evicts exactly the oldest entry. Ids come from a
/// counter that survives [`InteractionLog::reset`], so they never repeat
/// within one process.
#[derive(Debug, Clone)]
pub struct InteractionLog {
    entries: VecDeque<LogEntry>,
    capacity: usize,
    next_id: u64,
}

impl Default for InteractionLog {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_CAPACITY)
    }
}

impl InteractionLog {
    /// Creates a log holding at most `capacity` entries (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            next_id: 1,
        }
    }

    /// Appends an entry, evicting the oldest one if the log is full.
    pub fn append(&mut self, draft: EntryDraft) -> LogEntryId {
        let id = LogEntryId(self.next_id);
        self.next_id += 1;

        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(LogEntry {
            id,
            text: draft.text,
            icon: draft.icon,
            kind: draft.kind,
            user: draft.user,
            guest: draft.guest,
        });
        id
    }

    /// Renders and appends an interaction. Unrendered kinds leave the log untouched.
    pub fn record(&mut self, envelope: InteractionEnvelope) -> Option<LogEntryId> {
        EntryDraft::from_envelope(envelope).map(|draft| self.append(draft))
    }

    /// Drops all entries. Ids keep increasing afterwards.
    pub fn reset(&mut self) {
        self.entries.clear();
    }

    /// Owned copy of the entries, oldest first.
    pub fn snapshot(&self) -> Vec<LogEntry> {
        self.entries.iter().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::InteractionEvent;

    fn draft(text: &str) -> EntryDraft {
        EntryDraft {
            text: text.to_string(),
            icon: "👋".to_string(),
            kind: InteractionKind::Enter,
            user: None,
            guest: false,
        }
    }

    #[test]
    fn evicts_oldest_at_capacity() {
        let mut log = InteractionLog::new(3);
        for text in ["a", "b", "c", "d"] {
            log.append(draft(text));
        }
        let texts: Vec<_> = log.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, vec!["b", "c", "d"]);
        assert_eq!(log.len(), 3);
    }

    #[test]
    fn ids_are_strictly_increasing_across_reset() {
        let mut log = InteractionLog::new(2);
        let first = log.append(draft("a"));
        let second = log.append(draft("b"));
        log.reset();
        assert!(log.is_empty());
        let third = log.append(draft("c"));
        assert!(first < second && second < third);
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let mut log = InteractionLog::new(0);
        log.append(draft("a"));
        log.append(draft("b"));
        assert_eq!(log.capacity(), 1);
        assert_eq!(log.snapshot()[0].text, "b");
    }

    #[test]
    fn record_copies_profile_into_entry() {
        let mut profile = UserProfile::default();
        profile.basic.member_level = Some("VIP".to_string());
        let envelope = InteractionEnvelope {
            live_interaction: InteractionEvent {
                user_id: "u1234567890".to_string(),
                kind: InteractionKind::Share,
                comment: None,
                timestamp: None,
                stay_duration: None,
            },
            user_profile: Some(profile.clone()),
        };
        let mut log = InteractionLog::default();
        log.record(envelope).unwrap();

        let entry = &log.snapshot()[0];
        assert_eq!(entry.text, "u1234567(VIP) shared");
        assert_eq!(entry.kind, InteractionKind::Share);
        assert_eq!(entry.user.as_ref(), Some(&profile));
        assert!(!entry.guest);
    }

    #[test]
    fn guest_viewers_are_flagged() {
        let envelope: InteractionEnvelope = serde_json::from_str(
            r#"{"live_interaction": {"user_id": "游客_12345678", "interaction": "like"}}"#,
        )
        .unwrap();
        assert!(envelope.live_interaction.is_guest());

        let mut log = InteractionLog::default();
        log.record(envelope).unwrap();

        let entry = &log.snapshot()[0];
        assert!(entry.guest);
        assert_eq!(entry.text, "游客_12345 liked");
    }

    #[test]
    fn unknown_kind_is_not_recorded() {
        let envelope: InteractionEnvelope = serde_json::from_str(
            r#"{"live_interaction": {"user_id": "u1", "interaction": "gift"}}"#,
        )
        .unwrap();
        let mut log = InteractionLog::default();
        assert!(log.record(envelope).is_none());
        assert!(log.is_empty());
    }
}
