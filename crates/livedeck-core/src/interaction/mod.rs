//! Viewer interactions: rendering rules and the bounded on-screen log.

pub mod log;
pub mod render;

pub use log::{DEFAULT_LOG_CAPACITY, EntryDraft, InteractionLog, LogEntry, LogEntryId};
pub use render::{Rendered, display_name, mask_user_id, render, render_event};
