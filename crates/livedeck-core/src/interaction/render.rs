//! Human-readable rendering of viewer interactions.

use crate::event::{InteractionEvent, InteractionKind, UserProfile};

/// Number of leading characters of a user id shown on screen.
pub const MASK_CHARS: usize = 8;

/// Text and icon for one interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub text: String,
    pub icon: &'static str,
}

/// First [`MASK_CHARS`] characters of the id. Counts characters, not bytes.
pub fn mask_user_id(user_id: &str) -> String {
    user_id.chars().take(MASK_CHARS).collect()
}

/// Masked id, suffixed with `(level)` when the viewer has a member level.
pub fn display_name(user_id: &str, member_level: Option<&str>) -> String {
    let masked = mask_user_id(user_id);
    match member_level.map(str::trim).filter(|level| !level.is_empty()) {
        Some(level) => format!("{masked}({level})"),
        None => masked,
    }
}

/// Fixed rendering table. Returns `None` for kinds that are not displayed.
pub fn render(kind: InteractionKind, name: &str, comment: Option<&str>) -> Option<Rendered> {
    let (text, icon) = match kind {
        InteractionKind::Enter => (format!("{name} entered"), "👋"),
        InteractionKind::Exit => (format!("{name} left"), "👋"),
        InteractionKind::Comment => (format!("{name}: {}", comment.unwrap_or_default()), "💭"),
        InteractionKind::Like => (format!("{name} liked"), "❤️"),
        InteractionKind::Share => (format!("{name} shared"), "🔄"),
        InteractionKind::Unknown => return None,
    };
    Some(Rendered { text, icon })
}

/// Renders an interaction with its optional profile.
pub fn render_event(event: &InteractionEvent, profile: Option<&UserProfile>) -> Option<Rendered> {
    let level = profile.and_then(|p| p.basic.member_level.as_deref());
    let name = display_name(&event.user_id, level);
    render(event.kind, &name, event.comment.as_deref())
}
