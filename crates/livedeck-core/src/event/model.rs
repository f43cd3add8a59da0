use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::serde_helpers::{
    lenient_f64, null_as_default, scalar_as_string, scalar_as_string_or_empty, string_set,
};
use crate::stats::StatsSnapshot;

/// One frame as delivered by the push-stream transport.
///
/// `event` is the optional type label; `data` is the undecoded payload text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawEvent {
    pub event: Option<String>,
    pub data: String,
}

impl RawEvent {
    /// Creates an unlabeled event.
    pub fn message(data: impl Into<String>) -> Self {
        Self {
            event: None,
            data: data.into(),
        }
    }

    /// Creates a labeled event.
    pub fn labeled(event: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            event: Some(event.into()),
            data: data.into(),
        }
    }
}

/// Event type labels the transport may attach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventLabel {
    Stats,
    ScriptRecommendation,
    CommentReply,
    QuestionResponse,
}

impl EventLabel {
    /// Parses a transport label. Returns `None` for labels this core does not know.
    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "stats" => Some(Self::Stats),
            "script_recommendation" => Some(Self::ScriptRecommendation),
            "comment_reply" => Some(Self::CommentReply),
            "question_response" => Some(Self::QuestionResponse),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stats => "stats",
            Self::ScriptRecommendation => "script_recommendation",
            Self::CommentReply => "comment_reply",
            Self::QuestionResponse => "question_response",
        }
    }
}

/// Viewer interaction kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionKind {
    Enter,
    Exit,
    Comment,
    Like,
    Share,
    /// Any kind this build does not render.
    #[serde(other)]
    Unknown,
}

impl InteractionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Enter => "enter",
            Self::Exit => "exit",
            Self::Comment => "comment",
            Self::Like => "like",
            Self::Share => "share",
            Self::Unknown => "unknown",
        }
    }
}

/// The `live_interaction` part of an interaction envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionEvent {
    #[serde(deserialize_with = "scalar_as_string_or_empty")]
    pub user_id: String,
    #[serde(rename = "interaction", alias = "kind")]
    pub kind: InteractionKind,
    #[serde(default, deserialize_with = "scalar_as_string")]
    pub comment: Option<String>,
    #[serde(default, deserialize_with = "scalar_as_string")]
    pub timestamp: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub stay_duration: Option<f64>,
}

/// Prefix the producer uses for anonymous viewers.
pub const GUEST_PREFIX: &str = "游客_";

impl InteractionEvent {
    pub fn is_guest(&self) -> bool {
        self.user_id.starts_with(GUEST_PREFIX)
    }
}

/// Profile snapshot attached to an interaction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default, deserialize_with = "null_as_default")]
    pub basic: BasicProfile,
    #[serde(default, deserialize_with = "null_as_default")]
    pub behavior: BehaviorProfile,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BasicProfile {
    #[serde(default, deserialize_with = "scalar_as_string")]
    pub member_level: Option<String>,
    #[serde(default, deserialize_with = "scalar_as_string")]
    pub gender: Option<String>,
    /// Registration channel, reported by the producer as the traffic source.
    #[serde(default, deserialize_with = "scalar_as_string")]
    pub registration: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BehaviorProfile {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub avg_spending: Option<f64>,
    #[serde(default, deserialize_with = "string_set")]
    pub preferred_categories: BTreeSet<String>,
}

/// Unlabeled interaction payload: `{live_interaction, user_profile}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionEnvelope {
    pub live_interaction: InteractionEvent,
    #[serde(default)]
    pub user_profile: Option<UserProfile>,
}

/// Which logical answer stream a fragment belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FragmentChannel {
    Recommendation,
    CommentReply,
    QuestionResponse,
}

impl FragmentChannel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Recommendation => "recommendation",
            Self::CommentReply => "comment_reply",
            Self::QuestionResponse => "question_response",
        }
    }
}

/// Wire shape shared by all fragment events.
///
/// The correlation key travels under a channel-specific field name.
#[derive(Debug, Clone, Deserialize)]
pub struct FragmentEnvelope {
    #[serde(deserialize_with = "scalar_as_string_or_empty")]
    pub stream_id: String,
    #[serde(default, deserialize_with = "scalar_as_string")]
    pub original_recommendation: Option<String>,
    #[serde(default, deserialize_with = "scalar_as_string")]
    pub comment: Option<String>,
    #[serde(default, deserialize_with = "scalar_as_string")]
    pub question: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_end: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub error: bool,
    #[serde(default, deserialize_with = "scalar_as_string")]
    pub message: Option<String>,
}

const GENERATION_FAILED: &str = "generation failed";

impl FragmentEnvelope {
    /// Normalizes the envelope into a fragment for the given channel.
    pub fn into_fragment(self, channel: FragmentChannel) -> StreamFragment {
        let correlation_key = match channel {
            FragmentChannel::Recommendation => self.original_recommendation,
            FragmentChannel::CommentReply => self.comment,
            FragmentChannel::QuestionResponse => self.question,
        }
        .unwrap_or_default();

        let error = self
            .error
            .then(|| self.message.unwrap_or_else(|| GENERATION_FAILED.to_string()));

        StreamFragment {
            stream_id: self.stream_id,
            correlation_key,
            chunk: self.data,
            is_end: self.is_end,
            error,
        }
    }
}

/// One chunk of an incrementally generated answer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StreamFragment {
    pub stream_id: String,
    pub correlation_key: String,
    pub chunk: String,
    pub is_end: bool,
    /// Set when the producer reported a generation failure for this stream.
    pub error: Option<String>,
}

impl StreamFragment {
    pub fn new(
        stream_id: impl Into<String>,
        correlation_key: impl Into<String>,
        chunk: impl Into<String>,
        is_end: bool,
    ) -> Self {
        Self {
            stream_id: stream_id.into(),
            correlation_key: correlation_key.into(),
            chunk: chunk.into(),
            is_end,
            error: None,
        }
    }
}

/// The fixed set of events the dashboard understands.
#[derive(Debug, Clone, PartialEq)]
pub enum DomainEvent {
    Interaction(InteractionEnvelope),
    Stats(StatsSnapshot),
    RecommendationFragment(StreamFragment),
    CommentReplyFragment(StreamFragment),
    QuestionResponseFragment(StreamFragment),
    /// Forward-compatible catch-all; carries the label if there was one.
    Unknown { label: Option<String> },
}

impl DomainEvent {
    /// Short name used in logs and ingest counters.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Interaction(_) => "interaction",
            Self::Stats(_) => "stats",
            Self::RecommendationFragment(_) => "script_recommendation",
            Self::CommentReplyFragment(_) => "comment_reply",
            Self::QuestionResponseFragment(_) => "question_response",
            Self::Unknown { .. } => "unknown",
        }
    }
}
