//! Event classification.
//!
//! Labeled events route by label. Unlabeled events (the transport's default
//! `message` type) are told apart by payload shape: an interaction envelope
//! carries `live_interaction`, a statistics record carries its counters.

use serde_json::{Map, Value};

use super::model::{
    DomainEvent, EventLabel, FragmentChannel, FragmentEnvelope, InteractionEnvelope, RawEvent,
};
use crate::error::{LivedeckError, Result};
use crate::sanitizer;
use crate::stats::StatsSnapshot;

/// The label SSE assigns when a frame carries no `event:` field.
const DEFAULT_LABEL: &str = "message";

/// Fields whose presence marks an unlabeled payload as a statistics record.
const STATS_MARKERS: [&str; 3] = ["current_users", "total_users_ever", "traffic_history"];

/// Decodes and classifies one raw event.
///
/// Returns `DomainEvent::Unknown` for labels or shapes this build does not
/// recognize. Returns an error only when the payload itself is undecodable.
pub fn classify(raw: &RawEvent) -> Result<DomainEvent> {
    let label = raw
        .event
        .as_deref()
        .map(str::trim)
        .filter(|label| !label.is_empty() && *label != DEFAULT_LABEL);

    match label {
        None => classify_unlabeled(&raw.data),
        Some(label) => match EventLabel::parse(label) {
            Some(known) => classify_labeled(known, &raw.data),
            None => Ok(DomainEvent::Unknown {
                label: Some(label.to_string()),
            }),
        },
    }
}

fn classify_labeled(label: EventLabel, data: &str) -> Result<DomainEvent> {
    Ok(match label {
        EventLabel::Stats => DomainEvent::Stats(sanitizer::decode::<StatsSnapshot>(data)?),
        EventLabel::ScriptRecommendation => DomainEvent::RecommendationFragment(
            decode_fragment(data)?.into_fragment(FragmentChannel::Recommendation),
        ),
        EventLabel::CommentReply => DomainEvent::CommentReplyFragment(
            decode_fragment(data)?.into_fragment(FragmentChannel::CommentReply),
        ),
        EventLabel::QuestionResponse => DomainEvent::QuestionResponseFragment(
            decode_fragment(data)?.into_fragment(FragmentChannel::QuestionResponse),
        ),
    })
}

fn decode_fragment(data: &str) -> Result<FragmentEnvelope> {
    sanitizer::decode::<FragmentEnvelope>(data)
}

fn classify_unlabeled(data: &str) -> Result<DomainEvent> {
    let value: Value = sanitizer::decode(data)?;
    let Value::Object(fields) = value else {
        return Ok(DomainEvent::Unknown { label: None });
    };

    match Shape::of(&fields) {
        Shape::Interaction => {
            let envelope: InteractionEnvelope = serde_json::from_value(Value::Object(fields))
                .map_err(|err| LivedeckError::payload(format!("bad interaction envelope: {err}")))?;
            Ok(DomainEvent::Interaction(envelope))
        }
        Shape::Stats => {
            let snapshot: StatsSnapshot = serde_json::from_value(Value::Object(fields))
                .map_err(|err| LivedeckError::payload(format!("bad stats record: {err}")))?;
            Ok(DomainEvent::Stats(snapshot))
        }
        Shape::Other => Ok(DomainEvent::Unknown { label: None }),
    }
}

enum Shape {
    Interaction,
    Stats,
    Other,
}

impl Shape {
    fn of(fields: &Map<String, Value>) -> Self {
        if fields.contains_key("live_interaction") {
            Self::Interaction
        } else if STATS_MARKERS.iter().any(|key| fields.contains_key(*key)) {
            Self::Stats
        } else {
            Self::Other
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::model::InteractionKind;

    #[test]
    fn unlabeled_interaction_is_classified_by_shape() {
        let raw = RawEvent::message(
            r#"{"live_interaction": {"user_id": "u1234567890", "interaction": "comment", "comment": "hi"}, "user_profile": null}"#,
        );
        let DomainEvent::Interaction(envelope) = classify(&raw).unwrap() else {
            panic!("expected interaction");
        };
        assert_eq!(envelope.live_interaction.kind, InteractionKind::Comment);
        assert_eq!(envelope.live_interaction.comment.as_deref(), Some("hi"));
        assert!(envelope.user_profile.is_none());
    }

    #[test]
    fn explicit_message_label_is_treated_as_unlabeled() {
        let raw = RawEvent::labeled("message", r#"{"current_users": 7}"#);
        let DomainEvent::Stats(snapshot) = classify(&raw).unwrap() else {
            panic!("expected stats");
        };
        assert_eq!(snapshot.current_users, 7);
    }

    #[test]
    fn labeled_stats_with_nan_decodes() {
        let raw = RawEvent::labeled("stats", r#"{"current_users": 2, "traffic_rate": NaN}"#);
        let DomainEvent::Stats(snapshot) = classify(&raw).unwrap() else {
            panic!("expected stats");
        };
        assert_eq!(snapshot.current_users, 2);
        assert_eq!(snapshot.traffic_rate, 0.0);
    }

    #[test]
    fn fragment_labels_pick_their_correlation_field() {
        let raw = RawEvent::labeled(
            "question_response",
            r#"{"stream_id": "s9", "question": "size?", "data": "M fits", "is_end": false}"#,
        );
        let DomainEvent::QuestionResponseFragment(fragment) = classify(&raw).unwrap() else {
            panic!("expected question response");
        };
        assert_eq!(fragment.stream_id, "s9");
        assert_eq!(fragment.correlation_key, "size?");
        assert_eq!(fragment.chunk, "M fits");
        assert!(!fragment.is_end);

        let raw = RawEvent::labeled(
            "script_recommendation",
            r#"{"stream_id": 17, "original_recommendation": "push coupons", "data": "x", "is_end": false}"#,
        );
        let DomainEvent::RecommendationFragment(fragment) = classify(&raw).unwrap() else {
            panic!("expected recommendation");
        };
        assert_eq!(fragment.stream_id, "17");
        assert_eq!(fragment.correlation_key, "push coupons");
    }

    #[test]
    fn error_fragment_carries_message() {
        let raw = RawEvent::labeled(
            "comment_reply",
            r#"{"stream_id": "c1", "comment": "too pricey", "data": "", "is_end": true, "error": true, "message": "upstream timeout"}"#,
        );
        let DomainEvent::CommentReplyFragment(fragment) = classify(&raw).unwrap() else {
            panic!("expected comment reply");
        };
        assert_eq!(fragment.error.as_deref(), Some("upstream timeout"));
    }

    #[test]
    fn unknown_label_is_not_an_error() {
        let raw = RawEvent::labeled("flash_sale", "not even json");
        assert_eq!(
            classify(&raw).unwrap(),
            DomainEvent::Unknown {
                label: Some("flash_sale".to_string())
            }
        );
    }

    #[test]
    fn unrecognized_shape_is_unknown() {
        let raw = RawEvent::message(r#"{"heartbeat": 1}"#);
        assert_eq!(classify(&raw).unwrap(), DomainEvent::Unknown { label: None });
        let raw = RawEvent::message("[1, 2]");
        assert_eq!(classify(&raw).unwrap(), DomainEvent::Unknown { label: None });
    }

    #[test]
    fn garbage_is_a_payload_error() {
        let raw = RawEvent::message("{live_interaction");
        assert!(classify(&raw).unwrap_err().is_payload());
    }
}
