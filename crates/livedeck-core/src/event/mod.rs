//! Raw transport frames, the domain event sum type, and the classifier
//! that maps one onto the other.

pub mod classifier;
pub mod model;

pub use classifier::classify;
pub use model::{
    BasicProfile, BehaviorProfile, DomainEvent, EventLabel, FragmentChannel, FragmentEnvelope,
    GUEST_PREFIX, InteractionEnvelope, InteractionEvent, InteractionKind, RawEvent,
    StreamFragment, UserProfile,
};
