//! Fragment accumulator.
//!
//! Reassembles incrementally generated answers. Accumulations are keyed by
//! `stream_id`; each regeneration of the same question gets its own stream
//! and its own accumulation, and [`FragmentAccumulator::current_for`] resolves
//! a correlation key to the most recently started stream for it.
//!
//! Fragments of one stream must arrive in send order. Nothing is reordered
//! here; an out-of-order transport corrupts the text.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};

use crate::event::StreamFragment;

/// Default number of accumulations retained per channel.
pub const DEFAULT_ACCUMULATOR_CAPACITY: usize = 32;

/// The reassembled text of one stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Accumulation {
    pub stream_id: String,
    pub correlation_key: String,
    pub text: String,
    pub complete: bool,
    /// Generation failure reported by the producer.
    pub error: Option<String>,
}

impl Accumulation {
    fn started(stream_id: String, correlation_key: String) -> Self {
        Self {
            stream_id,
            correlation_key,
            text: String::new(),
            complete: false,
            error: None,
        }
    }

    /// Text to show: the error message if generation failed, otherwise the text so far.
    pub fn display_text(&self) -> &str {
        self.error.as_deref().unwrap_or(&self.text)
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// What `ingest` did with a fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentOutcome {
    /// First fragment of a stream.
    Created,
    /// Chunk appended to an open stream.
    Appended,
    /// Terminal (or error) fragment closed an open stream.
    Completed,
    /// Fragment for an already-complete stream; text left as is.
    Ignored,
}

/// Reassembles fragments into per-stream accumulations, bounded in count.
///
/// When a new stream would exceed the capacity, the oldest completed
/// accumulation is evicted; if every retained stream is still open, the
/// oldest open one goes instead.
#[derive(Debug, Clone)]
pub struct FragmentAccumulator {
    streams: HashMap<String, Accumulation>,
    /// Stream ids, oldest first.
    order: VecDeque<String>,
    /// correlation key -> most recently started stream id
    latest: HashMap<String, String>,
    capacity: usize,
}

impl Default for FragmentAccumulator {
    fn default() -> Self {
        Self::new(DEFAULT_ACCUMULATOR_CAPACITY)
    }
}

impl FragmentAccumulator {
    pub fn new(capacity: usize) -> Self {
        Self {
            streams: HashMap::new(),
            order: VecDeque::new(),
            latest: HashMap::new(),
            capacity: capacity.max(1),
        }
    }

    /// Applies one fragment.
    ///
    /// A terminal fragment freezes the text without appending its own chunk.
    /// A terminal fragment for an unseen stream starts a complete, empty accumulation.
    pub fn ingest(&mut self, fragment: StreamFragment) -> FragmentOutcome {
        let StreamFragment {
            stream_id,
            correlation_key,
            chunk,
            is_end,
            error,
        } = fragment;

        if let Some(existing) = self.streams.get_mut(&stream_id) {
            if existing.complete {
                return FragmentOutcome::Ignored;
            }
            if error.is_some() {
                existing.error = error;
                existing.complete = true;
                return FragmentOutcome::Completed;
            }
            if is_end {
                existing.complete = true;
                return FragmentOutcome::Completed;
            }
            existing.text.push_str(&chunk);
            return FragmentOutcome::Appended;
        }

        let mut accumulation = Accumulation::started(stream_id, correlation_key);
        if error.is_some() {
            accumulation.error = error;
            accumulation.complete = true;
        } else if is_end {
            accumulation.complete = true;
        } else {
            accumulation.text = chunk;
        }
        self.insert(accumulation);
        FragmentOutcome::Created
    }

    /// Records a stream announced by a submit call before its first fragment.
    ///
    /// Does nothing if the stream already exists; returns whether it was added.
    pub fn register(
        &mut self,
        stream_id: impl Into<String>,
        correlation_key: impl Into<String>,
    ) -> bool {
        let stream_id = stream_id.into();
        if self.streams.contains_key(&stream_id) {
            return false;
        }
        self.insert(Accumulation::started(stream_id, correlation_key.into()));
        true
    }

    fn insert(&mut self, accumulation: Accumulation) {
        while self.streams.len() >= self.capacity {
            if !self.evict_one() {
                break;
            }
        }
        let stream_id = accumulation.stream_id.clone();
        if !accumulation.correlation_key.is_empty() {
            self.latest
                .insert(accumulation.correlation_key.clone(), stream_id.clone());
        }
        self.order.push_back(stream_id.clone());
        self.streams.insert(stream_id, accumulation);
    }

    fn evict_one(&mut self) -> bool {
        let position = self
            .order
            .iter()
            .position(|id| self.streams.get(id).is_some_and(|acc| acc.complete))
            .or(if self.order.is_empty() { None } else { Some(0) });

        let Some(position) = position else {
            return false;
        };
        let Some(stream_id) = self.order.remove(position) else {
            return false;
        };
        if let Some(evicted) = self.streams.remove(&stream_id)
            && self.latest.get(&evicted.correlation_key) == Some(&stream_id)
        {
            self.latest.remove(&evicted.correlation_key);
        }
        true
    }

    pub fn get(&self, stream_id: &str) -> Option<&Accumulation> {
        self.streams.get(stream_id)
    }

    /// The accumulation of the most recently started stream for `correlation_key`.
    pub fn current_for(&self, correlation_key: &str) -> Option<&Accumulation> {
        self.latest
            .get(correlation_key)
            .and_then(|stream_id| self.streams.get(stream_id))
    }

    /// Current answer per correlation key, most recently started first.
    pub fn current_answers(&self) -> Vec<Accumulation> {
        self.order
            .iter()
            .rev()
            .filter_map(|id| self.streams.get(id))
            .filter(|acc| {
                acc.correlation_key.is_empty()
                    || self.latest.get(&acc.correlation_key) == Some(&acc.stream_id)
            })
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.streams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }

    /// Number of streams still receiving fragments.
    pub fn in_progress(&self) -> usize {
        self.streams.values().filter(|acc| !acc.complete).count()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
