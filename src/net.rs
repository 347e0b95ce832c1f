use std::collections::HashMap;

use tracing::warn;

/// A place holding a non-negative token count, optionally bounded by a
/// finite capacity.
///
/// The token field is private: all mutation goes through
/// [`increment_tokens`](Place::increment_tokens) and
/// [`decrement_tokens`](Place::decrement_tokens), so `tokens <= capacity`
/// holds for bounded places after every operation.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Place {
    tokens: u32,
    bounded: bool,
    capacity: Option<u32>,
}

impl Place {
    /// Builds a place from raw wire values, normalizing them the way the
    /// editor expects: negative token counts clamp to 0, a bounded place
    /// without a usable capacity gets capacity 0, and an over-capacity
    /// marking clamps down to the capacity. Unbounded places drop the
    /// capacity entirely.
    pub fn new(id: &str, tokens: i64, bounded: bool, capacity: Option<i64>) -> Self {
        let mut tokens = clamp_count(tokens);
        let capacity = if bounded {
            let cap = capacity.map(clamp_count).unwrap_or(0);
            if tokens > cap {
                warn!("place {id}: marking {tokens} exceeds capacity {cap}, clamping");
                tokens = cap;
            }
            Some(cap)
        } else {
            None
        };
        Place {
            tokens,
            bounded,
            capacity,
        }
    }

    pub fn tokens(&self) -> u32 {
        self.tokens
    }

    pub fn bounded(&self) -> bool {
        self.bounded
    }

    pub fn capacity(&self) -> Option<u32> {
        self.capacity
    }

    /// Adds one token. No-op when a bounded place is already at capacity.
    pub fn increment_tokens(&mut self) {
        match self.capacity {
            Some(cap) if self.tokens >= cap => {}
            _ => self.tokens = self.tokens.saturating_add(1),
        }
    }

    /// Removes one token. No-op when the place is empty.
    pub fn decrement_tokens(&mut self) {
        if self.tokens > 0 {
            self.tokens -= 1;
        }
    }
}

fn clamp_count(value: i64) -> u32 {
    value.clamp(0, u32::MAX as i64) as u32
}

/// An atomic event node. `enabled` is transient: the evaluator and the step
/// orchestrator own it within a single call, and it is never read on input.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Transition {
    pub id: String,
    pub arc_ids: Vec<String>,
    pub enabled: bool,
}

impl Transition {
    pub fn new(id: String, arc_ids: Vec<String>) -> Self {
        Transition {
            id,
            arc_ids,
            enabled: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ArcKind {
    /// Consumes one token when oriented place->transition, produces one when
    /// oriented transition->place.
    Regular,
    /// Place->transition only; enabling requires the source place to be empty.
    Inhibitor,
    /// Connects a place and a transition in either orientation; firing
    /// consumes and produces one token at the place.
    Bidirectional,
}

/// A directed edge between a place and a transition, stored under its ID in
/// the net's arc map. `incoming_id` is the source endpoint, `outgoing_id`
/// the target.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Arc {
    pub kind: ArcKind,
    pub incoming_id: String,
    pub outgoing_id: String,
}

impl Arc {
    /// True when this arc feeds the given transition (place->transition).
    pub fn is_incoming_to(&self, transition_id: &str) -> bool {
        self.outgoing_id == transition_id
    }

    /// True when this arc leaves the given transition (transition->place).
    pub fn is_outgoing_from(&self, transition_id: &str) -> bool {
        self.incoming_id == transition_id
    }

    /// The place endpoint, viewed from the given transition. For
    /// bidirectional arcs the stored orientation carries no semantic weight,
    /// so both directions resolve to the same place.
    pub fn place_end(&self, transition_id: &str) -> &str {
        if self.incoming_id == transition_id {
            &self.outgoing_id
        } else {
            &self.incoming_id
        }
    }
}

/// The net aggregate for one simulation call: ID-keyed places and arcs plus
/// the transitions in wire order. Built fresh by the mapper, mutated only by
/// the firing executor, discarded after write-back.
#[derive(Debug, PartialEq)]
pub(crate) struct PetriNet {
    pub places: HashMap<String, Place>,
    pub arcs: HashMap<String, Arc>,
    pub transitions: Vec<Transition>,
}

impl PetriNet {
    pub fn tokens_at(&self, place_id: &str) -> u32 {
        self.places.get(place_id).map(Place::tokens).unwrap_or(0)
    }
}
