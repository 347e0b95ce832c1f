use thiserror::Error;

/// Client-facing validation failures, detected at the wire boundary before
/// any marking is touched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StructuralError {
    #[error("arc {arc_id} has unrecognized type {tag:?}")]
    UnknownArcType { arc_id: String, tag: String },

    #[error("arc {arc_id} references unknown node {node_id}")]
    UnknownEndpoint { arc_id: String, node_id: String },

    #[error("arc {arc_id} must connect a place with a transition")]
    NotBipartite { arc_id: String },

    #[error("inhibitor arc {arc_id} must run from a place to a transition")]
    InhibitorOrientation { arc_id: String },

    #[error("transition {transition_id} references unknown arc {arc_id}")]
    UnknownArc {
        transition_id: String,
        arc_id: String,
    },

    #[error("arc {arc_id} is not incident to transition {transition_id}")]
    ArcNotIncident {
        transition_id: String,
        arc_id: String,
    },

    #[error("duplicate {namespace} id {id}")]
    DuplicateId { namespace: &'static str, id: String },

    #[error("selected transition not found: {0}")]
    SelectedTransitionNotFound(String),
}

/// Engine failure modes. Structural errors are the caller's fault; an
/// invariant violation means the enablement contract was broken and the
/// whole step is discarded.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error(transparent)]
    Structural(#[from] StructuralError),

    #[error("firing {transition_id} would drive place {place_id} below zero tokens")]
    Invariant {
        transition_id: String,
        place_id: String,
    },
}
