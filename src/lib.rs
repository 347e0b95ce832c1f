//! Stateless simulation engine for Petri nets with regular, inhibitor and
//! bidirectional arcs.
//!
//! Each call to [`process_step`] or [`resolve_conflict`] takes a wire
//! description of the net, computes one simulation step, and returns the
//! next state. All session state lives in the document the caller carries;
//! concurrent calls share nothing.

mod engine;
mod error;
mod mapper;
mod model;
mod net;

pub use engine::{
    process_step, process_step_with, resolve_conflict, resolve_conflict_with, CapacityPolicy,
};
pub use error::{EngineError, StructuralError};
pub use model::{ArcDTO, PetriNetDTO, PlaceDTO, Position, Size, TransitionDTO};

// Conditionally include the wasm module only when targeting wasm32
cfg_if::cfg_if! {
    if #[cfg(target_arch = "wasm32")] {
        pub mod wasm;
    }
}

/// Runs one simulation step on a `.pats` JSON document and returns the
/// resulting document. Parse and engine errors are stringified, which keeps
/// this entry point free of crate types for embedders.
pub fn process_step_json(document: &str) -> std::result::Result<String, String> {
    let dto: PetriNetDTO = serde_json::from_str(document)
        .map_err(|e| format!("Failed to parse Petri net JSON: {}", e))?;
    let result = process_step(dto).map_err(|e| e.to_string())?;
    serde_json::to_string(&result).map_err(|e| format!("Failed to serialize result: {}", e))
}

/// Fires the user-chosen transition in a paused `.pats` document and returns
/// the re-evaluated state.
pub fn resolve_conflict_json(
    document: &str,
    selected_transition_id: &str,
) -> std::result::Result<String, String> {
    let dto: PetriNetDTO = serde_json::from_str(document)
        .map_err(|e| format!("Failed to parse Petri net JSON: {}", e))?;
    let result = resolve_conflict(dto, selected_transition_id).map_err(|e| e.to_string())?;
    serde_json::to_string(&result).map_err(|e| format!("Failed to serialize result: {}", e))
}
