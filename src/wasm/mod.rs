use wasm_bindgen::prelude::*;
use wasm_bindgen::JsValue;

use serde_wasm_bindgen::{from_value, to_value};

use crate::model::PetriNetDTO;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = console)]
    fn log(s: &str);
}

macro_rules! console_log {
    ($($t:tt)*) => (log(&format_args!($($t)*).to_string()))
}

/// Run one simulation step on a Petri net object.
/// Returns the next state, or throws on a malformed or inconsistent net.
#[wasm_bindgen(js_name = processStep)]
pub fn process_step(net: JsValue) -> Result<JsValue, JsValue> {
    let dto: PetriNetDTO = from_value(net)
        .map_err(|e| JsValue::from_str(&format!("Malformed Petri net: {}", e)))?;
    console_log!(
        "[WASM] processStep: {} places, {} transitions, {} arcs",
        dto.places.len(),
        dto.transitions.len(),
        dto.arcs.len()
    );

    let result = crate::process_step(dto).map_err(|e| JsValue::from_str(&e.to_string()))?;
    to_value(&result).map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

/// Fire the user-selected transition in a paused deterministic step and
/// re-evaluate. Throws when the selected ID does not name a transition.
#[wasm_bindgen(js_name = resolveConflict)]
pub fn resolve_conflict(net: JsValue, selected_transition_id: String) -> Result<JsValue, JsValue> {
    let dto: PetriNetDTO = from_value(net)
        .map_err(|e| JsValue::from_str(&format!("Malformed Petri net: {}", e)))?;
    console_log!("[WASM] resolveConflict: firing {}", selected_transition_id);

    let result = crate::resolve_conflict(dto, &selected_transition_id)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    to_value(&result).map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}
