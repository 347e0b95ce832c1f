use std::collections::HashMap;

use rand::prelude::*;
use tracing::debug;

use crate::error::{EngineError, StructuralError};
use crate::mapper;
use crate::model::PetriNetDTO;
use crate::net::{ArcKind, PetriNet, Transition};

/// How production into a bounded place that sits at capacity is treated.
///
/// The editor's historical behavior is [`SoftCap`](CapacityPolicy::SoftCap);
/// switching the engine to strict Petri net semantics is a one-line change
/// of the `Default` variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CapacityPolicy {
    /// Capacity never blocks enablement; over-capacity production is
    /// silently dropped at firing time.
    #[default]
    SoftCap,
    /// A transition is disabled when firing it would push a bounded place
    /// past its capacity.
    Strict,
}

/// Runs one simulation step: evaluates enablement for every transition,
/// then either fires exactly one transition, pauses on a deterministic
/// conflict, or leaves the marking unchanged when nothing is enabled.
///
/// In the returned net, `enabled` marks the transition that fired, or each
/// of the conflicting candidates when the step paused.
pub fn process_step(dto: PetriNetDTO) -> Result<PetriNetDTO, EngineError> {
    process_step_with(dto, CapacityPolicy::default(), &mut rand::rng())
}

/// [`process_step`] with an explicit capacity policy and randomness source,
/// so callers and tests can pin both.
pub fn process_step_with<R: Rng + ?Sized>(
    mut dto: PetriNetDTO,
    policy: CapacityPolicy,
    rng: &mut R,
) -> Result<PetriNetDTO, EngineError> {
    let deterministic = dto.is_deterministic();
    let mut net = mapper::build_net(&dto)?;

    evaluate_all(&mut net, policy);
    let enabled = enabled_indices(&net);
    debug!("{} of {} transitions enabled", enabled.len(), net.transitions.len());

    if enabled.is_empty() {
        // Empty step: the original marking goes back out unchanged.
    } else if deterministic && enabled.len() > 1 {
        debug!("deterministic conflict, awaiting user selection");
    } else {
        let index = select_uniform(&enabled, rng);
        fire(&mut net, index)?;
        mark_only(&mut net, index);
    }

    mapper::write_back(&net, &mut dto);
    Ok(dto)
}

/// Completes a paused deterministic step by firing the user-chosen
/// transition, then re-evaluates and applies the mode policy to the new
/// enabled set: a fresh conflict pauses again, a single survivor fires
/// immediately, and an empty set leaves the fired selection marked.
///
/// The caller vouches that the selection was enabled in the paused state;
/// an infeasible selection is caught by the executor's validation pass and
/// reported as an invariant violation.
pub fn resolve_conflict(
    dto: PetriNetDTO,
    selected_transition_id: &str,
) -> Result<PetriNetDTO, EngineError> {
    resolve_conflict_with(
        dto,
        selected_transition_id,
        CapacityPolicy::default(),
        &mut rand::rng(),
    )
}

/// [`resolve_conflict`] with an explicit capacity policy and randomness
/// source.
pub fn resolve_conflict_with<R: Rng + ?Sized>(
    mut dto: PetriNetDTO,
    selected_transition_id: &str,
    policy: CapacityPolicy,
    rng: &mut R,
) -> Result<PetriNetDTO, EngineError> {
    let deterministic = dto.is_deterministic();
    let mut net = mapper::build_net(&dto)?;

    let selected = net
        .transitions
        .iter()
        .position(|t| t.id == selected_transition_id)
        .ok_or_else(|| {
            StructuralError::SelectedTransitionNotFound(selected_transition_id.to_string())
        })?;

    fire(&mut net, selected)?;

    evaluate_all(&mut net, policy);
    let enabled = enabled_indices(&net);

    if enabled.is_empty() {
        // Nothing left to arbitrate; the output marks what just fired.
        mark_only(&mut net, selected);
    } else if deterministic && enabled.len() > 1 {
        debug!("conflict persists after firing {selected_transition_id}, pausing again");
    } else {
        let index = select_uniform(&enabled, rng);
        fire(&mut net, index)?;
        mark_only(&mut net, index);
    }

    mapper::write_back(&net, &mut dto);
    Ok(dto)
}

/// Decides whether a transition can fire under the current marking.
///
/// Inhibitor arcs veto on a non-empty source place. Bidirectional arcs
/// require at least one token at the connected place and, when oriented
/// place->transition, add one to that place's requirement. Regular incoming
/// arcs add one to their source's requirement; outgoing arcs do not affect
/// enablement. Requirements from multiple arcs on the same place accumulate.
pub(crate) fn is_enabled(net: &PetriNet, transition: &Transition, policy: CapacityPolicy) -> bool {
    let mut required: HashMap<&str, u32> = HashMap::new();

    for arc_id in &transition.arc_ids {
        let Some(arc) = net.arcs.get(arc_id) else { continue };
        match arc.kind {
            ArcKind::Inhibitor => {
                // Mapper guarantees place -> transition orientation.
                if net.tokens_at(&arc.incoming_id) > 0 {
                    return false;
                }
            }
            ArcKind::Bidirectional => {
                let place_id = arc.place_end(&transition.id);
                if net.tokens_at(place_id) < 1 {
                    return false;
                }
                if arc.is_incoming_to(&transition.id) {
                    *required.entry(place_id).or_insert(0) += 1;
                }
            }
            ArcKind::Regular => {
                if arc.is_incoming_to(&transition.id) {
                    *required.entry(arc.incoming_id.as_str()).or_insert(0) += 1;
                }
            }
        }
    }

    for (&place_id, &needed) in &required {
        if net.tokens_at(place_id) < needed {
            return false;
        }
    }

    if policy == CapacityPolicy::Strict && !fits_capacity(net, transition, &required) {
        return false;
    }

    true
}

/// Strict-policy check: the post-firing count of every bounded place touched
/// by this transition's regular arcs must stay within its capacity.
/// Bidirectional arcs are net-zero and do not participate.
fn fits_capacity(net: &PetriNet, transition: &Transition, required: &HashMap<&str, u32>) -> bool {
    let mut produced: HashMap<&str, u32> = HashMap::new();
    for arc_id in &transition.arc_ids {
        let Some(arc) = net.arcs.get(arc_id) else { continue };
        if arc.kind == ArcKind::Regular && arc.is_outgoing_from(&transition.id) {
            *produced.entry(arc.outgoing_id.as_str()).or_insert(0) += 1;
        }
    }
    for (&place_id, &extra) in &produced {
        let Some(place) = net.places.get(place_id) else { continue };
        if let Some(cap) = place.capacity() {
            let consumed = required.get(place_id).copied().unwrap_or(0);
            // The requirement check has already passed, so tokens >= consumed.
            let after = u64::from(place.tokens() - consumed) + u64::from(extra);
            if after > u64::from(cap) {
                return false;
            }
        }
    }
    true
}

/// Applies the marking effects of firing one transition.
///
/// A validation pass first confirms every consumption is covered, so a
/// failed firing reports the offending transition and place without touching
/// the marking. Effects then settle in phases: bidirectional arcs (consume
/// one, produce one, net zero at the connected place), regular consumption,
/// regular production. Consumption runs before production so a self-loop on
/// a bounded place frees the slot it refills.
pub(crate) fn fire(net: &mut PetriNet, index: usize) -> Result<(), EngineError> {
    let transition_id = net.transitions[index].id.clone();
    let arc_ids = net.transitions[index].arc_ids.clone();

    let mut consumption: HashMap<String, u32> = HashMap::new();
    for arc_id in &arc_ids {
        let Some(arc) = net.arcs.get(arc_id) else { continue };
        match arc.kind {
            ArcKind::Regular if arc.is_incoming_to(&transition_id) => {
                *consumption.entry(arc.incoming_id.clone()).or_insert(0) += 1;
            }
            ArcKind::Bidirectional => {
                let place_id = arc.place_end(&transition_id);
                if net.tokens_at(place_id) == 0 {
                    return Err(EngineError::Invariant {
                        transition_id: transition_id.clone(),
                        place_id: place_id.to_string(),
                    });
                }
            }
            _ => {}
        }
    }
    for (place_id, needed) in &consumption {
        if net.tokens_at(place_id) < *needed {
            return Err(EngineError::Invariant {
                transition_id: transition_id.clone(),
                place_id: place_id.clone(),
            });
        }
    }

    let PetriNet { places, arcs, .. } = net;

    for arc_id in &arc_ids {
        let Some(arc) = arcs.get(arc_id) else { continue };
        if arc.kind != ArcKind::Bidirectional {
            continue;
        }
        if let Some(place) = places.get_mut(arc.place_end(&transition_id)) {
            place.decrement_tokens();
            place.increment_tokens();
        }
    }
    for arc_id in &arc_ids {
        let Some(arc) = arcs.get(arc_id) else { continue };
        if arc.kind == ArcKind::Regular && arc.is_incoming_to(&transition_id) {
            if let Some(place) = places.get_mut(arc.incoming_id.as_str()) {
                place.decrement_tokens();
            }
        }
    }
    for arc_id in &arc_ids {
        let Some(arc) = arcs.get(arc_id) else { continue };
        if arc.kind == ArcKind::Regular && arc.is_outgoing_from(&transition_id) {
            if let Some(place) = places.get_mut(arc.outgoing_id.as_str()) {
                place.increment_tokens();
            }
        }
    }

    Ok(())
}

fn evaluate_all(net: &mut PetriNet, policy: CapacityPolicy) {
    let shared: &PetriNet = net;
    let flags: Vec<bool> = shared
        .transitions
        .iter()
        .map(|t| is_enabled(shared, t, policy))
        .collect();
    for (transition, flag) in net.transitions.iter_mut().zip(flags) {
        transition.enabled = flag;
    }
}

fn enabled_indices(net: &PetriNet) -> Vec<usize> {
    net.transitions
        .iter()
        .enumerate()
        .filter(|(_, t)| t.enabled)
        .map(|(index, _)| index)
        .collect()
}

fn mark_only(net: &mut PetriNet, index: usize) {
    for (i, transition) in net.transitions.iter_mut().enumerate() {
        transition.enabled = i == index;
    }
}

fn select_uniform<R: Rng + ?Sized>(enabled: &[usize], rng: &mut R) -> usize {
    if enabled.len() == 1 {
        debug!("single enabled transition, firing it");
        return enabled[0];
    }
    let index = *enabled
        .choose(rng)
        .expect("selection from non-empty enabled set");
    debug!("randomly selected one of {} enabled transitions", enabled.len());
    index
}
