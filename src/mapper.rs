use std::collections::{HashMap, HashSet};

use crate::error::StructuralError;
use crate::model::{PetriNetDTO, TransitionDTO};
use crate::net::{Arc, ArcKind, PetriNet, Place, Transition};

const ARC_TYPE_REGULAR: &str = "REGULAR";
const ARC_TYPE_INHIBITOR: &str = "INHIBITOR";
const ARC_TYPE_BIDIRECTIONAL: &str = "BIDIRECTIONAL";

/// Builds the internal net from the wire DTO, validating structural
/// consistency: recognized arc type tags, resolvable bipartite endpoints,
/// place->transition orientation for inhibitors, incident arc references on
/// transitions, and unique IDs per namespace.
///
/// Fails without side effects; the caller's DTO is never mutated on error.
pub(crate) fn build_net(dto: &PetriNetDTO) -> Result<PetriNet, StructuralError> {
    let mut places: HashMap<String, Place> = HashMap::with_capacity(dto.places.len());
    for place in &dto.places {
        let built = Place::new(&place.id, place.tokens, place.bounded, place.capacity);
        if places.insert(place.id.clone(), built).is_some() {
            return Err(StructuralError::DuplicateId {
                namespace: "place",
                id: place.id.clone(),
            });
        }
    }

    let mut transition_ids: HashSet<&str> = HashSet::with_capacity(dto.transitions.len());
    for transition in &dto.transitions {
        if !transition_ids.insert(&transition.id) {
            return Err(StructuralError::DuplicateId {
                namespace: "transition",
                id: transition.id.clone(),
            });
        }
    }

    let mut arcs: HashMap<String, Arc> = HashMap::with_capacity(dto.arcs.len());
    for arc in &dto.arcs {
        let kind = match arc.arc_type.as_str() {
            ARC_TYPE_REGULAR => ArcKind::Regular,
            ARC_TYPE_INHIBITOR => ArcKind::Inhibitor,
            ARC_TYPE_BIDIRECTIONAL => ArcKind::Bidirectional,
            other => {
                return Err(StructuralError::UnknownArcType {
                    arc_id: arc.id.clone(),
                    tag: other.to_string(),
                })
            }
        };

        let incoming_is_place = places.contains_key(&arc.incoming_id);
        let outgoing_is_place = places.contains_key(&arc.outgoing_id);
        for (node_id, known) in [
            (&arc.incoming_id, incoming_is_place || transition_ids.contains(arc.incoming_id.as_str())),
            (&arc.outgoing_id, outgoing_is_place || transition_ids.contains(arc.outgoing_id.as_str())),
        ] {
            if !known {
                return Err(StructuralError::UnknownEndpoint {
                    arc_id: arc.id.clone(),
                    node_id: node_id.clone(),
                });
            }
        }

        let place_to_transition =
            incoming_is_place && transition_ids.contains(arc.outgoing_id.as_str());
        let transition_to_place =
            transition_ids.contains(arc.incoming_id.as_str()) && outgoing_is_place;
        if !place_to_transition && !transition_to_place {
            return Err(StructuralError::NotBipartite {
                arc_id: arc.id.clone(),
            });
        }
        if kind == ArcKind::Inhibitor && !place_to_transition {
            return Err(StructuralError::InhibitorOrientation {
                arc_id: arc.id.clone(),
            });
        }

        let built = Arc {
            kind,
            incoming_id: arc.incoming_id.clone(),
            outgoing_id: arc.outgoing_id.clone(),
        };
        if arcs.insert(arc.id.clone(), built).is_some() {
            return Err(StructuralError::DuplicateId {
                namespace: "arc",
                id: arc.id.clone(),
            });
        }
    }

    let mut transitions = Vec::with_capacity(dto.transitions.len());
    for transition in &dto.transitions {
        check_arc_refs(transition, &arcs)?;
        transitions.push(Transition::new(
            transition.id.clone(),
            transition.arc_ids.clone(),
        ));
    }

    Ok(PetriNet {
        places,
        arcs,
        transitions,
    })
}

fn check_arc_refs(
    transition: &TransitionDTO,
    arcs: &HashMap<String, Arc>,
) -> Result<(), StructuralError> {
    for arc_id in &transition.arc_ids {
        let arc = arcs.get(arc_id).ok_or_else(|| StructuralError::UnknownArc {
            transition_id: transition.id.clone(),
            arc_id: arc_id.clone(),
        })?;
        if arc.incoming_id != transition.id && arc.outgoing_id != transition.id {
            return Err(StructuralError::ArcNotIncident {
                transition_id: transition.id.clone(),
                arc_id: arc_id.clone(),
            });
        }
    }
    Ok(())
}

/// Writes the post-step state back into the wire DTO: token counts and the
/// normalized bounded/capacity pair per place, the enabled flag per
/// transition. Everything else on the DTO (geometry, names, title, the arcs
/// themselves) is left exactly as it came in.
pub(crate) fn write_back(net: &PetriNet, dto: &mut PetriNetDTO) {
    for place in dto.places.iter_mut() {
        if let Some(built) = net.places.get(&place.id) {
            place.tokens = i64::from(built.tokens());
            place.bounded = built.bounded();
            place.capacity = built.capacity().map(i64::from);
        }
    }
    for transition in dto.transitions.iter_mut() {
        if let Some(built) = net.transitions.iter().find(|t| t.id == transition.id) {
            transition.enabled = built.enabled;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ArcDTO, PlaceDTO, TransitionDTO};

    fn place(id: &str, tokens: i64) -> PlaceDTO {
        PlaceDTO {
            id: id.to_string(),
            tokens,
            bounded: false,
            capacity: None,
            name: None,
            position: None,
            size: None,
        }
    }

    fn transition(id: &str, arc_ids: &[&str]) -> TransitionDTO {
        TransitionDTO {
            id: id.to_string(),
            enabled: false,
            arc_ids: arc_ids.iter().map(|s| s.to_string()).collect(),
            name: None,
            position: None,
            size: None,
        }
    }

    fn arc(id: &str, arc_type: &str, from: &str, to: &str) -> ArcDTO {
        ArcDTO {
            id: id.to_string(),
            arc_type: arc_type.to_string(),
            incoming_id: from.to_string(),
            outgoing_id: to.to_string(),
        }
    }

    fn dto(places: Vec<PlaceDTO>, transitions: Vec<TransitionDTO>, arcs: Vec<ArcDTO>) -> PetriNetDTO {
        PetriNetDTO {
            title: None,
            places,
            transitions,
            arcs,
            deterministic_mode: None,
        }
    }

    #[test]
    fn builds_a_consistent_net() {
        let input = dto(
            vec![place("p1", 1), place("p2", 0)],
            vec![transition("t1", &["a1", "a2"])],
            vec![
                arc("a1", "REGULAR", "p1", "t1"),
                arc("a2", "REGULAR", "t1", "p2"),
            ],
        );
        let net = build_net(&input).unwrap();
        assert_eq!(net.places.len(), 2);
        assert_eq!(net.arcs.len(), 2);
        assert_eq!(net.transitions.len(), 1);
        assert_eq!(net.tokens_at("p1"), 1);
    }

    #[test]
    fn rejects_unknown_arc_type() {
        let input = dto(
            vec![place("p1", 1)],
            vec![transition("t1", &["a1"])],
            vec![arc("a1", "RESET", "p1", "t1")],
        );
        assert_eq!(
            build_net(&input),
            Err(StructuralError::UnknownArcType {
                arc_id: "a1".into(),
                tag: "RESET".into(),
            })
        );
    }

    #[test]
    fn rejects_dangling_endpoint() {
        let input = dto(
            vec![place("p1", 1)],
            vec![transition("t1", &[])],
            vec![arc("a1", "REGULAR", "ghost", "t1")],
        );
        assert_eq!(
            build_net(&input),
            Err(StructuralError::UnknownEndpoint {
                arc_id: "a1".into(),
                node_id: "ghost".into(),
            })
        );
    }

    #[test]
    fn rejects_place_to_place_arc() {
        let input = dto(
            vec![place("p1", 1), place("p2", 0)],
            vec![transition("t1", &[])],
            vec![arc("a1", "REGULAR", "p1", "p2")],
        );
        assert_eq!(
            build_net(&input),
            Err(StructuralError::NotBipartite { arc_id: "a1".into() })
        );
    }

    #[test]
    fn rejects_producing_inhibitor() {
        let input = dto(
            vec![place("p1", 0)],
            vec![transition("t1", &["a1"])],
            vec![arc("a1", "INHIBITOR", "t1", "p1")],
        );
        assert_eq!(
            build_net(&input),
            Err(StructuralError::InhibitorOrientation { arc_id: "a1".into() })
        );
    }

    #[test]
    fn rejects_unknown_arc_reference() {
        let input = dto(vec![place("p1", 1)], vec![transition("t1", &["nope"])], vec![]);
        assert_eq!(
            build_net(&input),
            Err(StructuralError::UnknownArc {
                transition_id: "t1".into(),
                arc_id: "nope".into(),
            })
        );
    }

    #[test]
    fn rejects_foreign_arc_reference() {
        let input = dto(
            vec![place("p1", 1)],
            vec![transition("t1", &["a1"]), transition("t2", &["a1"])],
            vec![arc("a1", "REGULAR", "p1", "t1")],
        );
        assert_eq!(
            build_net(&input),
            Err(StructuralError::ArcNotIncident {
                transition_id: "t2".into(),
                arc_id: "a1".into(),
            })
        );
    }

    #[test]
    fn rejects_duplicate_place_id() {
        let input = dto(vec![place("p1", 1), place("p1", 2)], vec![], vec![]);
        assert_eq!(
            build_net(&input),
            Err(StructuralError::DuplicateId {
                namespace: "place",
                id: "p1".into(),
            })
        );
    }

    #[test]
    fn write_back_updates_marking_and_flags_only() {
        let mut input = dto(
            vec![place("p1", 1), place("p2", 0)],
            vec![transition("t1", &["a1", "a2"])],
            vec![
                arc("a1", "REGULAR", "p1", "t1"),
                arc("a2", "REGULAR", "t1", "p2"),
            ],
        );
        input.title = Some("demo".into());
        input.places[0].name = Some("idle".into());

        let mut net = build_net(&input).unwrap();
        net.places.get_mut("p1").unwrap().decrement_tokens();
        net.transitions[0].enabled = true;

        write_back(&net, &mut input);
        assert_eq!(input.places[0].tokens, 0);
        assert!(input.transitions[0].enabled);
        assert_eq!(input.title.as_deref(), Some("demo"));
        assert_eq!(input.places[0].name.as_deref(), Some("idle"));
        assert_eq!(input.arcs[0].incoming_id, "p1");
    }

    #[test]
    fn write_back_reports_normalized_capacity() {
        let mut bounded = place("p1", 5);
        bounded.bounded = true;
        bounded.capacity = None;
        let mut input = dto(vec![bounded], vec![], vec![]);

        let net = build_net(&input).unwrap();
        write_back(&net, &mut input);
        assert_eq!(input.places[0].capacity, Some(0));
        assert_eq!(input.places[0].tokens, 0);
    }
}
