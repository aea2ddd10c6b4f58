use crate::{
    ebi_framework::activity_key::Activity,
    ebi_objects::accepting_petri_net::AcceptingPetriNet,
    net,
};

/// Builds the sequential net of a trace: places `0..=n`, and transition `i`, labelled with event `i`,
/// moves the token from place `i` to place `i + 1`. The initial marking is `{0:1}`, the final marking `{n:1}`.
///
/// The labels are the activities of the trace as given; the activity key of the net stays empty.
pub fn trace_net(trace: &[Activity]) -> AcceptingPetriNet {
    let mut result = AcceptingPetriNet::new();

    let mut place = result.add_place();
    result.initial_marking.place2token[place] = 1;

    for activity in trace {
        let transition = result.add_transition(Some(*activity));
        net::add_arc(
            &mut result.transition2input_places[transition],
            &mut result.transition2input_places_cardinality[transition],
            place,
            1,
        );

        place = result.add_place();
        net::add_arc(
            &mut result.transition2output_places[transition],
            &mut result.transition2output_places_cardinality[transition],
            place,
            1,
        );
    }

    result.final_marking.place2token[place] = 1;

    result
}
