use std::fmt::Display;
use itertools::Itertools;

use crate::{
    ebi_alignments::{
        alignment_error::AlignmentError, cross_product_place::ProductPlace, move_costs::MoveCosts,
        trace_net,
    },
    ebi_framework::activity_key::Activity,
    ebi_objects::{accepting_petri_net::AcceptingPetriNet, alignments::Move},
    marking::Marking,
    net::{self, Net, PlaceIndex, TransitionIndex},
};

/// The synchronous product of a trace net and a model net. Every firing sequence from the initial
/// to the final marking is an alignment of the trace and the model, with the same total cost.
///
/// Places: the trace places `0..=n`, followed by the model places.
/// Transitions: the log moves (one per event), followed by the model moves (one per model
/// transition), followed by the synchronous moves (one per pair of event and model transition with
/// the same label, ordered by event and then by model transition).
#[derive(Clone, Debug)]
pub struct SynchronousProductNet {
    places: Vec<ProductPlace>,
    moves: Vec<Move>,
    costs: Vec<f64>,
    initial_marking: Marking,
    final_marking: Marking,
    transition2input_places: Vec<Vec<PlaceIndex>>,
    transition2output_places: Vec<Vec<PlaceIndex>>,
    transition2input_places_cardinality: Vec<Vec<u64>>,
    transition2output_places_cardinality: Vec<Vec<u64>>,
}

impl SynchronousProductNet {
    /// Builds the product of `trace` and `model`. The trace must be expressed in the activity key of the model.
    pub fn new(
        trace: &[Activity],
        model: &AcceptingPetriNet,
        costs: &MoveCosts,
    ) -> Result<Self, AlignmentError> {
        costs.validate(trace.len(), model.get_number_of_transitions())?;

        let trace_net = trace_net::trace_net(trace);
        let trace_places = trace_net.get_number_of_places();

        let mut result = Self {
            places: (0..trace_places)
                .map(ProductPlace::Trace)
                .chain((0..model.get_number_of_places()).map(ProductPlace::Model))
                .collect(),
            moves: vec![],
            costs: vec![],
            initial_marking: trace_net
                .get_initial_marking()
                .concatenate(model.get_initial_marking()),
            final_marking: trace_net
                .get_final_marking()
                .concatenate(model.get_final_marking()),
            transition2input_places: vec![],
            transition2output_places: vec![],
            transition2input_places_cardinality: vec![],
            transition2output_places_cardinality: vec![],
        };

        //log moves
        for (event, activity) in trace.iter().enumerate() {
            let transition =
                result.add_transition(Move::LogMove(*activity), costs.get_log_move_cost(event));
            result.copy_arcs(transition, &trace_net, event, 0);
        }

        //model moves
        for model_transition in 0..model.get_number_of_transitions() {
            let label = model.get_transition_label(model_transition);
            let transition = result.add_transition(
                Move::ModelMove(label, model_transition),
                costs.get_model_move_cost(model_transition, label.is_none()),
            );
            result.copy_arcs(transition, model, model_transition, trace_places);
        }

        //synchronous moves
        for (event, activity) in trace.iter().enumerate() {
            for model_transition in 0..model.get_number_of_transitions() {
                if model.get_transition_label(model_transition) == Some(*activity) {
                    let transition = result.add_transition(
                        Move::SynchronousMove(*activity, model_transition),
                        costs.get_synchronous_move_cost(model_transition),
                    );
                    result.copy_arcs(transition, &trace_net, event, 0);
                    result.copy_arcs(transition, model, model_transition, trace_places);
                }
            }
        }

        log::debug!(
            "synchronous product net with {} places and {} transitions",
            result.get_number_of_places(),
            result.get_number_of_transitions()
        );

        Ok(result)
    }

    fn add_transition(&mut self, movee: Move, cost: f64) -> TransitionIndex {
        self.moves.push(movee);
        self.costs.push(cost);
        self.transition2input_places.push(vec![]);
        self.transition2output_places.push(vec![]);
        self.transition2input_places_cardinality.push(vec![]);
        self.transition2output_places_cardinality.push(vec![]);
        self.moves.len() - 1
    }

    /// Copies the arcs of `source_transition` of `source` onto `transition`, shifting the places by `offset`.
    fn copy_arcs(
        &mut self,
        transition: TransitionIndex,
        source: &AcceptingPetriNet,
        source_transition: TransitionIndex,
        offset: usize,
    ) {
        for (place, cardinality) in source
            .get_input_places(source_transition)
            .iter()
            .zip(source.get_input_cardinalities(source_transition))
        {
            net::add_arc(
                &mut self.transition2input_places[transition],
                &mut self.transition2input_places_cardinality[transition],
                place + offset,
                *cardinality,
            );
        }
        for (place, cardinality) in source
            .get_output_places(source_transition)
            .iter()
            .zip(source.get_output_cardinalities(source_transition))
        {
            net::add_arc(
                &mut self.transition2output_places[transition],
                &mut self.transition2output_places_cardinality[transition],
                place + offset,
                *cardinality,
            );
        }
    }

    pub fn get_initial_marking(&self) -> &Marking {
        &self.initial_marking
    }

    pub fn get_final_marking(&self) -> &Marking {
        &self.final_marking
    }

    pub fn get_place(&self, place: PlaceIndex) -> ProductPlace {
        self.places[place]
    }

    pub fn get_move(&self, transition: TransitionIndex) -> Move {
        self.moves[transition]
    }

    pub fn get_cost(&self, transition: TransitionIndex) -> f64 {
        self.costs[transition]
    }

    /// The cost function, indexed by product transition.
    pub fn get_costs(&self) -> &[f64] {
        &self.costs
    }

    pub fn is_log_move(&self, transition: TransitionIndex) -> bool {
        self.moves[transition].is_log_move()
    }

    /// Silent model transitions are model moves as well.
    pub fn is_model_move(&self, transition: TransitionIndex) -> bool {
        self.moves[transition].is_model_move()
    }

    pub fn is_synchronous_move(&self, transition: TransitionIndex) -> bool {
        self.moves[transition].is_synchronous_move()
    }
}

impl Net for SynchronousProductNet {
    fn get_number_of_places(&self) -> usize {
        self.places.len()
    }

    fn get_number_of_transitions(&self) -> usize {
        self.moves.len()
    }

    fn get_input_places(&self, transition: TransitionIndex) -> &[PlaceIndex] {
        &self.transition2input_places[transition]
    }

    fn get_input_cardinalities(&self, transition: TransitionIndex) -> &[u64] {
        &self.transition2input_places_cardinality[transition]
    }

    fn get_output_places(&self, transition: TransitionIndex) -> &[PlaceIndex] {
        &self.transition2output_places[transition]
    }

    fn get_output_cardinalities(&self, transition: TransitionIndex) -> &[u64] {
        &self.transition2output_places_cardinality[transition]
    }
}

impl Display for SynchronousProductNet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "synchronous product net with places [{}]",
            self.places.iter().join(", ")
        )?;
        for transition in 0..self.get_number_of_transitions() {
            writeln!(
                f,
                "t{} {:?} cost {} in {:?} out {:?}",
                transition,
                self.moves[transition],
                self.costs[transition],
                self.transition2input_places[transition],
                self.transition2output_places[transition]
            )?;
        }
        write!(
            f,
            "initial marking {}, final marking {}",
            self.initial_marking, self.final_marking
        )
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use crate::{
        ebi_alignments::{
            cross_product_place::ProductPlace, move_costs::MoveCosts,
        },
        ebi_objects::{accepting_petri_net::AcceptingPetriNet, alignments::Move},
        marking::Marking,
        net::Net,
    };

    use super::SynchronousProductNet;

    fn model(file: &str) -> AcceptingPetriNet {
        fs::read_to_string(file)
            .unwrap()
            .parse::<AcceptingPetriNet>()
            .unwrap()
    }

    #[test]
    fn product_of_single_transition() {
        let mut model = model("testfiles/a.apn");
        let trace = model.get_activity_key_mut().process_trace(&["a"]);
        let product = SynchronousProductNet::new(&trace, &model, &MoveCosts::standard()).unwrap();

        //places: trace 0, trace 1, model 0, model 1
        assert_eq!(product.get_number_of_places(), 4);
        assert_eq!(product.get_place(1), ProductPlace::Trace(1));
        assert_eq!(product.get_place(2), ProductPlace::Model(0));

        //transitions: log move, model move, synchronous move
        assert_eq!(product.get_number_of_transitions(), 3);
        assert!(product.is_log_move(0));
        assert!(product.is_model_move(1));
        assert!(product.is_synchronous_move(2));
        assert_eq!(product.get_costs(), &[1.0, 1.0, 0.0]);

        assert_eq!(product.get_input_places(2), &[0, 2]);
        assert_eq!(product.get_output_places(2), &[1, 3]);

        assert_eq!(
            product.get_initial_marking(),
            &Marking::from(vec![1, 0, 1, 0])
        );
        assert_eq!(product.get_final_marking(), &Marking::from(vec![0, 1, 0, 1]));
    }

    #[test]
    fn product_without_matching_labels() {
        let mut model = model("testfiles/a.apn");
        let trace = model.get_activity_key_mut().process_trace(&["b"]);
        let product = SynchronousProductNet::new(&trace, &model, &MoveCosts::standard()).unwrap();

        assert_eq!(product.get_number_of_transitions(), 2);
        assert!(!(0..2).any(|t| product.is_synchronous_move(t)));
    }

    #[test]
    fn product_silent_transitions_have_no_synchronous_move() {
        let mut model = model("testfiles/choice-tau.apn");
        let trace = model.get_activity_key_mut().process_trace(&["a", "c"]);
        let product = SynchronousProductNet::new(&trace, &model, &MoveCosts::standard()).unwrap();

        //2 log moves, 4 model moves, 2 synchronous moves
        assert_eq!(product.get_number_of_transitions(), 8);
        assert!(matches!(product.get_move(4), Move::ModelMove(None, 2)));
        assert_eq!(product.get_cost(4), 0.0);

        let synchronous = (0..8)
            .filter(|t| product.is_synchronous_move(*t))
            .map(|t| product.get_move(t))
            .collect::<Vec<_>>();
        assert!(matches!(synchronous[0], Move::SynchronousMove(_, 0)));
        assert!(matches!(synchronous[1], Move::SynchronousMove(_, 3)));
    }

    #[test]
    fn product_keeps_arc_weights() {
        let mut model = model("testfiles/weighted.apn");
        let trace = model.get_activity_key_mut().process_trace(&["a", "b"]);
        let product = SynchronousProductNet::new(&trace, &model, &MoveCosts::standard()).unwrap();

        let trace_places = 3;
        //model move on b consumes two tokens
        assert_eq!(product.get_input_places(3), &[trace_places + 1]);
        assert_eq!(product.get_input_cardinalities(3), &[2]);
    }

    #[test]
    fn product_rejects_invalid_costs() {
        let mut model = model("testfiles/a.apn");
        let trace = model.get_activity_key_mut().process_trace(&["a"]);
        let costs = MoveCosts::standard().with_trace_costs(vec![1.0, 1.0]);
        assert!(SynchronousProductNet::new(&trace, &model, &costs).is_err());
    }
}
