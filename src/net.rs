use anyhow::{Result, anyhow};

use crate::marking::Marking;

pub type TransitionIndex = usize;
pub type PlaceIndex = usize;

/// The structure of a place/transition net with weighted arcs, and its firing semantics.
///
/// Arcs are stored per transition as a list of distinct places together with a list of
/// cardinalities (arc weights) at the same positions.
pub trait Net {
    fn get_number_of_places(&self) -> usize;

    fn get_number_of_transitions(&self) -> usize;

    fn get_input_places(&self, transition: TransitionIndex) -> &[PlaceIndex];

    fn get_input_cardinalities(&self, transition: TransitionIndex) -> &[u64];

    fn get_output_places(&self, transition: TransitionIndex) -> &[PlaceIndex];

    fn get_output_cardinalities(&self, transition: TransitionIndex) -> &[u64];

    fn is_transition_enabled(&self, marking: &Marking, transition: TransitionIndex) -> bool {
        self.get_input_places(transition)
            .iter()
            .zip(self.get_input_cardinalities(transition))
            .all(|(place, cardinality)| marking.get_tokens(*place) >= *cardinality)
    }

    /// Returns the enabled transitions in ascending order.
    fn get_enabled_transitions(&self, marking: &Marking) -> Vec<TransitionIndex> {
        (0..self.get_number_of_transitions())
            .filter(|transition| self.is_transition_enabled(marking, *transition))
            .collect()
    }

    /// Fires `transition` in `marking`, returning the resulting marking. The given marking is left untouched.
    fn execute_transition(
        &self,
        marking: &Marking,
        transition: TransitionIndex,
    ) -> Result<Marking> {
        if transition >= self.get_number_of_transitions() {
            return Err(anyhow!(
                "non-existing transition {} referenced, while there are {}",
                transition,
                self.get_number_of_transitions()
            ));
        }

        let mut result = marking.clone();
        for (place, cardinality) in self
            .get_input_places(transition)
            .iter()
            .zip(self.get_input_cardinalities(transition))
        {
            result
                .decrease(*place, *cardinality)
                .map_err(|_| anyhow!("transition {} is not enabled in {}", transition, marking))?;
        }
        for (place, cardinality) in self
            .get_output_places(transition)
            .iter()
            .zip(self.get_output_cardinalities(transition))
        {
            result.increase(*place, *cardinality)?;
        }
        Ok(result)
    }
}

/// Adds an arc with the given weight to a (places, cardinalities) pair, merging parallel arcs.
pub(crate) fn add_arc(
    places: &mut Vec<PlaceIndex>,
    cardinalities: &mut Vec<u64>,
    place: PlaceIndex,
    cardinality: u64,
) {
    if let Some(pos) = places.iter().position(|p| *p == place) {
        cardinalities[pos] += cardinality;
    } else {
        places.push(place);
        cardinalities.push(cardinality);
    }
}
