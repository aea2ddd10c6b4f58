use crate::{
    ebi_alignments::alignment_error::AlignmentError,
    marking::Marking,
    net::{Net, PlaceIndex, TransitionIndex},
};

/// The signed incidence matrix of a net: entry `[place][transition]` is the number of tokens the
/// transition puts into the place minus the number it takes out.
///
/// Rows and columns use the indices of the net itself.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IncidenceMatrix {
    number_of_transitions: usize,
    matrix: Vec<Vec<i64>>, //[place][transition]
}

impl IncidenceMatrix {
    pub fn new(net: &impl Net) -> Result<Self, AlignmentError> {
        let number_of_transitions = net.get_number_of_transitions();
        let mut matrix = vec![vec![0i64; number_of_transitions]; net.get_number_of_places()];

        for transition in 0..number_of_transitions {
            for (place, cardinality) in net
                .get_input_places(transition)
                .iter()
                .zip(net.get_input_cardinalities(transition))
            {
                matrix[*place][transition] -= to_signed(*place, *cardinality)?;
            }
            for (place, cardinality) in net
                .get_output_places(transition)
                .iter()
                .zip(net.get_output_cardinalities(transition))
            {
                matrix[*place][transition] += to_signed(*place, *cardinality)?;
            }
        }

        Ok(Self {
            number_of_transitions,
            matrix,
        })
    }

    pub fn get_number_of_places(&self) -> usize {
        self.matrix.len()
    }

    pub fn get_number_of_transitions(&self) -> usize {
        self.number_of_transitions
    }

    pub fn place_index(&self, place: PlaceIndex) -> usize {
        place
    }

    pub fn transition_index(&self, transition: TransitionIndex) -> usize {
        transition
    }

    pub fn row(&self, place: PlaceIndex) -> &[i64] {
        &self.matrix[place]
    }

    /// The effect of firing `transition` once, over all places.
    pub fn column(&self, transition: TransitionIndex) -> Vec<i64> {
        self.matrix.iter().map(|row| row[transition]).collect()
    }

    pub fn encode_marking(&self, marking: &Marking) -> Result<Vec<i64>, AlignmentError> {
        marking
            .get_place2token()
            .iter()
            .enumerate()
            .map(|(place, tokens)| to_signed(place, *tokens))
            .collect()
    }
}

fn to_signed(place: PlaceIndex, value: u64) -> Result<i64, AlignmentError> {
    i64::try_from(value).map_err(|_| AlignmentError::ValueOutOfRange { place, value })
}
