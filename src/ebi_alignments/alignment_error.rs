use thiserror::Error;

use crate::{
    marking::Marking,
    net::{PlaceIndex, TransitionIndex},
};

/// The ways in which aligning a single trace can fail.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AlignmentError {
    /// The marking equation has no non-negative solution from a reached marking; the product net is malformed.
    #[error("the marking equation has no non-negative solution from marking {marking}: {reason}")]
    InfeasibleMarkingEquation { marking: Marking, reason: String },

    /// The open set ran empty before the final marking was reached; the product net is malformed.
    #[error(
        "the search space was exhausted after visiting {visited} states without reaching the final marking"
    )]
    SearchExhausted { visited: usize },

    /// The caller-imposed limit on visited states was reached; no alignment was found.
    #[error("no alignment found within the limit of {limit} visited states")]
    StateLimitReached { limit: usize },

    #[error("invalid cost configuration: {0}")]
    InvalidCosts(String),

    /// A token count or arc weight is too large for the signed integers of the marking equation.
    #[error("{value} at place {place} does not fit in the marking equation")]
    ValueOutOfRange { place: PlaceIndex, value: u64 },

    #[error("transition {transition} is not enabled in marking {marking}")]
    TransitionNotEnabled {
        transition: TransitionIndex,
        marking: Marking,
    },
}

impl AlignmentError {
    /// Whether the error indicates a malformed product net rather than a configuration problem or a limit.
    pub fn is_internal_fault(&self) -> bool {
        matches!(
            self,
            AlignmentError::InfeasibleMarkingEquation { .. }
                | AlignmentError::SearchExhausted { .. }
                | AlignmentError::TransitionNotEnabled { .. }
        )
    }
}
