use std::fmt::Display;

use crate::net::PlaceIndex;

/// The origin of a place of the synchronous product net.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProductPlace {
    /// The place before event `i` of the trace (or after the last event).
    Trace(usize),
    Model(PlaceIndex),
}

impl Display for ProductPlace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProductPlace::Trace(position) => write!(f, "trace_{}", position),
            ProductPlace::Model(place) => write!(f, "model_{}", place),
        }
    }
}
