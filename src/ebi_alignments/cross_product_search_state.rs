use std::cmp::Ordering;

use crate::{
    ebi_alignments::linear_programming_solver::HeuristicEstimate, marking::Marking,
    net::TransitionIndex,
};

/// A node of the search through the reachability graph of the synchronous product net.
/// States live in an arena; `parent` is a handle into that arena.
#[derive(Clone, Debug)]
pub struct SearchState {
    pub marking: Marking,
    pub g: f64,
    pub heuristic: HeuristicEstimate,
    pub parent: Option<usize>,
    pub transition: Option<TransitionIndex>,
}

impl SearchState {
    pub fn f(&self) -> f64 {
        self.g + self.heuristic.h
    }

    pub fn h(&self) -> f64 {
        self.heuristic.h
    }

    pub fn is_trusted(&self) -> bool {
        self.heuristic.trusted
    }

    pub fn get_priority(&self, index: usize) -> SmallestCostHolder {
        SmallestCostHolder {
            estimated_cost: self.f(),
            trusted: self.is_trusted(),
            heuristic: self.h(),
            index,
        }
    }
}

/// The priority of a state in the open set. The order is reversed, so that the greatest holder
/// is the state with the smallest `f`, then trusted before untrusted, then the smallest `h`,
/// then the earliest inserted.
#[derive(Clone, Copy, Debug)]
pub struct SmallestCostHolder {
    pub estimated_cost: f64,
    pub trusted: bool,
    pub heuristic: f64,
    pub index: usize,
}

impl PartialEq for SmallestCostHolder {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SmallestCostHolder {}

impl PartialOrd for SmallestCostHolder {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SmallestCostHolder {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .estimated_cost
            .total_cmp(&self.estimated_cost)
            .then_with(|| self.trusted.cmp(&other.trusted))
            .then_with(|| other.heuristic.total_cmp(&self.heuristic))
            .then_with(|| other.index.cmp(&self.index))
    }
}

#[cfg(test)]
mod tests {
    use super::SmallestCostHolder;

    fn holder(estimated_cost: f64, trusted: bool, heuristic: f64, index: usize) -> SmallestCostHolder {
        SmallestCostHolder {
            estimated_cost,
            trusted,
            heuristic,
            index,
        }
    }

    #[test]
    fn smallest_cost_is_greatest() {
        assert!(holder(1.0, false, 1.0, 5) > holder(2.0, true, 0.0, 0));
    }

    #[test]
    fn ties_prefer_trust_then_small_heuristic_then_age() {
        assert!(holder(2.0, true, 2.0, 5) > holder(2.0, false, 0.0, 0));
        assert!(holder(2.0, true, 0.0, 5) > holder(2.0, true, 1.0, 0));
        assert!(holder(2.0, true, 1.0, 0) > holder(2.0, true, 1.0, 1));
        assert_eq!(holder(2.0, true, 1.0, 3), holder(2.0, true, 1.0, 3));
    }

    #[test]
    fn max_heap_pops_smallest() {
        let mut heap = std::collections::BinaryHeap::new();
        heap.push(holder(3.0, true, 0.0, 0));
        heap.push(holder(1.0, false, 1.0, 1));
        heap.push(holder(1.0, true, 1.0, 2));

        assert_eq!(heap.pop().unwrap().index, 2);
        assert_eq!(heap.pop().unwrap().index, 1);
        assert_eq!(heap.pop().unwrap().index, 0);
    }
}
