use priority_queue::PriorityQueue;
use rustc_hash::{FxBuildHasher, FxHashSet};

use crate::{
    ebi_alignments::{
        alignment_error::AlignmentError,
        cross_product_net::SynchronousProductNet,
        cross_product_search_state::{SearchState, SmallestCostHolder},
        incidence_matrix::IncidenceMatrix,
        linear_programming_solver::MarkingEquation,
        move_costs::SearchLimits,
    },
    ebi_objects::alignments::{AlignmentResult, Move},
    marking::Marking,
    net::Net,
};

/// Computes an optimal alignment by an A* search from the initial to the final marking of the
/// synchronous product net, guided by the marking equation.
///
/// Derived heuristics that are not trusted are recomputed exactly when their state is popped,
/// and the state is queued again with the exact estimate. Each marking is expanded at most once.
/// A log move is not expanded directly after a model move: the reverse order reaches the same
/// marking with the same cost.
pub fn search(
    net: &SynchronousProductNet,
    limits: &SearchLimits,
) -> Result<AlignmentResult, AlignmentError> {
    let incidence_matrix = IncidenceMatrix::new(net)?;
    let mut marking_equation =
        MarkingEquation::new(&incidence_matrix, net.get_costs(), net.get_final_marking())?;

    let mut arena: Vec<SearchState> = vec![];
    let mut open: PriorityQueue<Marking, SmallestCostHolder, FxBuildHasher> =
        PriorityQueue::with_default_hasher();
    let mut closed: FxHashSet<Marking> = FxHashSet::default();

    let mut visited_states = 0;
    let mut queued_states = 0;
    let mut traversed_arcs = 0;

    //root
    {
        let heuristic = marking_equation.exact_heuristic(net.get_initial_marking())?;
        let root = SearchState {
            marking: net.get_initial_marking().clone(),
            g: 0.0,
            heuristic,
            parent: None,
            transition: None,
        };
        open.push(root.marking.clone(), root.get_priority(0));
        arena.push(root);
    }

    log::debug!(
        "start alignment search from {} to {}, initial estimate {}",
        net.get_initial_marking(),
        net.get_final_marking(),
        arena[0].h()
    );

    while let Some((marking, SmallestCostHolder { index, .. })) = open.pop() {
        if !arena[index].is_trusted() {
            //replace the derived estimate with an exact one and queue the state again
            let heuristic = marking_equation.exact_heuristic(&marking)?;
            let state = SearchState {
                marking: marking.clone(),
                g: arena[index].g,
                heuristic,
                parent: arena[index].parent,
                transition: arena[index].transition,
            };
            let new_index = arena.len();
            log::trace!(
                "re-evaluated {}: h {} -> {}",
                marking,
                arena[index].h(),
                state.h()
            );
            open.push(marking, state.get_priority(new_index));
            arena.push(state);
            continue;
        }

        visited_states += 1;
        let newly_closed = closed.insert(marking.clone());
        debug_assert!(newly_closed, "marking {} expanded twice", marking);

        log::trace!(
            "expand {} with g = {}, h = {}",
            marking,
            arena[index].g,
            arena[index].h()
        );

        if &marking == net.get_final_marking() {
            let result = AlignmentResult {
                moves: reconstruct(net, &arena, index),
                cost: arena[index].g,
                visited_states,
                queued_states,
                traversed_arcs,
                lp_solves: marking_equation.get_lp_solves(),
            };
            log::debug!(
                "alignment found with cost {}: {} visited states, {} queued states, {} traversed arcs, {} linear programs",
                result.cost,
                result.visited_states,
                result.queued_states,
                result.traversed_arcs,
                result.lp_solves
            );
            return Ok(result);
        }

        if let Some(limit) = limits.max_visited_states {
            if visited_states >= limit {
                log::debug!("alignment search stopped at {} visited states", visited_states);
                return Err(AlignmentError::StateLimitReached { limit });
            }
        }

        let after_model_move = arena[index]
            .transition
            .is_some_and(|transition| net.is_model_move(transition));

        for transition in net.get_enabled_transitions(&marking) {
            if after_model_move && net.is_log_move(transition) {
                continue;
            }

            traversed_arcs += 1;

            let child = net.execute_transition(&marking, transition).map_err(|_| {
                AlignmentError::TransitionNotEnabled {
                    transition,
                    marking: marking.clone(),
                }
            })?;

            if closed.contains(&child) {
                continue;
            }

            let g = arena[index].g + net.get_cost(transition);

            if let Some(existing) = open.get_priority(&child) {
                if arena[existing.index].g <= g {
                    continue;
                }
            }

            let heuristic = marking_equation.derive_heuristic(&arena[index].heuristic, transition);
            let state = SearchState {
                marking: child,
                g,
                heuristic,
                parent: Some(index),
                transition: Some(transition),
            };
            let new_index = arena.len();
            open.push(state.marking.clone(), state.get_priority(new_index));
            arena.push(state);
            queued_states += 1;
        }
    }

    log::debug!(
        "alignment search exhausted after {} visited states",
        visited_states
    );
    Err(AlignmentError::SearchExhausted {
        visited: visited_states,
    })
}

fn reconstruct(
    net: &SynchronousProductNet,
    arena: &[SearchState],
    index: usize,
) -> Vec<Move> {
    let mut moves = vec![];
    let mut current = Some(index);
    while let Some(index) = current {
        if let Some(transition) = arena[index].transition {
            moves.push(net.get_move(transition));
        }
        current = arena[index].parent;
    }
    moves.reverse();
    moves
}

#[cfg(test)]
mod tests {
    use std::{cmp::Ordering, collections::BinaryHeap, fs};

    use rustc_hash::FxHashMap;

    use crate::{
        ebi_alignments::{
            alignment_error::AlignmentError,
            cross_product_net::SynchronousProductNet,
            incidence_matrix::IncidenceMatrix,
            linear_programming_solver::MarkingEquation,
            move_costs::{MoveCosts, SearchLimits},
        },
        ebi_objects::{accepting_petri_net::AcceptingPetriNet, alignments::Move},
        marking::Marking,
        net::Net,
    };

    use super::search;

    fn product_with_costs(file: &str, trace: &[&str], costs: &MoveCosts) -> SynchronousProductNet {
        let fin = fs::read_to_string(file).unwrap();
        let mut model = fin.parse::<AcceptingPetriNet>().unwrap();
        let trace = model.get_activity_key_mut().process_trace(trace);
        SynchronousProductNet::new(&trace, &model, costs).unwrap()
    }

    fn product(file: &str, trace: &[&str]) -> SynchronousProductNet {
        product_with_costs(file, trace, &MoveCosts::standard())
    }

    struct Distance(f64, Marking);

    impl PartialEq for Distance {
        fn eq(&self, other: &Self) -> bool {
            self.0 == other.0
        }
    }

    impl Eq for Distance {}

    impl PartialOrd for Distance {
        fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
            Some(self.cmp(other))
        }
    }

    impl Ord for Distance {
        fn cmp(&self, other: &Self) -> Ordering {
            other.0.total_cmp(&self.0)
        }
    }

    /// Dijkstra over the reachability graph, without any pruning; returns the cheapest cost from
    /// `from` to the final marking.
    fn brute_force(net: &SynchronousProductNet, from: &Marking) -> Option<f64> {
        let mut distances: FxHashMap<Marking, f64> = FxHashMap::default();
        let mut queue = BinaryHeap::new();
        distances.insert(from.clone(), 0.0);
        queue.push(Distance(0.0, from.clone()));

        while let Some(Distance(cost, marking)) = queue.pop() {
            if &marking == net.get_final_marking() {
                return Some(cost);
            }
            if distances.get(&marking).is_some_and(|d| *d < cost) {
                continue;
            }
            for transition in net.get_enabled_transitions(&marking) {
                let child = net.execute_transition(&marking, transition).unwrap();
                let child_cost = cost + net.get_cost(transition);
                if distances.get(&child).is_none_or(|d| child_cost < *d) {
                    distances.insert(child.clone(), child_cost);
                    queue.push(Distance(child_cost, child));
                }
            }
        }
        None
    }

    /// All markings reachable from the initial marking.
    fn reachable(net: &SynchronousProductNet) -> Vec<Marking> {
        let mut seen = vec![net.get_initial_marking().clone()];
        let mut todo = vec![net.get_initial_marking().clone()];
        while let Some(marking) = todo.pop() {
            for transition in net.get_enabled_transitions(&marking) {
                let child = net.execute_transition(&marking, transition).unwrap();
                if !seen.contains(&child) {
                    seen.push(child.clone());
                    todo.push(child);
                }
            }
        }
        seen
    }

    /// Replays the alignment on the product net and returns the reached marking and total cost.
    fn replay(net: &SynchronousProductNet, moves: &[Move]) -> (Marking, f64) {
        let mut marking = net.get_initial_marking().clone();
        let mut cost = 0.0;
        for movee in moves {
            let transition = net
                .get_enabled_transitions(&marking)
                .into_iter()
                .find(|t| net.get_move(*t) == *movee)
                .unwrap();
            cost += net.get_cost(transition);
            marking = net.execute_transition(&marking, transition).unwrap();
        }
        (marking, cost)
    }

    #[test]
    #[ntest::timeout(10000)]
    fn search_synchronous() {
        let net = product("testfiles/a.apn", &["a"]);
        let result = search(&net, &SearchLimits::unlimited()).unwrap();

        assert_eq!(result.cost, 0.0);
        assert_eq!(result.moves.len(), 1);
        assert!(result.moves[0].is_synchronous_move());
        assert!(result.visited_states >= 2);
        assert!(result.lp_solves >= 1);
    }

    #[test]
    #[ntest::timeout(10000)]
    fn search_log_move_before_model_move() {
        let net = product("testfiles/a.apn", &["b"]);
        let result = search(&net, &SearchLimits::unlimited()).unwrap();

        assert_eq!(result.cost, 2.0);
        assert_eq!(result.moves.len(), 2);
        assert!(result.moves[0].is_log_move());
        assert!(result.moves[1].is_model_move());
    }

    #[test]
    #[ntest::timeout(10000)]
    fn search_counts_deviations_against_empty_model() {
        let net = product("testfiles/empty.apn", &["a", "b", "c", "d", "e"]);
        let result = search(&net, &SearchLimits::unlimited()).unwrap();

        assert_eq!(result.cost, 5.0);
        assert_eq!(result.moves.len(), 5);
        assert!(result.moves.iter().all(|movee| movee.is_log_move()));
    }

    #[test]
    #[ntest::timeout(10000)]
    fn search_empty_trace_on_empty_model() {
        let net = product("testfiles/empty.apn", &[]);
        let result = search(&net, &SearchLimits::unlimited()).unwrap();

        assert_eq!(result.cost, 0.0);
        assert!(result.moves.is_empty());
        assert_eq!(result.visited_states, 1);
        assert_eq!(result.queued_states, 0);
    }

    #[test]
    #[ntest::timeout(10000)]
    fn search_parallel_interleaving() {
        let net = product("testfiles/parallel.apn", &["a", "c", "b", "d"]);
        let result = search(&net, &SearchLimits::unlimited()).unwrap();

        assert_eq!(result.cost, 0.0);
        assert!(result.moves.iter().all(|movee| movee.is_synchronous_move()));
    }

    #[test]
    #[ntest::timeout(10000)]
    fn search_loop() {
        let net = product("testfiles/loop.apn", &["a", "c", "b", "a", "c", "c"]);
        let result = search(&net, &SearchLimits::unlimited()).unwrap();

        assert_eq!(result.cost, 0.0);
        assert_eq!(result.moves.len(), 6);

        //the derived estimates go wrong around the loop and are recomputed before expansion
        let net = product("testfiles/loop.apn", &["a", "b", "b"]);
        let result = search(&net, &SearchLimits::unlimited()).unwrap();
        assert_eq!(result.cost, 2.0);
        assert!(result.lp_solves > 1);
    }

    #[test]
    #[ntest::timeout(20000)]
    fn search_cost_is_monotone_along_the_alignment() {
        for (file, trace) in [
            ("testfiles/loop.apn", vec!["a", "b", "b"]),
            ("testfiles/parallel.apn", vec!["b", "c", "a", "d", "d"]),
            ("testfiles/choice-tau.apn", vec!["c", "b"]),
            ("testfiles/weighted.apn", vec!["b", "a", "b"]),
        ] {
            let net = product(file, &trace);
            let result = search(&net, &SearchLimits::unlimited()).unwrap();

            let mut marking = net.get_initial_marking().clone();
            let mut g = 0.0;
            for movee in &result.moves {
                let transition = net
                    .get_enabled_transitions(&marking)
                    .into_iter()
                    .find(|t| net.get_move(*t) == *movee)
                    .unwrap();
                let next_g = g + net.get_cost(transition);
                assert!(next_g >= g, "{} {:?}", file, trace);
                g = next_g;
                marking = net.execute_transition(&marking, transition).unwrap();
            }
            assert_eq!(g, result.cost);
        }
    }

    #[test]
    #[ntest::timeout(20000)]
    fn search_expands_each_marking_at_most_once() {
        for (file, trace) in [
            ("testfiles/loop.apn", vec!["a", "b", "b"]),
            ("testfiles/loop.apn", vec!["b", "a", "c", "a"]),
            ("testfiles/parallel.apn", vec!["x", "y", "z", "w"]),
            ("testfiles/choice-tau.apn", vec!["a", "x"]),
            ("testfiles/empty.apn", vec!["a", "b", "c"]),
        ] {
            let net = product(file, &trace);
            let result = search(&net, &SearchLimits::unlimited()).unwrap();

            assert!(
                result.visited_states <= reachable(&net).len(),
                "{} {:?}: {} visited",
                file,
                trace,
                result.visited_states
            );
        }
    }

    #[test]
    #[ntest::timeout(10000)]
    fn search_silent_transitions_are_free() {
        let net = product("testfiles/choice-tau.apn", &["a"]);
        let result = search(&net, &SearchLimits::unlimited()).unwrap();

        assert_eq!(result.cost, 0.0);
        assert_eq!(result.moves.len(), 2);
        assert!(result.moves.iter().any(|movee| movee.is_silent_move()));
    }

    #[test]
    #[ntest::timeout(10000)]
    fn search_costs_change_the_alignment() {
        //skipping c through τ costs nothing by default
        let net = product("testfiles/choice-tau.apn", &["a", "x"]);
        let result = search(&net, &SearchLimits::unlimited()).unwrap();
        assert_eq!(result.cost, 1.0);

        //with an expensive silent transition, the model move on c is cheaper
        let costs = MoveCosts::standard().with_silent_move_cost(5.0);
        let net = product_with_costs("testfiles/choice-tau.apn", &["a", "x"], &costs);
        let result = search(&net, &SearchLimits::unlimited()).unwrap();
        assert_eq!(result.cost, 2.0);
        assert!(
            result
                .moves
                .iter()
                .any(|movee| matches!(movee, Move::ModelMove(Some(_), 3)))
        );

        //an expensive log move on the first event makes the model choose b instead
        let costs = MoveCosts::standard().with_trace_costs(vec![10.0, 1.0]);
        let net = product_with_costs("testfiles/choice-tau.apn", &["b", "x"], &costs);
        let result = search(&net, &SearchLimits::unlimited()).unwrap();
        assert_eq!(result.cost, 1.0);
        assert!(result.moves[0].is_synchronous_move());
    }

    #[test]
    #[ntest::timeout(10000)]
    fn search_state_limit() {
        let net = product("testfiles/parallel.apn", &["x", "y", "z", "w"]);
        let result = search(&net, &SearchLimits::with_max_visited_states(2));

        assert_eq!(result, Err(AlignmentError::StateLimitReached { limit: 2 }));

        let result = search(&net, &SearchLimits::unlimited()).unwrap();
        assert_eq!(result.cost, 8.0);
    }

    #[test]
    #[ntest::timeout(10000)]
    fn search_fails_on_unreachable_final_marking() {
        let fin = "accepting Petri net\n2\n1\n0\n0\n1\n0\n";
        let model = fin.parse::<AcceptingPetriNet>().unwrap();
        let net = SynchronousProductNet::new(&[], &model, &MoveCosts::standard()).unwrap();

        //the marking equation already detects that the final marking cannot be reached
        let result = search(&net, &SearchLimits::unlimited());
        assert!(result.unwrap_err().is_internal_fault());
    }

    #[test]
    #[ntest::timeout(20000)]
    fn search_is_optimal() {
        for (file, trace) in [
            ("testfiles/a.apn", vec!["a", "a"]),
            ("testfiles/choice-tau.apn", vec!["c", "b"]),
            ("testfiles/parallel.apn", vec!["a", "d", "b"]),
            ("testfiles/parallel.apn", vec!["b", "c", "a", "d", "d"]),
            ("testfiles/loop.apn", vec!["b", "a", "c", "a"]),
            ("testfiles/weighted.apn", vec!["b", "a", "b"]),
        ] {
            let net = product(file, &trace);
            let result = search(&net, &SearchLimits::unlimited()).unwrap();
            let optimum = brute_force(&net, net.get_initial_marking()).unwrap();

            assert_eq!(result.cost, optimum, "{} {:?}", file, trace);

            let (marking, cost) = replay(&net, &result.moves);
            assert_eq!(&marking, net.get_final_marking());
            assert_eq!(cost, result.cost);
        }
    }

    #[test]
    #[ntest::timeout(20000)]
    fn exact_heuristic_is_admissible() {
        for (file, trace) in [
            ("testfiles/choice-tau.apn", vec!["a", "b"]),
            ("testfiles/parallel.apn", vec!["a", "c", "d"]),
            ("testfiles/weighted.apn", vec!["a", "b", "b"]),
        ] {
            let net = product(file, &trace);
            let matrix = IncidenceMatrix::new(&net).unwrap();
            let mut equation =
                MarkingEquation::new(&matrix, net.get_costs(), net.get_final_marking()).unwrap();

            for marking in reachable(&net) {
                if let Some(remaining) = brute_force(&net, &marking) {
                    let estimate = equation.exact_heuristic(&marking).unwrap();
                    assert!(estimate.h <= remaining + 1e-6, "{} at {}", file, marking);
                }
            }
        }
    }
}
