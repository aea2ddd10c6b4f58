use microlp::{ComparisonOp, OptimizationDirection, Problem};

use crate::{
    ebi_alignments::{alignment_error::AlignmentError, incidence_matrix::IncidenceMatrix},
    marking::Marking,
    net::TransitionIndex,
};

/// Coordinates of a solution vector below this value make a derived estimate untrustworthy.
pub const TRUST_TOLERANCE: f64 = -0.001;

/// Objective values this close to an integer are snapped to it.
const ROUNDING_TOLERANCE: f64 = 1e-9;

/// An estimate of the remaining cost from a marking, with the solution vector it was read from.
#[derive(Clone, Debug, PartialEq)]
pub struct HeuristicEstimate {
    pub h: f64,
    pub x: Vec<f64>,
    pub trusted: bool,
}

/// Estimates the remaining cost to the final marking by the LP relaxation of the marking equation:
/// minimise `cost · x` subject to `x >= 0` and `A · x = final - marking`.
pub struct MarkingEquation<'a> {
    incidence_matrix: &'a IncidenceMatrix,
    costs: &'a [f64],
    final_marking: Vec<i64>,
    lp_solves: usize,
}

impl<'a> MarkingEquation<'a> {
    pub fn new(
        incidence_matrix: &'a IncidenceMatrix,
        costs: &'a [f64],
        final_marking: &Marking,
    ) -> Result<Self, AlignmentError> {
        Ok(Self {
            incidence_matrix,
            costs,
            final_marking: incidence_matrix.encode_marking(final_marking)?,
            lp_solves: 0,
        })
    }

    /// The number of exact heuristics computed so far.
    pub fn get_lp_solves(&self) -> usize {
        self.lp_solves
    }

    /// Solves the marking equation from `marking`. An exact estimate is always trusted.
    pub fn exact_heuristic(
        &mut self,
        marking: &Marking,
    ) -> Result<HeuristicEstimate, AlignmentError> {
        self.lp_solves += 1;

        let number_of_transitions = self.incidence_matrix.get_number_of_transitions();
        let current = self.incidence_matrix.encode_marking(marking)?;

        let mut problem = Problem::new(OptimizationDirection::Minimize);
        let variables = self
            .costs
            .iter()
            .map(|cost| problem.add_var(*cost, (0.0, f64::INFINITY)))
            .collect::<Vec<_>>();

        let mut constraints = 0;
        for place in 0..self.incidence_matrix.get_number_of_places() {
            let rhs = self.final_marking[place] - current[place];
            let row = self
                .incidence_matrix
                .row(place)
                .iter()
                .enumerate()
                .filter(|(_, a)| **a != 0)
                .map(|(transition, a)| (variables[transition], *a as f64))
                .collect::<Vec<_>>();

            if row.is_empty() {
                //no transition touches this place, so its tokens cannot change
                if rhs != 0 {
                    return Err(AlignmentError::InfeasibleMarkingEquation {
                        marking: marking.clone(),
                        reason: format!(
                            "place {} cannot change, but needs {} tokens more",
                            place, rhs
                        ),
                    });
                }
                continue;
            }

            problem.add_constraint(row, ComparisonOp::Eq, rhs as f64);
            constraints += 1;
        }

        if constraints == 0 {
            //all costs are non-negative, so not firing anything is optimal
            return Ok(HeuristicEstimate {
                h: 0.0,
                x: vec![0.0; number_of_transitions],
                trusted: true,
            });
        }

        let solution = problem
            .solve()
            .map_err(|err| AlignmentError::InfeasibleMarkingEquation {
                marking: marking.clone(),
                reason: err.to_string(),
            })?;

        let x = variables
            .iter()
            .map(|variable| solution[*variable])
            .collect::<Vec<_>>();
        let h = clean(solution.objective());

        log::trace!("marking equation from {}: h = {}", marking, h);

        Ok(HeuristicEstimate {
            h,
            x,
            trusted: true,
        })
    }

    /// Derives the estimate of a child from the estimate of its parent after firing `transition`,
    /// without solving: the solution vector loses one firing of `transition`. The result is trusted
    /// only if the vector stays non-negative.
    pub fn derive_heuristic(
        &self,
        parent: &HeuristicEstimate,
        transition: TransitionIndex,
    ) -> HeuristicEstimate {
        let mut x = parent.x.clone();
        x[transition] -= 1.0;
        let h = (parent.h - self.costs[transition]).max(0.0);
        let trusted = is_trusted(&x);
        HeuristicEstimate { h, x, trusted }
    }
}

pub fn is_trusted(x: &[f64]) -> bool {
    x.iter().all(|value| *value >= TRUST_TOLERANCE)
}

fn clean(objective: f64) -> f64 {
    let rounded = objective.round();
    let value = if (objective - rounded).abs() < ROUNDING_TOLERANCE {
        rounded
    } else {
        objective
    };
    value.max(0.0)
}
