use crate::{ebi_alignments::alignment_error::AlignmentError, net::TransitionIndex};

pub const DEFAULT_LOG_MOVE_COST: f64 = 1.0;
pub const DEFAULT_MODEL_MOVE_COST: f64 = 1.0;
pub const DEFAULT_SILENT_MOVE_COST: f64 = 0.0;
pub const DEFAULT_SYNCHRONOUS_MOVE_COST: f64 = 0.0;

/// The prices of the three kinds of moves. Per-event and per-transition vectors, when present,
/// take precedence over the uniform costs.
///
/// A value of this type is immutable once handed to the product construction; the `with_` methods
/// return modified copies.
#[derive(Clone, Debug, PartialEq)]
pub struct MoveCosts {
    log_move_cost: f64,
    model_move_cost: f64,
    silent_move_cost: f64,
    synchronous_move_cost: f64,
    trace_costs: Option<Vec<f64>>,       //for each event in the trace
    model_costs: Option<Vec<f64>>,       //for each transition in the model
    synchronous_costs: Option<Vec<f64>>, //for each transition in the model
}

impl Default for MoveCosts {
    fn default() -> Self {
        Self {
            log_move_cost: DEFAULT_LOG_MOVE_COST,
            model_move_cost: DEFAULT_MODEL_MOVE_COST,
            silent_move_cost: DEFAULT_SILENT_MOVE_COST,
            synchronous_move_cost: DEFAULT_SYNCHRONOUS_MOVE_COST,
            trace_costs: None,
            model_costs: None,
            synchronous_costs: None,
        }
    }
}

impl MoveCosts {
    /// Synchronous moves and silent model moves are free; every other move costs 1.
    pub fn standard() -> Self {
        Self::default()
    }

    pub fn with_log_move_cost(mut self, cost: f64) -> Self {
        self.log_move_cost = cost;
        self
    }

    pub fn with_model_move_cost(mut self, cost: f64) -> Self {
        self.model_move_cost = cost;
        self
    }

    pub fn with_silent_move_cost(mut self, cost: f64) -> Self {
        self.silent_move_cost = cost;
        self
    }

    pub fn with_synchronous_move_cost(mut self, cost: f64) -> Self {
        self.synchronous_move_cost = cost;
        self
    }

    pub fn with_trace_costs(mut self, costs: Vec<f64>) -> Self {
        self.trace_costs = Some(costs);
        self
    }

    pub fn with_model_costs(mut self, costs: Vec<f64>) -> Self {
        self.model_costs = Some(costs);
        self
    }

    pub fn with_synchronous_costs(mut self, costs: Vec<f64>) -> Self {
        self.synchronous_costs = Some(costs);
        self
    }

    pub fn get_log_move_cost(&self, event: usize) -> f64 {
        match &self.trace_costs {
            Some(costs) => costs[event],
            None => self.log_move_cost,
        }
    }

    pub fn get_model_move_cost(&self, transition: TransitionIndex, silent: bool) -> f64 {
        match &self.model_costs {
            Some(costs) => costs[transition],
            None if silent => self.silent_move_cost,
            None => self.model_move_cost,
        }
    }

    pub fn get_synchronous_move_cost(&self, transition: TransitionIndex) -> f64 {
        match &self.synchronous_costs {
            Some(costs) => costs[transition],
            None => self.synchronous_move_cost,
        }
    }

    /// Checks that all costs are finite and non-negative, and that the vectors fit the trace and the model.
    pub fn validate(
        &self,
        trace_length: usize,
        number_of_model_transitions: usize,
    ) -> Result<(), AlignmentError> {
        for (name, cost) in [
            ("log move", self.log_move_cost),
            ("model move", self.model_move_cost),
            ("silent move", self.silent_move_cost),
            ("synchronous move", self.synchronous_move_cost),
        ] {
            check_cost(name, cost)?;
        }

        for (name, costs, expected) in [
            ("trace", &self.trace_costs, trace_length),
            ("model", &self.model_costs, number_of_model_transitions),
            ("synchronous", &self.synchronous_costs, number_of_model_transitions),
        ] {
            if let Some(costs) = costs {
                if costs.len() != expected {
                    return Err(AlignmentError::InvalidCosts(format!(
                        "{} costs have {} entries, while {} are needed",
                        name,
                        costs.len(),
                        expected
                    )));
                }
                for cost in costs {
                    check_cost(name, *cost)?;
                }
            }
        }

        Ok(())
    }
}

fn check_cost(name: &str, cost: f64) -> Result<(), AlignmentError> {
    if cost.is_finite() && cost >= 0.0 {
        Ok(())
    } else {
        Err(AlignmentError::InvalidCosts(format!(
            "{} cost must be finite and non-negative, found {}",
            name, cost
        )))
    }
}

/// Bounds on the effort of a single search. Reaching a bound means that no alignment was found.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchLimits {
    pub max_visited_states: Option<usize>,
}

impl SearchLimits {
    pub fn unlimited() -> Self {
        Self::default()
    }

    pub fn with_max_visited_states(max_visited_states: usize) -> Self {
        Self {
            max_visited_states: Some(max_visited_states),
        }
    }
}
