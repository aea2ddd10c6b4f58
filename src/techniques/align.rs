use crate::{
    ebi_alignments::{
        alignment_error::AlignmentError,
        cross_product_net::SynchronousProductNet,
        move_costs::{MoveCosts, SearchLimits},
        state_equation_astar,
    },
    ebi_framework::activity_key::{Activity, ActivityKeyTranslator},
    ebi_objects::{
        accepting_petri_net::AcceptingPetriNet,
        alignments::{AlignmentResult, Alignments},
        finite_language::FiniteLanguage,
    },
};

pub trait Align {
    /// Aligns every trace of the language, one after the other. A trace that cannot be aligned
    /// keeps its error in the result; the other traces are not affected.
    fn align_language(
        &mut self,
        language: &FiniteLanguage,
        costs: &MoveCosts,
        limits: &SearchLimits,
    ) -> Alignments;

    /// The trace and the model must use the same activity key, or the trace must have been translated.
    fn align_trace(
        &self,
        trace: &[Activity],
        costs: &MoveCosts,
        limits: &SearchLimits,
    ) -> Result<AlignmentResult, AlignmentError>;

    /// Aligns a trace given as activity labels; unknown labels are added to the activity key of the model.
    fn align_trace_labels<S: AsRef<str>>(
        &mut self,
        trace: &[S],
        costs: &MoveCosts,
        limits: &SearchLimits,
    ) -> Result<AlignmentResult, AlignmentError>;
}

impl Align for AcceptingPetriNet {
    fn align_language(
        &mut self,
        language: &FiniteLanguage,
        costs: &MoveCosts,
        limits: &SearchLimits,
    ) -> Alignments {
        let translator =
            ActivityKeyTranslator::new(language.get_activity_key(), self.get_activity_key_mut());

        let mut result = Alignments::new(self.get_activity_key().clone());
        for (i, trace) in language.iter().enumerate() {
            let trace_translated = translator.translate_trace(trace);
            let alignment = self.align_trace(&trace_translated, costs, limits);

            match &alignment {
                Ok(alignment) => log::info!(
                    "trace {} aligned with cost {} after visiting {} states",
                    i,
                    alignment.cost,
                    alignment.visited_states
                ),
                Err(err) if err.is_internal_fault() => {
                    log::warn!("trace {} could not be aligned; the product net is malformed: {}", i, err)
                }
                Err(err) => log::warn!("trace {} could not be aligned: {}", i, err),
            }

            result.push(alignment);
        }

        result
    }

    fn align_trace(
        &self,
        trace: &[Activity],
        costs: &MoveCosts,
        limits: &SearchLimits,
    ) -> Result<AlignmentResult, AlignmentError> {
        let product = SynchronousProductNet::new(trace, self, costs)?;
        state_equation_astar::search(&product, limits)
    }

    fn align_trace_labels<S: AsRef<str>>(
        &mut self,
        trace: &[S],
        costs: &MoveCosts,
        limits: &SearchLimits,
    ) -> Result<AlignmentResult, AlignmentError> {
        let trace = self.get_activity_key_mut().process_trace(trace);
        self.align_trace(&trace, costs, limits)
    }
}
