use anyhow::Result;
use serde::Serialize;
use std::fmt::Display;

use crate::{
    ebi_alignments::alignment_error::AlignmentError,
    ebi_framework::{
        activity_key::{Activity, ActivityKey},
        exportable::Exportable,
    },
    net::TransitionIndex,
};

pub const HEADER: &str = "alignments";

/// Rendering of the absent side of a log or model move.
pub const SKIP: &str = "⋙";

/// Rendering of the label of a silent transition.
pub const TAU: &str = "τ";

/// A step of an alignment. Transition indices refer to the model net.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Move {
    LogMove(Activity),
    /// A model move on a silent transition carries no activity.
    ModelMove(Option<Activity>, TransitionIndex),
    SynchronousMove(Activity, TransitionIndex),
}

impl Move {
    pub fn is_log_move(&self) -> bool {
        matches!(self, Move::LogMove(_))
    }

    pub fn is_model_move(&self) -> bool {
        matches!(self, Move::ModelMove(_, _))
    }

    pub fn is_silent_move(&self) -> bool {
        matches!(self, Move::ModelMove(None, _))
    }

    pub fn is_synchronous_move(&self) -> bool {
        matches!(self, Move::SynchronousMove(_, _))
    }

    pub fn get_model_transition(&self) -> Option<TransitionIndex> {
        match self {
            Move::LogMove(_) => None,
            Move::ModelMove(_, transition) | Move::SynchronousMove(_, transition) => {
                Some(*transition)
            }
        }
    }

    /// The (trace side, model side) rendering of the move, e.g. `(a, ⋙)` or `(⋙, τ)`.
    pub fn to_label_pair(&self, activity_key: &ActivityKey) -> (String, String) {
        match self {
            Move::LogMove(activity) => (
                activity_key.get_activity_label(activity).to_string(),
                SKIP.to_string(),
            ),
            Move::ModelMove(Some(activity), _) => (
                SKIP.to_string(),
                activity_key.get_activity_label(activity).to_string(),
            ),
            Move::ModelMove(None, _) => (SKIP.to_string(), TAU.to_string()),
            Move::SynchronousMove(activity, _) => {
                let label = activity_key.get_activity_label(activity).to_string();
                (label.clone(), label)
            }
        }
    }
}

/// An optimal alignment of one trace, together with the effort it took to find it.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignmentResult {
    pub moves: Vec<Move>,
    pub cost: f64,
    pub visited_states: usize,
    pub queued_states: usize,
    pub traversed_arcs: usize,
    pub lp_solves: usize,
}

impl AlignmentResult {
    pub fn get_number_of_deviations(&self) -> usize {
        self.moves
            .iter()
            .filter(|movee| movee.is_log_move() || (movee.is_model_move() && !movee.is_silent_move()))
            .count()
    }

    pub fn to_label_pairs(&self, activity_key: &ActivityKey) -> Vec<(String, String)> {
        self.moves
            .iter()
            .map(|movee| movee.to_label_pair(activity_key))
            .collect()
    }
}

/// The outcomes of aligning a sequence of traces; a trace that could not be aligned keeps its error.
#[derive(Debug, Clone)]
pub struct Alignments {
    activity_key: ActivityKey,
    alignments: Vec<Result<AlignmentResult, AlignmentError>>,
}

impl Alignments {
    pub fn new(activity_key: ActivityKey) -> Self {
        Self {
            activity_key,
            alignments: vec![],
        }
    }

    pub fn push(&mut self, alignment: Result<AlignmentResult, AlignmentError>) {
        self.alignments.push(alignment);
    }

    pub fn len(&self) -> usize {
        self.alignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alignments.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Result<AlignmentResult, AlignmentError>> {
        self.alignments.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Result<AlignmentResult, AlignmentError>> {
        self.alignments.iter()
    }

    pub fn get_number_of_failures(&self) -> usize {
        self.alignments.iter().filter(|a| a.is_err()).count()
    }

    pub fn get_activity_key(&self) -> &ActivityKey {
        &self.activity_key
    }

    pub fn get_activity_key_mut(&mut self) -> &mut ActivityKey {
        &mut self.activity_key
    }

    pub fn export_json(&self, f: &mut dyn std::io::Write) -> Result<()> {
        let json = self
            .alignments
            .iter()
            .map(|alignment| JsonAlignment::new(alignment, &self.activity_key))
            .collect::<Vec<_>>();
        serde_json::to_writer_pretty(&mut *f, &json)?;
        writeln!(f)?;
        Ok(())
    }
}

impl Exportable for Alignments {
    fn export(&self, f: &mut dyn std::io::Write) -> Result<()> {
        Ok(write!(f, "{}", self)?)
    }
}

impl Display for Alignments {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", HEADER)?;

        writeln!(f, "# number of alignments\n{}", self.alignments.len())?;

        for (i, alignment) in self.alignments.iter().enumerate() {
            writeln!(f, "# alignment {}", i)?;

            let result = match alignment {
                Ok(result) => result,
                Err(err) => {
                    writeln!(f, "error {}", err)?;
                    continue;
                }
            };

            writeln!(f, "# cost\n{}", result.cost)?;
            writeln!(
                f,
                "# visited states {}, queued states {}, traversed arcs {}, linear programs {}",
                result.visited_states, result.queued_states, result.traversed_arcs, result.lp_solves
            )?;
            writeln!(f, "# number of moves\n{}", result.moves.len())?;

            for (j, movee) in result.moves.iter().enumerate() {
                writeln!(f, "# move {}", j)?;

                match movee {
                    Move::LogMove(activity) => {
                        writeln!(f, "log move")?;
                        writeln!(f, "label {}", self.activity_key.get_activity_label(activity))?;
                    }
                    Move::ModelMove(Some(activity), transition) => {
                        writeln!(f, "model move")?;
                        writeln!(f, "label {}", self.activity_key.get_activity_label(activity))?;
                        writeln!(f, "{}", transition)?;
                    }
                    Move::ModelMove(None, transition) => {
                        writeln!(f, "silent move")?;
                        writeln!(f, "{}", transition)?;
                    }
                    Move::SynchronousMove(activity, transition) => {
                        writeln!(f, "synchronous move")?;
                        writeln!(f, "label {}", self.activity_key.get_activity_label(activity))?;
                        writeln!(f, "{}", transition)?;
                    }
                };
            }
        }

        write!(f, "")
    }
}

#[derive(Serialize)]
struct JsonAlignment {
    #[serde(skip_serializing_if = "Option::is_none")]
    cost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    visited_states: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    queued_states: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    traversed_arcs: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    lp_solves: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    moves: Option<Vec<JsonMove>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Serialize)]
struct JsonMove {
    #[serde(rename = "type")]
    kind: &'static str,
    trace: String,
    model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    transition: Option<TransitionIndex>,
}

impl JsonAlignment {
    fn new(
        alignment: &Result<AlignmentResult, AlignmentError>,
        activity_key: &ActivityKey,
    ) -> Self {
        match alignment {
            Ok(result) => Self {
                cost: Some(result.cost),
                visited_states: Some(result.visited_states),
                queued_states: Some(result.queued_states),
                traversed_arcs: Some(result.traversed_arcs),
                lp_solves: Some(result.lp_solves),
                moves: Some(
                    result
                        .moves
                        .iter()
                        .map(|movee| {
                            let (trace, model) = movee.to_label_pair(activity_key);
                            JsonMove {
                                kind: match movee {
                                    Move::LogMove(_) => "log move",
                                    Move::ModelMove(Some(_), _) => "model move",
                                    Move::ModelMove(None, _) => "silent move",
                                    Move::SynchronousMove(_, _) => "synchronous move",
                                },
                                trace,
                                model,
                                transition: movee.get_model_transition(),
                            }
                        })
                        .collect(),
                ),
                error: None,
            },
            Err(err) => Self {
                cost: None,
                visited_states: None,
                queued_states: None,
                traversed_arcs: None,
                lp_solves: None,
                moves: None,
                error: Some(err.to_string()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        ebi_alignments::alignment_error::AlignmentError,
        ebi_framework::{activity_key::ActivityKey, exportable::Exportable},
    };

    use super::{AlignmentResult, Alignments, Move};

    fn example() -> Alignments {
        let mut activity_key = ActivityKey::new();
        let a = activity_key.process_activity("a");
        let b = activity_key.process_activity("b");

        let mut alignments = Alignments::new(activity_key);
        alignments.push(Ok(AlignmentResult {
            moves: vec![
                Move::LogMove(b),
                Move::ModelMove(Some(a), 0),
                Move::ModelMove(None, 1),
                Move::SynchronousMove(a, 2),
            ],
            cost: 2.0,
            visited_states: 4,
            queued_states: 6,
            traversed_arcs: 7,
            lp_solves: 1,
        }));
        alignments.push(Err(AlignmentError::StateLimitReached { limit: 10 }));
        alignments
    }

    #[test]
    fn label_pairs() {
        let alignments = example();
        let result = alignments.get(0).unwrap().as_ref().unwrap();
        assert_eq!(
            result.to_label_pairs(alignments.get_activity_key()),
            vec![
                ("b".to_string(), "⋙".to_string()),
                ("⋙".to_string(), "a".to_string()),
                ("⋙".to_string(), "τ".to_string()),
                ("a".to_string(), "a".to_string())
            ]
        );
        assert_eq!(result.get_number_of_deviations(), 2);
    }

    #[test]
    fn text_export() {
        let alignments = example();
        let mut out = vec![];
        alignments.export(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.starts_with("alignments\n# number of alignments\n2\n"));
        assert!(text.contains("log move\nlabel b\n"));
        assert!(text.contains("model move\nlabel a\n0\n"));
        assert!(text.contains("silent move\n1\n"));
        assert!(text.contains("synchronous move\nlabel a\n2\n"));
        assert!(text.contains("error no alignment found within the limit of 10 visited states"));
        assert_eq!(alignments.get_number_of_failures(), 1);
    }

    #[test]
    fn json_export() {
        let alignments = example();
        let mut out = vec![];
        alignments.export_json(&mut out).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&out).unwrap();

        assert_eq!(json[0]["cost"], 2.0);
        assert_eq!(json[0]["moves"][0]["type"], "log move");
        assert_eq!(json[0]["moves"][0]["model"], "⋙");
        assert_eq!(json[0]["moves"][2]["model"], "τ");
        assert_eq!(json[0]["moves"][3]["transition"], 2);
        assert!(json[0]["moves"][0].get("transition").is_none());
        assert!(json[1]["error"].is_string());
        assert!(json[1].get("cost").is_none());
    }
}
