use anyhow::{Context, Error, Result, anyhow};
use std::{
    fmt,
    io::{self, BufRead},
    str::FromStr,
};

use crate::{
    ebi_framework::{
        activity_key::{Activity, ActivityKey},
        importable::Importable,
    },
    line_reader::LineReader,
    marking::Marking,
    net::{self, Net, PlaceIndex, TransitionIndex},
};

pub const HEADER: &str = "accepting Petri net";

/// A labelled Petri net together with an initial and a final marking.
/// Transitions without a label are silent (τ).
#[derive(Clone, Debug, Default)]
pub struct AcceptingPetriNet {
    pub(crate) activity_key: ActivityKey,
    pub(crate) initial_marking: Marking,
    pub(crate) final_marking: Marking,
    pub(crate) labels: Vec<Option<Activity>>,
    pub(crate) transition2input_places: Vec<Vec<PlaceIndex>>,
    pub(crate) transition2output_places: Vec<Vec<PlaceIndex>>,
    pub(crate) transition2input_places_cardinality: Vec<Vec<u64>>,
    pub(crate) transition2output_places_cardinality: Vec<Vec<u64>>,
}

impl AcceptingPetriNet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_initial_marking(&self) -> &Marking {
        &self.initial_marking
    }

    pub fn get_final_marking(&self) -> &Marking {
        &self.final_marking
    }

    pub fn get_activity_key(&self) -> &ActivityKey {
        &self.activity_key
    }

    pub fn get_activity_key_mut(&mut self) -> &mut ActivityKey {
        &mut self.activity_key
    }

    pub fn is_transition_silent(&self, transition: TransitionIndex) -> bool {
        self.labels[transition].is_none()
    }

    pub fn get_transition_label(&self, transition: TransitionIndex) -> Option<Activity> {
        self.labels[transition]
    }

    pub fn add_place(&mut self) -> PlaceIndex {
        let place = self.get_number_of_places();
        self.initial_marking.add_place();
        self.final_marking.add_place();
        place
    }

    pub fn add_transition(&mut self, label: Option<Activity>) -> TransitionIndex {
        self.labels.push(label);
        self.transition2input_places.push(vec![]);
        self.transition2input_places_cardinality.push(vec![]);
        self.transition2output_places.push(vec![]);
        self.transition2output_places_cardinality.push(vec![]);
        self.get_number_of_transitions() - 1
    }

    pub fn add_transition_place_arc(
        &mut self,
        from_transition: TransitionIndex,
        to_place: PlaceIndex,
        cardinality: u64,
    ) -> Result<()> {
        self.check_arc(from_transition, to_place, cardinality)?;
        net::add_arc(
            &mut self.transition2output_places[from_transition],
            &mut self.transition2output_places_cardinality[from_transition],
            to_place,
            cardinality,
        );
        Ok(())
    }

    pub fn add_place_transition_arc(
        &mut self,
        from_place: PlaceIndex,
        to_transition: TransitionIndex,
        cardinality: u64,
    ) -> Result<()> {
        self.check_arc(to_transition, from_place, cardinality)?;
        net::add_arc(
            &mut self.transition2input_places[to_transition],
            &mut self.transition2input_places_cardinality[to_transition],
            from_place,
            cardinality,
        );
        Ok(())
    }

    fn check_arc(
        &self,
        transition: TransitionIndex,
        place: PlaceIndex,
        cardinality: u64,
    ) -> Result<()> {
        if transition >= self.get_number_of_transitions() {
            Err(anyhow!(
                "non-existing transition {} referenced, while there are {}",
                transition,
                self.get_number_of_transitions()
            ))
        } else if place >= self.get_number_of_places() {
            Err(anyhow!(
                "non-existing place {} referenced, while there are {}",
                place,
                self.get_number_of_places()
            ))
        } else if cardinality == 0 {
            Err(anyhow!("arcs must have a positive weight"))
        } else {
            Ok(())
        }
    }
}

impl Net for AcceptingPetriNet {
    fn get_number_of_places(&self) -> usize {
        self.initial_marking.get_number_of_places()
    }

    fn get_number_of_transitions(&self) -> usize {
        self.labels.len()
    }

    fn get_input_places(&self, transition: TransitionIndex) -> &[PlaceIndex] {
        &self.transition2input_places[transition]
    }

    fn get_input_cardinalities(&self, transition: TransitionIndex) -> &[u64] {
        &self.transition2input_places_cardinality[transition]
    }

    fn get_output_places(&self, transition: TransitionIndex) -> &[PlaceIndex] {
        &self.transition2output_places[transition]
    }

    fn get_output_cardinalities(&self, transition: TransitionIndex) -> &[u64] {
        &self.transition2output_places_cardinality[transition]
    }
}

impl fmt::Display for AcceptingPetriNet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", HEADER)?;
        writeln!(f, "# number of places\n{}", self.get_number_of_places())?;

        writeln!(f, "# initial marking")?;
        for tokens in self.initial_marking.get_place2token() {
            writeln!(f, "{}", tokens)?;
        }

        writeln!(f, "# final marking")?;
        for tokens in self.final_marking.get_place2token() {
            writeln!(f, "{}", tokens)?;
        }

        writeln!(
            f,
            "# number of transitions\n{}",
            self.get_number_of_transitions()
        )?;

        for transition in 0..self.get_number_of_transitions() {
            writeln!(f, "# transition {}", transition)?;

            if let Some(activity) = self.get_transition_label(transition) {
                writeln!(
                    f,
                    "label {}",
                    self.activity_key.get_activity_label(&activity)
                )?;
            } else {
                writeln!(f, "silent")?;
            }

            let inputs: u64 = self.transition2input_places_cardinality[transition]
                .iter()
                .sum();
            writeln!(f, "# number of input places\n{}", inputs)?;
            for (pos, place) in self.transition2input_places[transition].iter().enumerate() {
                for _ in 0..self.transition2input_places_cardinality[transition][pos] {
                    writeln!(f, "{}", place)?;
                }
            }

            let outputs: u64 = self.transition2output_places_cardinality[transition]
                .iter()
                .sum();
            writeln!(f, "# number of output places\n{}", outputs)?;
            for (pos, place) in self.transition2output_places[transition].iter().enumerate() {
                for _ in 0..self.transition2output_places_cardinality[transition][pos] {
                    writeln!(f, "{}", place)?;
                }
            }
        }

        write!(f, "")
    }
}

impl FromStr for AcceptingPetriNet {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut reader = io::Cursor::new(s);
        Self::import(&mut reader)
    }
}

impl Importable for AcceptingPetriNet {
    fn import(reader: &mut dyn BufRead) -> Result<Self> {
        let mut lreader = LineReader::new(reader);

        let head = lreader
            .next_line_string()
            .with_context(|| format!("failed to read header, which should be {}", HEADER))?;
        if head != HEADER {
            return Err(anyhow!(
                "first line should be exactly `{}`, but found `{}` on line `{}`",
                HEADER,
                lreader.get_last_line(),
                lreader.get_last_line_number()
            ));
        }

        let mut result = Self::new();

        let number_of_places = lreader
            .next_line_index()
            .context("failed to read number of places")?;
        for _ in 0..number_of_places {
            result.add_place();
        }

        for place in 0..number_of_places {
            let tokens = lreader
                .next_line_natural()
                .with_context(|| format!("failed to read initial marking of place {}", place))?;
            result.initial_marking.increase(place, tokens)?;
        }

        for place in 0..number_of_places {
            let tokens = lreader
                .next_line_natural()
                .with_context(|| format!("failed to read final marking of place {}", place))?;
            result.final_marking.increase(place, tokens)?;
        }

        let number_of_transitions = lreader
            .next_line_index()
            .context("failed to read number of transitions")?;

        for transition in 0..number_of_transitions {
            let label_line = lreader
                .next_line_string()
                .with_context(|| format!("failed to read label of transition {}", transition))?;

            let label_line = label_line.trim_start();
            let label = if let Some(label) = label_line.strip_prefix("label ") {
                Some(result.activity_key.process_activity(label))
            } else if label_line.trim_end() == "silent" {
                None
            } else {
                return Err(anyhow!(
                    "transition {} should be either `silent` or `label <activity>` at line {}; found `{}`",
                    transition,
                    lreader.get_last_line_number(),
                    lreader.get_last_line()
                ));
            };
            result.add_transition(label);

            //read input places
            let number_of_input_places = lreader.next_line_index().with_context(|| {
                format!(
                    "failed to read number of input places of transition {}",
                    transition
                )
            })?;
            for p in 0..number_of_input_places {
                let place = lreader.next_line_index().with_context(|| {
                    format!(
                        "failed to read input place number {} of transition {}",
                        p, transition
                    )
                })?;
                result
                    .add_place_transition_arc(place, transition, 1)
                    .with_context(|| {
                        format!(
                            "input place number {} of transition {} at line {}",
                            p,
                            transition,
                            lreader.get_last_line_number()
                        )
                    })?;
            }

            //read output places
            let number_of_output_places = lreader.next_line_index().with_context(|| {
                format!(
                    "failed to read number of output places of transition {}",
                    transition
                )
            })?;
            for p in 0..number_of_output_places {
                let place = lreader.next_line_index().with_context(|| {
                    format!(
                        "failed to read output place number {} of transition {}",
                        p, transition
                    )
                })?;
                result
                    .add_transition_place_arc(transition, place, 1)
                    .with_context(|| {
                        format!(
                            "output place number {} of transition {} at line {}",
                            p,
                            transition,
                            lreader.get_last_line_number()
                        )
                    })?;
            }
        }

        Ok(result)
    }
}
