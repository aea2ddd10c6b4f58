use anyhow::{Context, Error, Result, anyhow};
use rustc_hash::FxHashSet;
use std::{
    fmt::Display,
    io::{self, BufRead},
    str::FromStr,
};

use crate::{
    ebi_framework::{
        activity_key::{Activity, ActivityKey},
        importable::Importable,
    },
    line_reader::LineReader,
};

pub const HEADER: &str = "finite language";

/// A set of traces, kept in the order in which they were read.
#[derive(Clone, Debug, Default)]
pub struct FiniteLanguage {
    activity_key: ActivityKey,
    traces: Vec<Vec<Activity>>,
}

impl FiniteLanguage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a trace; returns false if the trace was already in the language.
    pub fn push_string<S: AsRef<str>>(&mut self, trace: &[S]) -> bool {
        let trace = self.activity_key.process_trace(trace);
        if self.traces.contains(&trace) {
            return false;
        }
        self.traces.push(trace);
        true
    }

    pub fn len(&self) -> usize {
        self.traces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.traces.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Vec<Activity>> {
        self.traces.iter()
    }

    pub fn get_activity_key(&self) -> &ActivityKey {
        &self.activity_key
    }

    pub fn get_activity_key_mut(&mut self) -> &mut ActivityKey {
        &mut self.activity_key
    }
}

impl Display for FiniteLanguage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", HEADER)?;
        writeln!(f, "# number of traces\n{}", self.len())?;

        for (pos, trace) in self.iter().enumerate() {
            writeln!(f, "# trace {}", pos)?;

            writeln!(f, "# number of events\n{}", trace.len())?;
            for activity in trace {
                writeln!(f, "{}", self.activity_key.get_activity_label(activity))?;
            }
        }

        write!(f, "")
    }
}

impl FromStr for FiniteLanguage {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut reader = io::Cursor::new(s);
        Self::import(&mut reader)
    }
}

impl Importable for FiniteLanguage {
    fn import(reader: &mut dyn BufRead) -> Result<Self> {
        let mut lreader = LineReader::new(reader);

        let head = lreader
            .next_line_string()
            .with_context(|| format!("failed to read header, which should be `{}`", HEADER))?;
        if head != HEADER {
            return Err(anyhow!(
                "first line should be exactly `{}`, but found `{}`",
                HEADER,
                head
            ));
        }

        let number_of_traces = lreader
            .next_line_index()
            .context("failed to read number of traces")?;

        let mut seen = FxHashSet::default();
        let mut result = Self::new();
        for trace_i in 0..number_of_traces {
            let number_of_events = lreader.next_line_index().with_context(|| {
                format!(
                    "failed to read number of events for trace {} at line {}",
                    trace_i,
                    lreader.get_last_line_number()
                )
            })?;

            let mut trace = Vec::with_capacity(number_of_events);
            for event_i in 0..number_of_events {
                let event = lreader.next_line_string().with_context(|| {
                    format!(
                        "failed to read event {} of trace {} at line {}",
                        event_i,
                        trace_i,
                        lreader.get_last_line_number()
                    )
                })?;
                trace.push(event);
            }

            let trace = result.activity_key.process_trace(&trace);

            if !seen.insert(trace.clone()) {
                return Err(anyhow!(
                    "trace {} ending at line {} appears twice in language",
                    trace_i,
                    lreader.get_last_line_number()
                ));
            }
            result.traces.push(trace);
        }

        Ok(result)
    }
}
