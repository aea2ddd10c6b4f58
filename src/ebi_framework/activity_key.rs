use std::{
    borrow::Borrow,
    fmt::{Debug, Display},
    hash::Hash,
};

use rustc_hash::FxHashMap;

#[derive(Clone, Copy)]
pub struct Activity {
    id: usize,
}

impl PartialEq for Activity {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Activity {}

impl Hash for Activity {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl Display for Activity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ac{}", self.id)
    }
}

impl Debug for Activity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ac{}", self.id)
    }
}

impl PartialOrd for Activity {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Activity {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.id.cmp(&other.id)
    }
}

/// Interns activity labels, so that traces and models can compare activities by index.
/// A trace and a model must share (or be translated to) one key before they are aligned.
#[derive(Clone, Debug, Default)]
pub struct ActivityKey {
    name2activity: FxHashMap<String, Activity>,
    activity2name: Vec<String>,
}

impl ActivityKey {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_number_of_activities(&self) -> usize {
        self.activity2name.len()
    }

    pub fn process_activity(&mut self, activity: &str) -> Activity {
        match self.name2activity.get(activity) {
            Some(index) => *index,
            None => {
                let result = Activity {
                    id: self.activity2name.len(),
                };
                self.activity2name.push(activity.to_string());
                self.name2activity.insert(activity.to_string(), result);
                result
            }
        }
    }

    pub fn process_trace<S: AsRef<str>>(&mut self, trace: &[S]) -> Vec<Activity> {
        trace
            .iter()
            .map(|activity| self.process_activity(activity.as_ref()))
            .collect()
    }

    pub fn get_activity_label(&self, activity: &Activity) -> &str {
        &self.activity2name[activity.id]
    }

    pub fn get_activity_by_label(&self, label: &str) -> Option<Activity> {
        self.name2activity.get(label).copied()
    }

    pub fn get_id_from_activity(&self, activity: impl Borrow<Activity>) -> usize {
        activity.borrow().id
    }

    pub fn deprocess_trace(&self, trace: &[Activity]) -> Vec<&str> {
        trace
            .iter()
            .map(|activity| self.get_activity_label(activity))
            .collect()
    }
}

impl Display for ActivityKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, label) in self.activity2name.iter().enumerate() {
            write!(f, "ac{}: {}, ", i, label)?;
        }
        write!(f, "")
    }
}

/// Maps the activities of one key onto another key, adding missing labels to the target.
pub struct ActivityKeyTranslator {
    from2to: Vec<Activity>,
}

impl ActivityKeyTranslator {
    pub fn new(from: &ActivityKey, to: &mut ActivityKey) -> Self {
        let from2to = from
            .activity2name
            .iter()
            .map(|label_from| to.process_activity(label_from))
            .collect();

        Self { from2to }
    }

    pub fn translate_activity(&self, activity: &Activity) -> Activity {
        self.from2to[activity.id]
    }

    pub fn translate_trace(&self, trace: &[Activity]) -> Vec<Activity> {
        trace.iter().map(|from| self.from2to[from.id]).collect()
    }
}
