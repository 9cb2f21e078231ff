use std::collections::VecDeque;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One object recognized by the detection engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionEvent {
    /// Category name assigned by the detector
    pub label: String,
    /// Confidence score in `[0.0, 1.0]`
    pub score: f32,
}

impl DetectionEvent {
    pub fn new(label: impl Into<String>, score: f32) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }
}

/// Labels detected during a camera session.
///
/// Keeps insertion order and ignores labels it already holds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetectedLabelSet {
    labels: Vec<String>,
}

impl DetectedLabelSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a label. Returns `false` when it was already present.
    pub fn insert(&mut self, label: impl Into<String>) -> bool {
        let label = label.into();
        if self.contains(&label) {
            return false;
        }
        self.labels.push(label);
        true
    }

    pub fn contains(&self, label: &str) -> bool {
        self.labels.iter().any(|existing| existing == label)
    }

    /// Remove a label by name. Returns `false` when it was not present.
    pub fn remove(&mut self, label: &str) -> bool {
        match self.labels.iter().position(|existing| existing == label) {
            Some(index) => {
                self.labels.remove(index);
                true
            }
            None => false,
        }
    }

    /// Remove the label at `index`, as a list row's delete button does
    pub fn remove_at(&mut self, index: usize) -> Option<String> {
        if index < self.labels.len() {
            Some(self.labels.remove(index))
        } else {
            None
        }
    }

    /// Replace the whole set, dropping duplicates from `labels`
    pub fn replace_all<I, S>(&mut self, labels: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels.clear();
        for label in labels {
            self.insert(label);
        }
    }

    pub fn clear(&mut self) {
        self.labels.clear();
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.labels
    }

    pub fn into_vec(self) -> Vec<String> {
        self.labels
    }
}

impl<S: Into<String>> FromIterator<S> for DetectedLabelSet {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        let mut set = DetectedLabelSet::new();
        set.replace_all(iter);
        set
    }
}

impl<'a> IntoIterator for &'a DetectedLabelSet {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.labels.iter()
    }
}

const THRESHOLD_STEP: f32 = 0.1;

/// Minimum score a detection needs before its label is accepted
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectionThreshold(f32);

impl DetectionThreshold {
    pub const DEFAULT: f32 = 0.5;

    /// Returns `None` unless `value` lies in `[0.0, 1.0]`
    pub fn new(value: f32) -> Option<Self> {
        if (0.0..=1.0).contains(&value) {
            Some(Self(value))
        } else {
            None
        }
    }

    pub fn value(&self) -> f32 {
        self.0
    }

    pub fn accepts(&self, event: &DetectionEvent) -> bool {
        event.score >= self.0
    }

    /// Lower the floor by one step; no-op below 0.1
    pub fn lower(&mut self) -> bool {
        if self.0 >= THRESHOLD_STEP {
            self.0 = (self.0 - THRESHOLD_STEP).max(0.0);
            true
        } else {
            false
        }
    }

    /// Raise the floor by one step; no-op above 0.8
    pub fn raise(&mut self) -> bool {
        if self.0 <= 0.8 {
            self.0 = (self.0 + THRESHOLD_STEP).min(1.0);
            true
        } else {
            false
        }
    }
}

impl Default for DetectionThreshold {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

/// Producer of detection events, typically wrapping an on-device detector
#[async_trait]
pub trait DetectionSource: Send {
    /// Name used in logs
    fn source_name(&self) -> &str;

    /// Next detection, or `None` once the source is exhausted
    async fn next_event(&mut self) -> Option<DetectionEvent>;
}

/// Replays a fixed list of detections, e.g. recorded from a previous session
#[derive(Debug, Clone, Default)]
pub struct ReplaySource {
    events: VecDeque<DetectionEvent>,
}

impl ReplaySource {
    pub fn new(events: impl IntoIterator<Item = DetectionEvent>) -> Self {
        Self {
            events: events.into_iter().collect(),
        }
    }

    /// Parse a JSON array of `{"label": .., "score": ..}` objects
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        let events: Vec<DetectionEvent> = serde_json::from_str(json)?;
        Ok(Self::new(events))
    }

    pub fn remaining(&self) -> usize {
        self.events.len()
    }
}

#[async_trait]
impl DetectionSource for ReplaySource {
    fn source_name(&self) -> &str {
        "replay"
    }

    async fn next_event(&mut self) -> Option<DetectionEvent> {
        self.events.pop_front()
    }
}
