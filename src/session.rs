use log::{debug, info, trace, warn};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::detection::{DetectedLabelSet, DetectionEvent, DetectionSource, DetectionThreshold};
use crate::error::LensError;
use crate::matcher::{MatchMode, RecipeMatcher};

/// Commands accepted by a running detection session
#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    /// A detection reported by the engine
    Detected(DetectionEvent),
    /// Drop a label by name
    Remove(String),
    /// Drop the label at a list position
    RemoveAt(usize),
    /// Forget every label, e.g. when the camera restarts
    Reset,
    /// Change the minimum accepted score
    SetThreshold(DetectionThreshold),
}

/// State published to the display layer after each change
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// Detected labels in insertion order
    pub labels: Vec<String>,
    /// Display text of every matching recipe
    pub suggestions: Vec<String>,
    /// Incremented on every published change
    pub version: u64,
}

/// Owns the detected labels for one camera session.
///
/// The session runs on its own task; nothing else touches the label set.
/// Producers talk to it through a [`SessionHandle`] and observers receive
/// [`SessionSnapshot`]s.
struct DetectionSession {
    labels: DetectedLabelSet,
    matcher: RecipeMatcher,
    mode: MatchMode,
    threshold: DetectionThreshold,
    version: u64,
    commands: mpsc::Receiver<SessionCommand>,
    snapshots: watch::Sender<SessionSnapshot>,
}

impl DetectionSession {
    async fn run(mut self) -> DetectedLabelSet {
        debug!(
            "Detection session started (mode: {}, threshold: {:.2})",
            self.mode,
            self.threshold.value()
        );

        while let Some(command) = self.commands.recv().await {
            if self.apply(command) {
                self.publish();
            }
        }

        info!("Detection session closed with {} labels", self.labels.len());
        self.labels
    }

    /// Apply one command, returning whether the label set changed
    fn apply(&mut self, command: SessionCommand) -> bool {
        match command {
            SessionCommand::Detected(event) => {
                if event.label.trim().is_empty() {
                    trace!("Ignoring detection without a label");
                    return false;
                }
                if !self.threshold.accepts(&event) {
                    trace!(
                        "Ignoring '{}' with score {:.2} below {:.2}",
                        event.label,
                        event.score,
                        self.threshold.value()
                    );
                    return false;
                }
                let added = self.labels.insert(event.label.clone());
                if added {
                    debug!("Detected new ingredient '{}'", event.label);
                }
                added
            }
            SessionCommand::Remove(label) => self.labels.remove(&label),
            SessionCommand::RemoveAt(index) => {
                let removed = self.labels.remove_at(index);
                if removed.is_none() {
                    warn!(
                        "No ingredient at position {} ({} detected)",
                        index,
                        self.labels.len()
                    );
                }
                removed.is_some()
            }
            SessionCommand::Reset => {
                let had_labels = !self.labels.is_empty();
                self.labels.clear();
                debug!("Detection session reset");
                had_labels
            }
            SessionCommand::SetThreshold(threshold) => {
                debug!("Detection threshold set to {:.2}", threshold.value());
                self.threshold = threshold;
                false
            }
        }
    }

    fn publish(&mut self) {
        self.version += 1;
        let snapshot = snapshot_of(&self.labels, &self.matcher, self.mode, self.version);
        // Observers may come and go; a send with none attached is not an error.
        self.snapshots.send_replace(snapshot);
    }
}

fn snapshot_of(
    labels: &DetectedLabelSet,
    matcher: &RecipeMatcher,
    mode: MatchMode,
    version: u64,
) -> SessionSnapshot {
    SessionSnapshot {
        labels: labels.as_slice().to_vec(),
        suggestions: matcher.find_matches(labels.iter(), mode),
        version,
    }
}

/// Handle to a running detection session
#[derive(Debug)]
pub struct SessionHandle {
    commands: mpsc::Sender<SessionCommand>,
    snapshots: watch::Receiver<SessionSnapshot>,
    task: JoinHandle<DetectedLabelSet>,
}

impl SessionHandle {
    /// Start a session on the current tokio runtime
    pub fn spawn(
        matcher: RecipeMatcher,
        mode: MatchMode,
        threshold: DetectionThreshold,
        channel_capacity: usize,
    ) -> Self {
        let (command_tx, command_rx) = mpsc::channel(channel_capacity.max(1));
        let labels = DetectedLabelSet::new();
        // Seed with what the matcher says for no labels, so the first snapshot
        // agrees with any later one taken after a reset.
        let initial = snapshot_of(&labels, &matcher, mode, 0);
        let (snapshot_tx, snapshot_rx) = watch::channel(initial);

        let session = DetectionSession {
            labels,
            matcher,
            mode,
            threshold,
            version: 0,
            commands: command_rx,
            snapshots: snapshot_tx,
        };

        SessionHandle {
            commands: command_tx,
            snapshots: snapshot_rx,
            task: tokio::spawn(session.run()),
        }
    }

    pub async fn send(&self, command: SessionCommand) -> Result<(), LensError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| LensError::SessionClosed)
    }

    pub async fn detect(&self, event: DetectionEvent) -> Result<(), LensError> {
        self.send(SessionCommand::Detected(event)).await
    }

    pub async fn remove(&self, label: impl Into<String>) -> Result<(), LensError> {
        self.send(SessionCommand::Remove(label.into())).await
    }

    pub async fn remove_at(&self, index: usize) -> Result<(), LensError> {
        self.send(SessionCommand::RemoveAt(index)).await
    }

    pub async fn reset(&self) -> Result<(), LensError> {
        self.send(SessionCommand::Reset).await
    }

    pub async fn set_threshold(&self, threshold: DetectionThreshold) -> Result<(), LensError> {
        self.send(SessionCommand::SetThreshold(threshold)).await
    }

    /// Forward every event from `source` into the session.
    ///
    /// Returns the number of events forwarded.
    pub async fn feed<S>(&self, mut source: S) -> Result<usize, LensError>
    where
        S: DetectionSource,
    {
        let mut forwarded = 0;
        while let Some(event) = source.next_event().await {
            self.detect(event).await?;
            forwarded += 1;
        }
        debug!(
            "Forwarded {} detections from {}",
            forwarded,
            source.source_name()
        );
        Ok(forwarded)
    }

    /// New receiver for session snapshots
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshots.clone()
    }

    /// Most recently published snapshot
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Stop accepting commands and wait for queued ones to be applied.
    ///
    /// Returns the labels the session held when it stopped.
    pub async fn close(self) -> Result<DetectedLabelSet, LensError> {
        let SessionHandle { commands, task, .. } = self;
        drop(commands);
        task.await.map_err(|e| LensError::SessionFailed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::RecipeCatalog;
    use std::sync::Arc;

    fn spawn_session(mode: MatchMode) -> SessionHandle {
        let matcher = RecipeMatcher::new(Arc::new(RecipeCatalog::embedded().unwrap()));
        SessionHandle::spawn(matcher, mode, DetectionThreshold::default(), 8)
    }

    #[tokio::test]
    async fn test_initial_snapshot_is_empty() {
        let session = spawn_session(MatchMode::Any);
        assert_eq!(session.snapshot(), SessionSnapshot::default());
        let labels = session.close().await.unwrap();
        assert!(labels.is_empty());
    }

    #[tokio::test]
    async fn test_low_scores_are_dropped() {
        let session = spawn_session(MatchMode::Any);
        session.detect(DetectionEvent::new("egg", 0.2)).await.unwrap();
        session.detect(DetectionEvent::new("", 0.9)).await.unwrap();
        session.detect(DetectionEvent::new("tomato", 0.9)).await.unwrap();
        let labels = session.close().await.unwrap();
        assert_eq!(labels.as_slice(), &["tomato".to_string()]);
    }

    #[tokio::test]
    async fn test_snapshot_follows_changes() {
        let session = spawn_session(MatchMode::All);
        let mut updates = session.subscribe();

        session.detect(DetectionEvent::new("chicken", 0.9)).await.unwrap();
        updates.changed().await.unwrap();
        let snapshot = updates.borrow_and_update().clone();
        assert_eq!(snapshot.labels, vec!["chicken"]);
        assert_eq!(snapshot.suggestions.len(), 3);

        session.detect(DetectionEvent::new("lettuce", 0.9)).await.unwrap();
        updates.changed().await.unwrap();
        let snapshot = updates.borrow_and_update().clone();
        assert_eq!(snapshot.version, 2);
        assert_eq!(snapshot.suggestions.len(), 1);
        assert!(snapshot.suggestions[0].starts_with("Chicken Lettuce Wraps\n\n"));

        session.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_threshold_change_applies_to_later_events() {
        let session = spawn_session(MatchMode::Any);
        session
            .set_threshold(DetectionThreshold::new(0.95).unwrap())
            .await
            .unwrap();
        session.detect(DetectionEvent::new("egg", 0.9)).await.unwrap();
        session.detect(DetectionEvent::new("rice", 0.97)).await.unwrap();
        let labels = session.close().await.unwrap();
        assert_eq!(labels.iter().collect::<Vec<_>>(), vec!["rice"]);
    }
}
