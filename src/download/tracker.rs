//! Per-clip status tracking
//!
//! The tracker is written by the download engine and observed by the
//! presentation layer. Observers run synchronously inside `set_status`, so
//! every transition is seen in order and immediately.

use std::collections::HashMap;

use crate::suno::Clip;

/// Lifecycle of one clip within a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClipStatus {
    #[default]
    Pending,
    Processing,
    Success,
    Error,
}

impl ClipStatus {
    /// Success and Error end a clip's run
    pub fn is_terminal(self) -> bool {
        matches!(self, ClipStatus::Success | ClipStatus::Error)
    }
}

/// A single status transition delivered to observers
#[derive(Debug, Clone, PartialEq)]
pub struct StatusChange {
    pub clip_id: String,
    /// 1-based playlist position
    pub ordinal: usize,
    pub status: ClipStatus,
}

type Observer = Box<dyn Fn(&StatusChange) + Send + Sync>;

/// Holds the status of every clip in a playlist, in playlist order
#[derive(Default)]
pub struct ClipStatusTracker {
    entries: Vec<(String, ClipStatus)>,
    index: HashMap<String, usize>,
    observers: Vec<Observer>,
}

impl ClipStatusTracker {
    /// Track every clip of a playlist, all starting as Pending
    pub fn new(clips: &[Clip]) -> Self {
        let mut tracker = Self::default();
        for clip in clips {
            if tracker.index.contains_key(&clip.id) {
                continue;
            }
            tracker.index.insert(clip.id.clone(), tracker.entries.len());
            tracker.entries.push((clip.id.clone(), ClipStatus::Pending));
        }
        tracker
    }

    /// Register an observer for every subsequent transition
    pub fn subscribe<F>(&mut self, observer: F)
    where
        F: Fn(&StatusChange) + Send + Sync + 'static,
    {
        self.observers.push(Box::new(observer));
    }

    /// Update a clip's status and notify observers
    ///
    /// Unknown ids are ignored.
    pub fn set_status(&mut self, clip_id: &str, status: ClipStatus) {
        let Some(&position) = self.index.get(clip_id) else {
            return;
        };
        self.entries[position].1 = status;

        let change = StatusChange {
            clip_id: clip_id.to_string(),
            ordinal: position + 1,
            status,
        };
        for observer in &self.observers {
            observer(&change);
        }
    }

    /// Current status of a clip; Pending for ids never seen
    pub fn status(&self, clip_id: &str) -> ClipStatus {
        self.index
            .get(clip_id)
            .map(|&position| self.entries[position].1)
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
