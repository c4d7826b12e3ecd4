use std::sync::Arc;

use image::RgbaImage;

use super::layers::Layer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryAction {
    Undo,
    Redo,
}

impl HistoryAction {
    pub const fn applied_message(self) -> &'static str {
        match self {
            Self::Undo => "undo applied",
            Self::Redo => "redo applied",
        }
    }

    pub const fn empty_message(self) -> &'static str {
        match self {
            Self::Undo => "nothing to undo",
            Self::Redo => "nothing to redo",
        }
    }
}

/// Full copy of the layer list plus the ink buffer at one commit point.
#[derive(Debug, Clone, PartialEq)]
pub struct HistorySnapshot {
    pub layers: Vec<Layer>,
    pub ink: Arc<RgbaImage>,
}

/// Linear snapshot list with a cursor. Pushing after an undo drops the redo
/// tail; pushing past the limit evicts the oldest entry.
#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<HistorySnapshot>,
    cursor: Option<usize>,
    limit: usize,
}

impl History {
    pub fn new(limit: usize) -> Self {
        Self {
            entries: Vec::new(),
            cursor: None,
            limit: limit.max(1),
        }
    }

    pub fn push(&mut self, snapshot: HistorySnapshot) {
        let keep = self.cursor.map_or(0, |cursor| cursor + 1);
        self.entries.truncate(keep);
        self.entries.push(snapshot);
        if self.entries.len() > self.limit {
            let overflow = self.entries.len() - self.limit;
            self.entries.drain(..overflow);
        }
        self.cursor = Some(self.entries.len() - 1);
    }

    pub fn undo(&mut self) -> Option<&HistorySnapshot> {
        let cursor = self.cursor.filter(|&cursor| cursor > 0)?;
        self.cursor = Some(cursor - 1);
        self.entries.get(cursor - 1)
    }

    pub fn redo(&mut self) -> Option<&HistorySnapshot> {
        let next = self.cursor.map_or(0, |cursor| cursor + 1);
        if next >= self.entries.len() {
            return None;
        }
        self.cursor = Some(next);
        self.entries.get(next)
    }

    pub fn can_undo(&self) -> bool {
        self.cursor.is_some_and(|cursor| cursor > 0)
    }

    pub fn can_redo(&self) -> bool {
        self.cursor.map_or(0, |cursor| cursor + 1) < self.entries.len()
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn current(&self) -> Option<&HistorySnapshot> {
        self.cursor.and_then(|cursor| self.entries.get(cursor))
    }
}
