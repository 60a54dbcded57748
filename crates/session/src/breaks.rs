//! Break log

use serde::{Deserialize, Serialize};

/// Why a break was opened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakReason {
    Interval,
    Manual,
    AutoUnfocus,
}

impl BreakReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            BreakReason::Interval => "interval",
            BreakReason::Manual => "manual",
            BreakReason::AutoUnfocus => "auto_unfocus",
        }
    }
}

/// One break period; `end_ms == None` while open
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakEntry {
    pub id: u32,
    pub reason: BreakReason,
    pub start_ms: u64,
    pub end_ms: Option<u64>,
}

impl BreakEntry {
    pub fn is_open(&self) -> bool {
        self.end_ms.is_none()
    }

    /// Whole seconds, rounded half up. `None` while open.
    pub fn duration_secs(&self) -> Option<u64> {
        self.end_ms
            .map(|end| (end.saturating_sub(self.start_ms) + 500) / 1_000)
    }
}

/// Ordered break history. Only the last entry can be open.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakLog {
    entries: Vec<BreakEntry>,
    next_id: u32,
}

impl BreakLog {
    /// Open a break. Returns `None` (no-op) when one is already open.
    pub fn open(&mut self, reason: BreakReason, now_ms: u64) -> Option<&BreakEntry> {
        if self.is_open() {
            return None;
        }
        self.next_id += 1;
        self.entries.push(BreakEntry {
            id: self.next_id,
            reason,
            start_ms: now_ms,
            end_ms: None,
        });
        self.entries.last()
    }

    /// Close the open break, if any
    pub fn close(&mut self, now_ms: u64) -> Option<&BreakEntry> {
        let entry = self.entries.last_mut().filter(|e| e.is_open())?;
        entry.end_ms = Some(now_ms.max(entry.start_ms));
        Some(&*entry)
    }

    pub fn is_open(&self) -> bool {
        self.current().is_some()
    }

    pub fn current(&self) -> Option<&BreakEntry> {
        self.entries.last().filter(|e| e.is_open())
    }

    pub fn entries(&self) -> &[BreakEntry] {
        &self.entries
    }

    pub fn break_count(&self) -> usize {
        self.entries.len()
    }

    pub fn count_by_reason(&self, reason: BreakReason) -> usize {
        self.entries.iter().filter(|e| e.reason == reason).count()
    }

    /// Sum of closed break durations
    pub fn total_break_seconds(&self) -> u64 {
        self.entries.iter().filter_map(BreakEntry::duration_secs).sum()
    }
}
