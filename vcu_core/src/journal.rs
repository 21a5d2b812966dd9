//! Fixed-capacity transition journal.
//!
//! Keeps the most recent state changes of the three state machines for
//! post-mortem inspection. Backed by a `heapless::Deque`; when full, the
//! oldest entry is dropped. Never allocates.

use heapless::Deque;
use serde::Serialize;

use vcu_common::vigilance::state::{OperatingMode, SpeedLimitState, VigilanceState};

/// Number of entries retained.
pub const JOURNAL_CAPACITY: usize = 64;

/// State machine that produced a journal entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Machine {
    Mode,
    Vigilance,
    SpeedLimit,
}

/// One committed transition. States are stored in their `u8` encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct JournalEntry {
    /// Base-clock cycle of the commit.
    pub cycle: u64,
    pub machine: Machine,
    pub from: u8,
    pub to: u8,
}

impl JournalEntry {
    pub const fn mode(cycle: u64, from: OperatingMode, to: OperatingMode) -> Self {
        Self {
            cycle,
            machine: Machine::Mode,
            from: from as u8,
            to: to as u8,
        }
    }

    pub const fn vigilance(cycle: u64, from: VigilanceState, to: VigilanceState) -> Self {
        Self {
            cycle,
            machine: Machine::Vigilance,
            from: from as u8,
            to: to as u8,
        }
    }

    pub const fn speed_limit(cycle: u64, from: SpeedLimitState, to: SpeedLimitState) -> Self {
        Self {
            cycle,
            machine: Machine::SpeedLimit,
            from: from as u8,
            to: to as u8,
        }
    }

    /// Human-readable `from → to` for logs.
    pub fn describe(&self) -> String {
        fn name<T: std::fmt::Debug>(v: Option<T>) -> String {
            v.map_or_else(|| "?".to_string(), |v| format!("{v:?}"))
        }
        let (from, to) = match self.machine {
            Machine::Mode => (
                name(OperatingMode::from_u8(self.from)),
                name(OperatingMode::from_u8(self.to)),
            ),
            Machine::Vigilance => (
                name(VigilanceState::from_u8(self.from)),
                name(VigilanceState::from_u8(self.to)),
            ),
            Machine::SpeedLimit => (
                name(SpeedLimitState::from_u8(self.from)),
                name(SpeedLimitState::from_u8(self.to)),
            ),
        };
        format!("{:?}: {from} → {to}", self.machine)
    }
}

/// Ring of the latest [`JOURNAL_CAPACITY`] transitions.
#[derive(Debug, Clone, Default)]
pub struct TransitionJournal {
    entries: Deque<JournalEntry, JOURNAL_CAPACITY>,
    dropped: u64,
}

impl PartialEq for TransitionJournal {
    fn eq(&self, other: &Self) -> bool {
        self.dropped == other.dropped && self.entries.iter().eq(other.entries.iter())
    }
}

impl Eq for TransitionJournal {}

impl TransitionJournal {
    pub const fn new() -> Self {
        Self {
            entries: Deque::new(),
            dropped: 0,
        }
    }

    /// Append an entry, evicting the oldest when full.
    pub fn record(&mut self, entry: JournalEntry) {
        if self.entries.is_full() {
            self.entries.pop_front();
            self.dropped += 1;
        }
        // Cannot fail: a slot was freed above.
        let _ = self.entries.push_back(entry);
    }

    /// Entries, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &JournalEntry> {
        self.entries.iter()
    }

    /// Most recent entry.
    pub fn last(&self) -> Option<&JournalEntry> {
        self.entries.back()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries evicted since start.
    #[inline]
    pub const fn dropped(&self) -> u64 {
        self.dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_in_order() {
        let mut j = TransitionJournal::new();
        j.record(JournalEntry::mode(1, OperatingMode::Idle, OperatingMode::Normal));
        j.record(JournalEntry::vigilance(
            2,
            VigilanceState::Idle,
            VigilanceState::NoWarning,
        ));
        let cycles: Vec<u64> = j.iter().map(|e| e.cycle).collect();
        assert_eq!(cycles, vec![1, 2]);
        assert_eq!(j.last().map(|e| e.machine), Some(Machine::Vigilance));
    }

    #[test]
    fn evicts_oldest_when_full() {
        let mut j = TransitionJournal::new();
        for cycle in 0..(JOURNAL_CAPACITY as u64 + 10) {
            j.record(JournalEntry::speed_limit(
                cycle,
                SpeedLimitState::Idle,
                SpeedLimitState::WaitZeroSpeed,
            ));
        }
        assert_eq!(j.len(), JOURNAL_CAPACITY);
        assert_eq!(j.dropped(), 10);
        assert_eq!(j.iter().next().map(|e| e.cycle), Some(10));
    }

    #[test]
    fn describe_names_states() {
        let e = JournalEntry::mode(5, OperatingMode::Normal, OperatingMode::MajorFault);
        assert_eq!(e.describe(), "Mode: Normal → MajorFault");
        let bad = JournalEntry {
            cycle: 0,
            machine: Machine::Vigilance,
            from: 42,
            to: 0,
        };
        assert_eq!(bad.describe(), "Vigilance: ? → NoWarning");
    }

    #[test]
    fn entries_serialize() {
        let e = JournalEntry::speed_limit(7, SpeedLimitState::Active, SpeedLimitState::Idle);
        let json = serde_json::to_string(&e).unwrap();
        assert!(json.contains("\"machine\":\"speed_limit\""));
    }
}
