//! Patient need state: two need flags plus the drift suppression flag.
//!
//! Each flag is its own atomic cell. There is no aggregate lock and no
//! cross-flag atomicity; callers that need to coordinate two flags do it
//! through compare-and-swap on the individual cells.

use std::sync::atomic::{AtomicBool, Ordering};

/// A patient need the bot can observe and correct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Need {
    Hunger,
    Medication,
}

impl Need {
    /// Report order: hunger first, then medication.
    pub const ALL: [Need; 2] = [Need::Hunger, Need::Medication];

    pub fn flag(self) -> Flag {
        match self {
            Need::Hunger => Flag::Hunger,
            Need::Medication => Flag::Medication,
        }
    }
}

/// Addresses one cell of [`NeedState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flag {
    Hunger,
    Medication,
    /// When set, the next drift evaluation is skipped and the flag cleared.
    SuppressNextDrift,
}

/// Point-in-time copy of the two need flags.
///
/// The two reads are individually atomic but not taken together.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NeedSnapshot {
    pub hungry: bool,
    pub needs_medication: bool,
}

impl NeedSnapshot {
    pub fn is_active(&self, need: Need) -> bool {
        match need {
            Need::Hunger => self.hungry,
            Need::Medication => self.needs_medication,
        }
    }

    /// Needs currently outstanding, in report order.
    pub fn active(&self) -> impl Iterator<Item = Need> + '_ {
        Need::ALL.into_iter().filter(|n| self.is_active(*n))
    }
}

/// Lock-free store for the patient's flags. All flags start `false`.
///
/// Every access is `SeqCst`: the drift protocol reads the suppression flag
/// and writes a need flag, and actions do the reverse, so both sides must
/// agree on a single order across different cells.
#[derive(Debug, Default)]
pub struct NeedState {
    hungry: AtomicBool,
    needs_medication: AtomicBool,
    suppress_next_drift: AtomicBool,
}

impl NeedState {
    pub fn new() -> Self {
        Self::default()
    }

    fn cell(&self, flag: Flag) -> &AtomicBool {
        match flag {
            Flag::Hunger => &self.hungry,
            Flag::Medication => &self.needs_medication,
            Flag::SuppressNextDrift => &self.suppress_next_drift,
        }
    }

    pub fn get(&self, flag: Flag) -> bool {
        self.cell(flag).load(Ordering::SeqCst)
    }

    pub fn set(&self, flag: Flag, value: bool) {
        self.cell(flag).store(value, Ordering::SeqCst);
    }

    /// Swap `flag` to `new` only if it currently holds `expected`.
    /// Returns whether the swap happened.
    pub fn compare_and_swap(&self, flag: Flag, expected: bool, new: bool) -> bool {
        self.cell(flag)
            .compare_exchange(expected, new, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    pub fn snapshot(&self) -> NeedSnapshot {
        NeedSnapshot {
            hungry: self.get(Flag::Hunger),
            needs_medication: self.get(Flag::Medication),
        }
    }
}
