//! Status reports and action result wording.

use crate::config::MessageConfig;
use crate::needs::{Need, NeedSnapshot};

/// Report text when no need is active.
pub const NORMAL: &str = "Normal";

/// Compose the status report for a snapshot: `"Normal"` when nothing is
/// outstanding, otherwise one configured line per active need in report order.
pub fn compose_report(snapshot: &NeedSnapshot, messages: &MessageConfig) -> String {
    let lines: Vec<&str> = snapshot
        .active()
        .map(|need| match need {
            Need::Hunger => messages.hungry.as_str(),
            Need::Medication => messages.needs_medication.as_str(),
        })
        .collect();

    if lines.is_empty() {
        return NORMAL.to_string();
    }
    lines.join("\n").trim().to_string()
}

/// Render a report the way the console prints it: inline when it is a single
/// line, on its own lines otherwise.
pub fn status_line(report: &str) -> String {
    let sep = if report.contains('\n') { "\n" } else { " " };
    format!("Status:{}{}", sep, report)
}

/// Result of one feed/medicate attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    /// The need was active and this action cleared it.
    Administered(Need),
    /// The need was not active, or a concurrent action cleared it first.
    NotNeeded(Need),
}

impl ActionOutcome {
    pub fn need(self) -> Need {
        match self {
            Self::Administered(need) | Self::NotNeeded(need) => need,
        }
    }

    pub fn administered(self) -> bool {
        matches!(self, Self::Administered(_))
    }

    pub fn message(self) -> &'static str {
        match self {
            Self::Administered(Need::Hunger) => "Food administered.",
            Self::Administered(Need::Medication) => "Medication administered.",
            Self::NotNeeded(Need::Hunger) => "Not hungry right now.",
            Self::NotNeeded(Need::Medication) => "Doesn't need medication right now.",
        }
    }
}

impl std::fmt::Display for ActionOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}
