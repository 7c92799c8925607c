//! Engine errors.

use carebot_logic::config::ConfigError;
use carebot_logic::needs::Need;
use thiserror::Error;

/// What a request was doing, for error wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Status,
    Action(Need),
}

impl Operation {
    pub fn interrupted_message(self) -> &'static str {
        match self {
            Operation::Status => "Interrupted before status could be determined",
            Operation::Action(Need::Hunger) => "Interrupted while feeding.",
            Operation::Action(Need::Medication) => "Interrupted while administering medication.",
        }
    }
}

/// Errors returned by bot requests.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BotError {
    /// The simulated delay was cut short by shutdown. No flag was touched.
    #[error("{}", .0.interrupted_message())]
    Interrupted(Operation),

    /// The bot has not been started, or has been shut down.
    #[error("Bot is not running.")]
    NotRunning,

    #[error("invalid configuration: {}", join_errors(.0))]
    InvalidConfig(Vec<ConfigError>),
}

fn join_errors(errors: &[ConfigError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
