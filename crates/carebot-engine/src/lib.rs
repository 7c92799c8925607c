//! CareBot engine.
//!
//! Runs status queries and feed/medicate actions as tokio tasks over the
//! lock-free need state from `carebot-logic`. The CLI and the simulation
//! harness build an [`AppContext`] and talk to the [`Bot`] inside it.

mod bot;
mod context;
mod error;

pub use bot::{Bot, DriftRound, StatusReport};
pub use context::AppContext;
pub use error::{BotError, Operation};
