//! Pure caregiving logic for CareBot.
//!
//! This crate holds everything about the bot that does not need a runtime:
//! the lock-free need store, drift odds, report wording, the command
//! language and configuration. The async engine in `carebot-engine` drives
//! these pieces; the CLI and the simulation harness only talk to the engine.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`command`] | Operator command parsing and help text |
//! | [`config`] | Delays, drift odds, report templates and validation |
//! | [`drift`] | Drift roll sources and roll classification |
//! | [`needs`] | Atomic need flags and the drift suppression flag |
//! | [`report`] | Status report composition and action result wording |

pub mod command;
pub mod config;
pub mod drift;
pub mod needs;
pub mod report;
