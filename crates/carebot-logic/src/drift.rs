//! Drift: the random activation of patient needs between observations.
//!
//! A drift round draws one uniform value in [0, 1) and maps it onto three
//! bands laid out as `[skip | medication | hunger]`. The band widths come
//! from [`DriftConfig`]; hunger takes the remainder.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::DriftConfig;
use crate::needs::Need;

/// Source of uniform rolls in [0, 1).
pub trait DriftSource: Send + Sync {
    fn roll(&self) -> f64;
}

/// Draws from the thread-local OS-seeded generator.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadDrift;

impl DriftSource for ThreadDrift {
    fn roll(&self) -> f64 {
        rand::thread_rng().gen::<f64>()
    }
}

/// Deterministic sequence from a fixed seed.
#[derive(Debug)]
pub struct SeededDrift {
    rng: Mutex<StdRng>,
}

impl SeededDrift {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl DriftSource for SeededDrift {
    fn roll(&self) -> f64 {
        self.rng
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .gen::<f64>()
    }
}

/// Replays a fixed list of rolls, then repeats `fallback` forever.
///
/// Used by tests and the simulation harness to force particular drift
/// outcomes.
#[derive(Debug)]
pub struct ScriptedDrift {
    rolls: Mutex<VecDeque<f64>>,
    fallback: f64,
}

impl ScriptedDrift {
    pub fn new(rolls: impl IntoIterator<Item = f64>, fallback: f64) -> Self {
        Self {
            rolls: Mutex::new(rolls.into_iter().collect()),
            fallback,
        }
    }

    /// A source that always returns `roll`.
    pub fn constant(roll: f64) -> Self {
        Self::new([], roll)
    }
}

impl DriftSource for ScriptedDrift {
    fn roll(&self) -> f64 {
        self.rolls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or(self.fallback)
    }
}

/// Build the drift source a config asks for.
pub fn drift_source(config: &DriftConfig) -> Box<dyn DriftSource> {
    match config.seed {
        Some(seed) => Box::new(SeededDrift::new(seed)),
        None => Box::new(ThreadDrift),
    }
}

/// Map a roll onto the need it activates, or `None` for a quiet round.
pub fn classify(roll: f64, config: &DriftConfig) -> Option<Need> {
    if roll < config.skip {
        None
    } else if roll < config.skip + config.medication {
        Some(Need::Medication)
    } else {
        Some(Need::Hunger)
    }
}
