//! The caregiving bot: drift on every status query, actions on demand.
//!
//! Every request runs as its own tokio task. Requests share one
//! [`NeedState`] and never take a lock; they only serialize at the
//! compare-and-swap points below.
//!
//! Status evaluation:
//! 1. wait `status_delay`
//! 2. if the suppression flag is armed, consume it and stop
//! 3. roll; a quiet roll stops here
//! 4. consume the suppression flag again if an action armed it meanwhile,
//!    otherwise set the rolled need
//!
//! Actions:
//! 1. target need clear: "not needed", no delay
//! 2. wait `action_delay`
//! 3. arm suppression
//! 4. CAS target true→false; losing means another action got there first
//! 5. arm suppression again, in case a status query consumed it between 3 and 4
//!
//! A drift that passed check 2 before an action armed suppression and
//! wrote its need after check 4 can still land. The patient then loses at
//! most one suppressed round.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use carebot_logic::config::BotConfig;
use carebot_logic::drift::{classify, drift_source, DriftSource};
use carebot_logic::needs::{Flag, Need, NeedSnapshot, NeedState};
use carebot_logic::report::{compose_report, ActionOutcome};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::error::{BotError, Operation};

const IDLE: u8 = 0;
const RUNNING: u8 = 1;
const STOPPED: u8 = 2;

/// What one drift evaluation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriftRound {
    /// Suppression was armed before the roll and got consumed.
    Suppressed,
    /// The roll fell in the skip band.
    Quiet,
    /// The roll picked a need but an action armed suppression before the
    /// write; suppression was consumed instead.
    SuppressedLate(Need),
    /// The rolled need was set.
    Activated(Need),
}

/// Result of a status query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    pub round: DriftRound,
    pub snapshot: NeedSnapshot,
    pub text: String,
}

struct BotInner {
    needs: NeedState,
    config: BotConfig,
    drift: Arc<dyn DriftSource>,
    lifecycle: AtomicU8,
    stop_tx: watch::Sender<bool>,
}

/// Handle to the bot. Cloning is cheap; all clones share the same patient.
#[derive(Clone)]
pub struct Bot {
    inner: Arc<BotInner>,
}

impl std::fmt::Debug for Bot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bot")
            .field("needs", &self.inner.needs)
            .field("lifecycle", &self.inner.lifecycle.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

impl Bot {
    /// Build a bot with the drift source its config asks for.
    pub fn new(config: BotConfig) -> Self {
        let drift: Arc<dyn DriftSource> = Arc::from(drift_source(&config.drift));
        Self::with_drift(config, drift)
    }

    pub fn with_drift(config: BotConfig, drift: Arc<dyn DriftSource>) -> Self {
        let (stop_tx, _) = watch::channel(false);
        Self {
            inner: Arc::new(BotInner {
                needs: NeedState::new(),
                config,
                drift,
                lifecycle: AtomicU8::new(IDLE),
                stop_tx,
            }),
        }
    }

    /// Begin accepting requests. The bot has no background loop; each
    /// status request drives its own drift round.
    pub fn start(&self) {
        match self
            .inner
            .lifecycle
            .compare_exchange(IDLE, RUNNING, Ordering::SeqCst, Ordering::SeqCst)
        {
            Ok(_) => log::info!("Bot started"),
            Err(RUNNING) => log::debug!("Bot already running"),
            Err(_) => log::warn!("Bot was shut down and cannot be restarted"),
        }
    }

    /// Stop accepting requests and interrupt every in-flight delay.
    pub fn shutdown(&self) {
        let previous = self.inner.lifecycle.swap(STOPPED, Ordering::SeqCst);
        self.inner.stop_tx.send_replace(true);
        if previous != STOPPED {
            log::info!("Bot shut down");
        }
    }

    pub fn is_running(&self) -> bool {
        self.inner.lifecycle.load(Ordering::SeqCst) == RUNNING
    }

    /// Direct access to the patient's flags.
    pub fn needs(&self) -> &NeedState {
        &self.inner.needs
    }

    pub fn config(&self) -> &BotConfig {
        &self.inner.config
    }

    /// Spawn a status query; resolves to the report text or an error message.
    pub fn request_status(&self) -> JoinHandle<String> {
        let bot = self.clone();
        tokio::spawn(async move {
            match bot.status().await {
                Ok(report) => report.text,
                Err(e) => e.to_string(),
            }
        })
    }

    /// Spawn a feed attempt.
    pub fn request_feed(&self) -> JoinHandle<String> {
        self.request_action(Need::Hunger)
    }

    /// Spawn a medication attempt.
    pub fn request_medicate(&self) -> JoinHandle<String> {
        self.request_action(Need::Medication)
    }

    fn request_action(&self, need: Need) -> JoinHandle<String> {
        let bot = self.clone();
        tokio::spawn(async move {
            match bot.act(need).await {
                Ok(outcome) => {
                    log::debug!("{:?} request finished: {}", outcome.need(), outcome);
                    outcome.message().to_string()
                }
                Err(e) => e.to_string(),
            }
        })
    }

    /// Run one drift round, then report on the patient.
    pub async fn status(&self) -> Result<StatusReport, BotError> {
        self.ensure_running()?;
        let round = self.evaluate_drift().await?;
        let snapshot = self.inner.needs.snapshot();
        let text = compose_report(&snapshot, &self.inner.config.messages);
        Ok(StatusReport {
            round,
            snapshot,
            text,
        })
    }

    pub async fn feed(&self) -> Result<ActionOutcome, BotError> {
        self.act(Need::Hunger).await
    }

    pub async fn medicate(&self) -> Result<ActionOutcome, BotError> {
        self.act(Need::Medication).await
    }

    /// Clear `need` if it is active.
    pub async fn act(&self, need: Need) -> Result<ActionOutcome, BotError> {
        self.ensure_running()?;
        let needs = &self.inner.needs;
        let flag = need.flag();

        if !needs.get(flag) {
            return Ok(ActionOutcome::NotNeeded(need));
        }

        self.pause(self.inner.config.timing.action_delay(), Operation::Action(need))
            .await?;

        needs.set(Flag::SuppressNextDrift, true);
        if !needs.compare_and_swap(flag, true, false) {
            log::debug!("{:?} already handled by a concurrent action", need);
            return Ok(ActionOutcome::NotNeeded(need));
        }
        needs.set(Flag::SuppressNextDrift, true);

        log::info!("{:?} need cleared", need);
        Ok(ActionOutcome::Administered(need))
    }

    async fn evaluate_drift(&self) -> Result<DriftRound, BotError> {
        self.pause(self.inner.config.timing.status_delay(), Operation::Status)
            .await?;

        let needs = &self.inner.needs;
        if needs.get(Flag::SuppressNextDrift)
            && needs.compare_and_swap(Flag::SuppressNextDrift, true, false)
        {
            log::debug!("Drift suppressed after recent action");
            return Ok(DriftRound::Suppressed);
        }

        let roll = self.inner.drift.roll();
        let Some(need) = classify(roll, &self.inner.config.drift) else {
            log::debug!("Drift roll {:.3}: quiet", roll);
            return Ok(DriftRound::Quiet);
        };

        // An action may have landed while we were rolling
        if needs.compare_and_swap(Flag::SuppressNextDrift, true, false) {
            log::debug!("Drift roll {:.3}: {:?} suppressed late", roll, need);
            return Ok(DriftRound::SuppressedLate(need));
        }

        needs.set(need.flag(), true);
        log::debug!("Drift roll {:.3}: {:?} activated", roll, need);
        Ok(DriftRound::Activated(need))
    }

    fn ensure_running(&self) -> Result<(), BotError> {
        if self.is_running() {
            Ok(())
        } else {
            Err(BotError::NotRunning)
        }
    }

    /// Sleep for `delay` unless shutdown comes first.
    async fn pause(&self, delay: Duration, op: Operation) -> Result<(), BotError> {
        let mut stop = self.inner.stop_tx.subscribe();
        let already_stopped = *stop.borrow_and_update();
        if already_stopped {
            return Err(BotError::Interrupted(op));
        }

        tokio::select! {
            _ = tokio::time::sleep(delay) => Ok(()),
            _ = stopped(&mut stop) => {
                log::warn!("{}", op.interrupted_message());
                Err(BotError::Interrupted(op))
            }
        }
    }
}

async fn stopped(stop: &mut watch::Receiver<bool>) {
    loop {
        if stop.changed().await.is_err() {
            return;
        }
        let is_stopped = *stop.borrow_and_update();
        if is_stopped {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carebot_logic::drift::ScriptedDrift;
    use std::time::Instant;

    /// Quiet roll under the default odds.
    const QUIET: f64 = 0.1;
    /// Medication roll under the default odds.
    const MEDICATION: f64 = 0.6;
    /// Hunger roll under the default odds.
    const HUNGER: f64 = 0.9;

    fn fast_config() -> BotConfig {
        let mut config = BotConfig::default();
        config.timing.status_delay_ms = 5;
        config.timing.action_delay_ms = 5;
        config
    }

    fn scripted_bot(rolls: &[f64], fallback: f64) -> Bot {
        let bot = Bot::with_drift(
            fast_config(),
            Arc::new(ScriptedDrift::new(rolls.iter().copied(), fallback)),
        );
        bot.start();
        bot
    }

    #[tokio::test]
    async fn test_requests_rejected_before_start() {
        let bot = Bot::with_drift(fast_config(), Arc::new(ScriptedDrift::constant(QUIET)));
        assert_eq!(bot.status().await, Err(BotError::NotRunning));
        assert_eq!(bot.request_feed().await.unwrap(), "Bot is not running.");
    }

    #[tokio::test]
    async fn test_quiet_round_reports_normal() {
        let bot = scripted_bot(&[], QUIET);
        let report = bot.status().await.unwrap();
        assert_eq!(report.round, DriftRound::Quiet);
        assert_eq!(report.text, "Normal");
    }

    #[tokio::test]
    async fn test_drift_activates_rolled_need() {
        let bot = scripted_bot(&[HUNGER, MEDICATION], QUIET);

        let first = bot.status().await.unwrap();
        assert_eq!(first.round, DriftRound::Activated(Need::Hunger));
        assert_eq!(first.text, "Hungry");

        let second = bot.status().await.unwrap();
        assert_eq!(second.round, DriftRound::Activated(Need::Medication));
        assert_eq!(second.text, "Hungry\nMedication needed");
    }

    #[tokio::test]
    async fn test_feed_when_not_hungry_skips_delay() {
        let mut config = fast_config();
        config.timing.action_delay_ms = 500;
        let bot = Bot::with_drift(config, Arc::new(ScriptedDrift::constant(QUIET)));
        bot.start();

        let started = Instant::now();
        let outcome = bot.feed().await.unwrap();
        assert_eq!(outcome, ActionOutcome::NotNeeded(Need::Hunger));
        assert!(started.elapsed() < Duration::from_millis(250));
        assert!(!bot.needs().get(Flag::SuppressNextDrift));
    }

    #[tokio::test]
    async fn test_feed_clears_hunger_and_suppresses_next_drift() {
        let bot = scripted_bot(&[], HUNGER);
        bot.needs().set(Flag::Hunger, true);

        assert_eq!(
            bot.feed().await.unwrap(),
            ActionOutcome::Administered(Need::Hunger)
        );
        assert!(!bot.needs().get(Flag::Hunger));
        assert!(bot.needs().get(Flag::SuppressNextDrift));

        // Drift would pick hunger again, but this round is suppressed
        let report = bot.status().await.unwrap();
        assert_eq!(report.round, DriftRound::Suppressed);
        assert_eq!(report.text, "Normal");
        assert!(!bot.needs().get(Flag::SuppressNextDrift));

        // The round after that drifts normally
        let report = bot.status().await.unwrap();
        assert_eq!(report.round, DriftRound::Activated(Need::Hunger));
    }

    #[tokio::test]
    async fn test_medicate_only_touches_medication() {
        let bot = scripted_bot(&[], QUIET);
        bot.needs().set(Flag::Hunger, true);
        bot.needs().set(Flag::Medication, true);

        let outcome = bot.medicate().await.unwrap();
        assert_eq!(outcome, ActionOutcome::Administered(Need::Medication));
        assert!(bot.needs().get(Flag::Hunger));
        assert!(!bot.needs().get(Flag::Medication));
    }

    #[tokio::test]
    async fn test_action_outcome_names_requested_need() {
        let bot = scripted_bot(&[], QUIET);
        bot.needs().set(Flag::Medication, true);

        assert_eq!(bot.medicate().await.unwrap().need(), Need::Medication);
        assert_eq!(bot.medicate().await.unwrap().need(), Need::Medication);
        assert_eq!(bot.feed().await.unwrap().need(), Need::Hunger);
    }

    #[tokio::test]
    async fn test_shutdown_interrupts_action_without_mutation() {
        let mut config = fast_config();
        config.timing.action_delay_ms = 10_000;
        let bot = Bot::with_drift(config, Arc::new(ScriptedDrift::constant(QUIET)));
        bot.start();
        bot.needs().set(Flag::Hunger, true);

        let pending = bot.request_feed();
        tokio::time::sleep(Duration::from_millis(20)).await;
        bot.shutdown();

        assert_eq!(pending.await.unwrap(), "Interrupted while feeding.");
        assert!(bot.needs().get(Flag::Hunger));
        assert!(!bot.needs().get(Flag::SuppressNextDrift));
        assert!(!bot.is_running());
    }

    #[tokio::test]
    async fn test_shutdown_interrupts_status() {
        let mut config = fast_config();
        config.timing.status_delay_ms = 10_000;
        let bot = Bot::with_drift(config, Arc::new(ScriptedDrift::constant(HUNGER)));
        bot.start();

        let pending = bot.request_status();
        tokio::time::sleep(Duration::from_millis(20)).await;
        bot.shutdown();

        assert_eq!(
            pending.await.unwrap(),
            "Interrupted before status could be determined"
        );
        assert!(!bot.needs().get(Flag::Hunger));
    }

    #[tokio::test]
    async fn test_restart_after_shutdown_is_refused() {
        let bot = scripted_bot(&[], QUIET);
        bot.shutdown();
        bot.start();
        assert!(!bot.is_running());
        assert_eq!(bot.status().await, Err(BotError::NotRunning));
    }

    #[tokio::test]
    async fn test_dropped_action_leaves_flags_alone() {
        let mut config = fast_config();
        config.timing.action_delay_ms = 10_000;
        let bot = Bot::with_drift(config, Arc::new(ScriptedDrift::constant(QUIET)));
        bot.start();
        bot.needs().set(Flag::Medication, true);

        let result = tokio::time::timeout(Duration::from_millis(20), bot.medicate()).await;
        assert!(result.is_err());
        assert!(bot.needs().get(Flag::Medication));
        assert!(!bot.needs().get(Flag::SuppressNextDrift));
    }
}
