//! CareBot Headless Simulation Harness
//!
//! Drives the real engine through caregiving scenarios with millisecond
//! delays. Runs entirely in-process; no terminal, no config file.
//!
//! Usage:
//!   cargo run -p carebot-simtest
//!   cargo run -p carebot-simtest -- --verbose

use std::sync::Arc;
use std::time::{Duration, Instant};

use carebot_engine::{Bot, DriftRound};
use carebot_logic::config::{BotConfig, DriftConfig, MessageConfig};
use carebot_logic::drift::{classify, DriftSource, ScriptedDrift, SeededDrift};
use carebot_logic::needs::{Flag, Need, NeedSnapshot};
use carebot_logic::report::compose_report;

// ── Scenario setup ──────────────────────────────────────────────────────

const STATUS_DELAY_MS: u64 = 5;
const ACTION_DELAY_MS: u64 = 20;

/// Rolls that land in each band under the default odds.
const QUIET: f64 = 0.1;
const HUNGER: f64 = 0.9;

fn harness_config() -> BotConfig {
    let mut config = BotConfig::default();
    config.timing.status_delay_ms = STATUS_DELAY_MS;
    config.timing.action_delay_ms = ACTION_DELAY_MS;
    config
}

fn bot_with(config: BotConfig, drift: Arc<dyn DriftSource>) -> Bot {
    let bot = Bot::with_drift(config, drift);
    bot.start();
    bot
}

fn scripted_bot(roll: f64) -> Bot {
    bot_with(harness_config(), Arc::new(ScriptedDrift::constant(roll)))
}

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

#[tokio::main]
async fn main() {
    let verbose = std::env::args().any(|a| a == "--verbose");
    println!("=== CareBot Simulation Harness ===\n");

    let mut results = Vec::new();

    // 1. Status report wording
    results.extend(validate_reports(verbose));

    // 2. Fast path when nothing is needed
    results.extend(validate_not_needed(verbose).await);

    // 3. Feed, then status under suppression
    results.extend(validate_suppression(verbose).await);

    // 4. Concurrent duplicate actions
    results.extend(validate_action_race(verbose).await);

    // 5. Actions never raise flags
    results.extend(validate_monotonic_actions(verbose).await);

    // 6. Shutdown interruption
    results.extend(validate_shutdown(verbose).await);

    // 7. Drift odds sweep
    results.extend(validate_drift_odds(verbose));

    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    // ── Summary ──
    println!();
    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

// ── 1. Status Reports ───────────────────────────────────────────────────

fn validate_reports(_verbose: bool) -> Vec<TestResult> {
    println!("--- Status Reports ---");
    let mut results = Vec::new();
    let messages = MessageConfig::default();

    let cases = [
        ("report_normal", false, false, "Normal"),
        ("report_hungry", true, false, "Hungry"),
        ("report_medication", false, true, "Medication needed"),
        ("report_both", true, true, "Hungry\nMedication needed"),
    ];
    for (name, hungry, needs_medication, expected) in cases {
        let report = compose_report(
            &NeedSnapshot {
                hungry,
                needs_medication,
            },
            &messages,
        );
        results.push(TestResult {
            name: name.into(),
            passed: report == expected,
            detail: format!("{:?}", report),
        });
    }

    results
}

// ── 2. Not Needed ───────────────────────────────────────────────────────

async fn validate_not_needed(_verbose: bool) -> Vec<TestResult> {
    println!("--- Not Needed ---");
    let mut results = Vec::new();
    let bot = scripted_bot(QUIET);

    let started = Instant::now();
    let fed = bot.request_feed().await.unwrap_or_default();
    let elapsed = started.elapsed();
    results.push(TestResult {
        name: "feed_not_hungry".into(),
        passed: fed == "Not hungry right now.",
        detail: fed,
    });
    results.push(TestResult {
        name: "feed_not_hungry_no_delay".into(),
        passed: elapsed < Duration::from_millis(ACTION_DELAY_MS),
        detail: format!("{:?} (action delay {}ms)", elapsed, ACTION_DELAY_MS),
    });

    let medicated = bot.request_medicate().await.unwrap_or_default();
    results.push(TestResult {
        name: "medicate_not_needed".into(),
        passed: medicated == "Doesn't need medication right now.",
        detail: medicated,
    });

    results.push(TestResult {
        name: "not_needed_leaves_suppression".into(),
        passed: !bot.needs().get(Flag::SuppressNextDrift),
        detail: "declined actions do not arm suppression".into(),
    });

    results
}

// ── 3. Suppression ──────────────────────────────────────────────────────

async fn validate_suppression(verbose: bool) -> Vec<TestResult> {
    println!("--- Suppression ---");
    let mut results = Vec::new();

    // Every unsuppressed round activates hunger
    let bot = scripted_bot(HUNGER);
    bot.needs().set(Flag::Hunger, true);

    let started = Instant::now();
    let fed = bot.request_feed().await.unwrap_or_default();
    let elapsed = started.elapsed();
    results.push(TestResult {
        name: "feed_administered".into(),
        passed: fed == "Food administered." && elapsed >= Duration::from_millis(ACTION_DELAY_MS),
        detail: format!("{} after {:?}", fed, elapsed),
    });

    let status = bot.request_status().await.unwrap_or_default();
    results.push(TestResult {
        name: "status_after_feed_suppressed".into(),
        passed: status == "Normal",
        detail: format!("{:?}", status),
    });

    let status = bot.request_status().await.unwrap_or_default();
    results.push(TestResult {
        name: "drift_resumes_next_round".into(),
        passed: status == "Hungry",
        detail: format!("{:?}", status),
    });

    // Racing feed and status: suppression may be consumed one round late
    let mut lost = 0;
    let trials = 25;
    for _ in 0..trials {
        bot.needs().set(Flag::Hunger, true);
        bot.needs().set(Flag::SuppressNextDrift, false);

        let feeder = bot.clone();
        let feed = tokio::spawn(async move { feeder.feed().await });
        let watcher = bot.clone();
        let racing = tokio::spawn(async move { watcher.status().await });

        let racing = racing.await.ok().and_then(Result::ok).map(|r| r.round);
        let _ = feed.await;
        let next = bot.status().await.ok().map(|r| r.round);

        let racing_suppressed = matches!(
            racing,
            Some(DriftRound::Suppressed | DriftRound::SuppressedLate(_))
        );
        if !racing_suppressed && next != Some(DriftRound::Suppressed) {
            lost += 1;
        }
        if verbose {
            println!("    racing={:?} next={:?}", racing, next);
        }
    }
    results.push(TestResult {
        name: "suppression_at_most_one_round_late".into(),
        passed: lost == 0,
        detail: format!("{}/{} trials lost suppression", lost, trials),
    });

    results
}

// ── 4. Action Race ──────────────────────────────────────────────────────

async fn validate_action_race(_verbose: bool) -> Vec<TestResult> {
    println!("--- Action Race ---");
    let mut results = Vec::new();
    let bot = scripted_bot(QUIET);
    bot.needs().set(Flag::Medication, true);

    let handles: Vec<_> = (0..50).map(|_| bot.request_medicate()).collect();
    let mut administered = 0;
    let mut declined = 0;
    for handle in handles {
        match handle.await.unwrap_or_default().as_str() {
            "Medication administered." => administered += 1,
            "Doesn't need medication right now." => declined += 1,
            _ => {}
        }
    }
    results.push(TestResult {
        name: "medicate_race_single_winner".into(),
        passed: administered == 1 && declined == 49,
        detail: format!("{} administered, {} declined", administered, declined),
    });

    bot.needs().set(Flag::Hunger, true);
    let handles: Vec<_> = (0..10).map(|_| bot.request_feed()).collect();
    let mut fed = 0;
    for handle in handles {
        if handle.await.unwrap_or_default() == "Food administered." {
            fed += 1;
        }
    }
    results.push(TestResult {
        name: "feed_race_single_winner".into(),
        passed: fed == 1 && !bot.needs().get(Flag::Hunger),
        detail: format!("{} of 10 feeds administered", fed),
    });

    results
}

// ── 5. Monotonic Actions ────────────────────────────────────────────────

async fn validate_monotonic_actions(_verbose: bool) -> Vec<TestResult> {
    println!("--- Monotonic Actions ---");
    let mut results = Vec::new();

    let mut config = harness_config();
    config.drift = DriftConfig {
        skip: 1.0,
        medication: 0.0,
        seed: None,
    };
    let bot = bot_with(config, Arc::new(SeededDrift::new(11)));

    let handles: Vec<_> = (0..45)
        .map(|i| match i % 3 {
            0 => bot.request_feed(),
            1 => bot.request_medicate(),
            _ => bot.request_status(),
        })
        .collect();

    let mut raised = 0;
    for _ in 0..10 {
        let snap = bot.needs().snapshot();
        if snap.hungry || snap.needs_medication {
            raised += 1;
        }
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
    for handle in handles {
        let _ = handle.await;
    }
    let snap = bot.needs().snapshot();
    results.push(TestResult {
        name: "actions_never_raise_flags".into(),
        passed: raised == 0 && !snap.hungry && !snap.needs_medication,
        detail: format!("{} samples saw a raised flag", raised),
    });

    results
}

// ── 6. Shutdown ─────────────────────────────────────────────────────────

async fn validate_shutdown(_verbose: bool) -> Vec<TestResult> {
    println!("--- Shutdown ---");
    let mut results = Vec::new();

    let mut config = harness_config();
    config.timing.action_delay_ms = 10_000;
    config.timing.status_delay_ms = 10_000;
    let bot = bot_with(config, Arc::new(ScriptedDrift::constant(HUNGER)));
    bot.needs().set(Flag::Medication, true);

    let medicate = bot.request_medicate();
    let status = bot.request_status();
    tokio::time::sleep(Duration::from_millis(20)).await;
    bot.shutdown();

    let medicated = medicate.await.unwrap_or_default();
    results.push(TestResult {
        name: "shutdown_interrupts_action".into(),
        passed: medicated == "Interrupted while administering medication.",
        detail: medicated,
    });
    let status = status.await.unwrap_or_default();
    results.push(TestResult {
        name: "shutdown_interrupts_status".into(),
        passed: status == "Interrupted before status could be determined",
        detail: status,
    });

    let snap = bot.needs().snapshot();
    results.push(TestResult {
        name: "shutdown_leaves_state".into(),
        passed: snap.needs_medication && !snap.hungry && !bot.needs().get(Flag::SuppressNextDrift),
        detail: format!("{:?}", snap),
    });

    let late = bot.request_feed().await.unwrap_or_default();
    results.push(TestResult {
        name: "shutdown_rejects_new_requests".into(),
        passed: late == "Bot is not running.",
        detail: late,
    });

    results
}

// ── 7. Drift Odds ───────────────────────────────────────────────────────

fn validate_drift_odds(verbose: bool) -> Vec<TestResult> {
    println!("--- Drift Odds ---");
    let mut results = Vec::new();

    let splits = [
        ("drift_odds_default", DriftConfig::default()),
        (
            "drift_odds_30_30_40",
            DriftConfig {
                skip: 0.3,
                medication: 0.3,
                seed: None,
            },
        ),
    ];

    const ROUNDS: u32 = 20_000;
    for (name, odds) in splits {
        let source = SeededDrift::new(2024);
        let mut quiet = 0u32;
        let mut medication = 0u32;
        let mut hunger = 0u32;
        for _ in 0..ROUNDS {
            match classify(source.roll(), &odds) {
                None => quiet += 1,
                Some(Need::Medication) => medication += 1,
                Some(Need::Hunger) => hunger += 1,
            }
        }
        let frac = |n: u32| n as f64 / ROUNDS as f64;
        let close = (frac(quiet) - odds.skip).abs() < 0.02
            && (frac(medication) - odds.medication).abs() < 0.02
            && (frac(hunger) - odds.hunger()).abs() < 0.02;
        if verbose {
            println!(
                "    {}: quiet={:.3} medication={:.3} hunger={:.3}",
                name,
                frac(quiet),
                frac(medication),
                frac(hunger)
            );
        }
        results.push(TestResult {
            name: name.into(),
            passed: close,
            detail: format!(
                "expected {:.2}/{:.2}/{:.2}, got {:.3}/{:.3}/{:.3}",
                odds.skip,
                odds.medication,
                odds.hunger(),
                frac(quiet),
                frac(medication),
                frac(hunger)
            ),
        });
    }

    results
}
