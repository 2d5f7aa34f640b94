//! Headless batch runner: simulates full matches on the embedded demo map
//! and emits one JSON result line per match on stdout, structured progress
//! logs on stderr and an optional run summary file. Non-zero exit when any
//! match produced an anomaly, so CI can gate on it.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use clap::Parser;
use serde::Serialize;
use serde_json::{json, Value};

use tac_core::data::embedded;
use tac_core::engine::constants::round;
use tac_core::{
    BuyStrategy, CtTactic, MatchSimulator, Phase, SimConfig, StrategyCommand, TTactic,
};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Base seed; match N runs with seed + N.
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Number of matches to simulate.
    #[arg(long, default_value_t = 1)]
    matches: u32,
    /// T-side tactic for every round (e.g. rush-a, execute-b, default).
    #[arg(long, default_value = "default")]
    t_tactic: String,
    /// CT-side tactic for every round (e.g. standard, retake-setup).
    #[arg(long, default_value = "standard")]
    ct_tactic: String,
    /// Buy strategy for both sides (full, force, half, eco, bonus, hero).
    #[arg(long, default_value = "half")]
    buy: String,
    #[arg(long)]
    run_id: Option<String>,
    #[arg(long)]
    summary_out: Option<PathBuf>,
}

#[derive(Clone, Debug, Serialize)]
struct MatchResultLine {
    seed: u64,
    #[serde(rename = "tScore")]
    t_score: u8,
    #[serde(rename = "ctScore")]
    ct_score: u8,
    rounds: usize,
    ticks: u64,
    kills: u32,
    #[serde(rename = "bombPlants")]
    bomb_plants: u32,
    #[serde(rename = "reasonCounts")]
    reason_counts: BTreeMap<String, usize>,
    anomalies: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
struct RunSummary {
    #[serde(rename = "runId")]
    run_id: String,
    #[serde(rename = "startedAtMs")]
    started_at_ms: u64,
    #[serde(rename = "finishedAtMs")]
    finished_at_ms: u64,
    #[serde(rename = "matchCount")]
    match_count: usize,
    #[serde(rename = "anomalyCount")]
    anomaly_count: usize,
    #[serde(rename = "tWins")]
    t_wins: usize,
    #[serde(rename = "ctWins")]
    ct_wins: usize,
    matches: Vec<MatchResultLine>,
}

#[derive(Clone, Debug, Serialize)]
struct StructuredLogLine {
    #[serde(rename = "timestampMs")]
    timestamp_ms: u64,
    level: String,
    event: String,
    #[serde(rename = "runId")]
    run_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u64>,
    details: Value,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let strategy = match build_strategy(&cli) {
        Ok(strategy) => strategy,
        Err(message) => {
            eprintln!("{}", message);
            std::process::exit(2);
        }
    };

    let started_at_ms = now_ms();
    let run_id = cli.run_id.clone().unwrap_or_else(|| format!("tacsim-{}-{}", cli.seed, started_at_ms));

    let mut results = Vec::new();
    let mut anomaly_count = 0usize;
    let mut t_wins = 0usize;
    let mut ct_wins = 0usize;

    for index in 0..cli.matches {
        let seed = cli.seed + index as u64;
        emit_log("info", "match_started", &run_id, Some(seed), json!({ "index": index }));

        let result = match run_match(seed, &strategy) {
            Ok(result) => result,
            Err(error) => {
                emit_log(
                    "error",
                    "match_failed",
                    &run_id,
                    Some(seed),
                    json!({ "error": error.to_string() }),
                );
                std::process::exit(2);
            }
        };

        anomaly_count += result.anomalies.len();
        if result.t_score > result.ct_score {
            t_wins += 1;
        } else if result.ct_score > result.t_score {
            ct_wins += 1;
        }

        emit_log(
            "info",
            "match_finished",
            &run_id,
            Some(seed),
            json!({
                "tScore": result.t_score,
                "ctScore": result.ct_score,
                "rounds": result.rounds,
                "anomalyCount": result.anomalies.len(),
            }),
        );

        println!("{}", serde_json::to_string(&result).expect("match result should serialize"));
        results.push(result);
    }

    let summary = RunSummary {
        run_id: run_id.clone(),
        started_at_ms,
        finished_at_ms: now_ms(),
        match_count: results.len(),
        anomaly_count,
        t_wins,
        ct_wins,
        matches: results,
    };

    if let Some(path) = cli.summary_out.as_ref() {
        if let Err(error) = write_summary(path, &summary) {
            emit_log(
                "error",
                "summary_write_failed",
                &run_id,
                None,
                json!({ "path": path.to_string_lossy(), "error": error.to_string() }),
            );
            std::process::exit(2);
        }
    }

    emit_log(
        "info",
        "run_finished",
        &run_id,
        None,
        json!({
            "matchCount": summary.match_count,
            "anomalyCount": summary.anomaly_count,
            "tWins": summary.t_wins,
            "ctWins": summary.ct_wins,
        }),
    );

    if anomaly_count > 0 {
        std::process::exit(1);
    }
}

fn run_match(seed: u64, strategy: &StrategyCommand) -> tac_core::Result<MatchResultLine> {
    let mesh = embedded::demo_mesh()?;
    let zones = embedded::demo_map()?;
    let roster = embedded::demo_roster();
    let mut sim = MatchSimulator::new(mesh, zones, roster, SimConfig { seed, ..Default::default() })?;

    sim.apply_strategies(strategy.clone())?;
    sim.start();

    let mut anomalies = Vec::new();
    let mut bomb_plants = 0u32;
    let mut last_tick = 0u64;
    let tick_cap = round::MAX_ROUNDS * (round::ROUND_TIME_TICKS + round::BOMB_TIMER_TICKS + 20);

    for _ in 0..tick_cap {
        let snapshot = sim.tick();
        last_tick = snapshot.tick_count;
        for event in &snapshot.events {
            if event.contains("planted the bomb") {
                bomb_plants += 1;
            }
            if event.starts_with("Anomaly") {
                anomalies.push(event.clone());
            }
        }
        for bot in &snapshot.bots {
            if bot.hp > 100 {
                anomalies.push(format!("{} hp out of range: {}", bot.name, bot.hp));
            }
        }
        match sim.phase() {
            Phase::RoundEnd => {
                sim.next_round()?;
                sim.apply_strategies(strategy.clone())?;
                sim.start();
            }
            Phase::MatchEnd => break,
            _ => {}
        }
    }
    if sim.phase() != Phase::MatchEnd {
        anomalies.push("tick safety limit exceeded".to_string());
    }

    let final_snap = sim.tick();
    let kills = final_snap.stats.iter().map(|s| s.kills).sum();
    let state = sim.match_state();
    let mut reason_counts: BTreeMap<String, usize> = BTreeMap::new();
    for record in &state.history {
        *reason_counts.entry(format!("{:?}", record.reason)).or_insert(0) += 1;
    }

    Ok(MatchResultLine {
        seed,
        t_score: state.scores.t,
        ct_score: state.scores.ct,
        rounds: state.history.len(),
        ticks: last_tick,
        kills,
        bomb_plants,
        reason_counts,
        anomalies,
    })
}

fn build_strategy(cli: &Cli) -> Result<StrategyCommand, String> {
    let buy = parse_buy(&cli.buy)?;
    Ok(StrategyCommand {
        t_buy: buy,
        ct_buy: buy,
        t_tactic: parse_t_tactic(&cli.t_tactic)?,
        ct_tactic: parse_ct_tactic(&cli.ct_tactic)?,
        ..Default::default()
    })
}

fn parse_buy(value: &str) -> Result<BuyStrategy, String> {
    match value.to_ascii_lowercase().as_str() {
        "full" => Ok(BuyStrategy::Full),
        "force" => Ok(BuyStrategy::Force),
        "half" => Ok(BuyStrategy::Half),
        "eco" => Ok(BuyStrategy::Eco),
        "bonus" => Ok(BuyStrategy::Bonus),
        "hero" => Ok(BuyStrategy::Hero),
        other => Err(format!("unknown buy strategy: {}", other)),
    }
}

fn parse_t_tactic(value: &str) -> Result<TTactic, String> {
    match value.to_ascii_lowercase().as_str() {
        "default" => Ok(TTactic::Default),
        "rush-a" => Ok(TTactic::RushA),
        "rush-b" => Ok(TTactic::RushB),
        "execute-a" => Ok(TTactic::ExecuteA),
        "execute-b" => Ok(TTactic::ExecuteB),
        "split-a" => Ok(TTactic::SplitA),
        "split-b" => Ok(TTactic::SplitB),
        "contact-a" => Ok(TTactic::ContactA),
        "contact-b" => Ok(TTactic::ContactB),
        other => Err(format!("unknown T tactic: {}", other)),
    }
}

fn parse_ct_tactic(value: &str) -> Result<CtTactic, String> {
    match value.to_ascii_lowercase().as_str() {
        "standard" => Ok(CtTactic::Standard),
        "aggressive-push" => Ok(CtTactic::AggressivePush),
        "stack-a" => Ok(CtTactic::GambleStackA),
        "stack-b" => Ok(CtTactic::GambleStackB),
        "retake-setup" => Ok(CtTactic::RetakeSetup),
        other => Err(format!("unknown CT tactic: {}", other)),
    }
}

fn emit_log(level: &str, event: &str, run_id: &str, seed: Option<u64>, details: Value) {
    let line = StructuredLogLine {
        timestamp_ms: now_ms(),
        level: level.to_string(),
        event: event.to_string(),
        run_id: run_id.to_string(),
        seed,
        details,
    };
    eprintln!("{}", serde_json::to_string(&line).expect("structured log should serialize"));
}

fn now_ms() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis() as u64
}

fn write_summary(path: &Path, summary: &RunSummary) -> io::Result<()> {
    let text = serde_json::to_string_pretty(summary).expect("run summary should serialize");
    std::fs::write(path, text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_buy_accepts_all_variants() {
        for (input, expected) in [
            ("full", BuyStrategy::Full),
            ("ECO", BuyStrategy::Eco),
            ("Hero", BuyStrategy::Hero),
        ] {
            assert_eq!(parse_buy(input).unwrap(), expected);
        }
        assert!(parse_buy("yolo").is_err());
    }

    #[test]
    fn parse_tactics_accept_kebab_case() {
        assert_eq!(parse_t_tactic("rush-b").unwrap(), TTactic::RushB);
        assert_eq!(parse_ct_tactic("retake-setup").unwrap(), CtTactic::RetakeSetup);
        assert!(parse_t_tactic("rush-c").is_err());
    }

    #[test]
    fn run_match_produces_a_terminated_result() {
        let strategy = StrategyCommand::default();
        let result = run_match(99, &strategy).unwrap();
        assert!(result.rounds > 0);
        assert_eq!(result.rounds, result.t_score as usize + result.ct_score as usize);
        assert!(!result.anomalies.iter().any(|a| a.contains("safety limit")));
    }

    #[test]
    fn same_seed_gives_same_result_line() {
        let strategy = StrategyCommand::default();
        let a = run_match(7, &strategy).unwrap();
        let b = run_match(7, &strategy).unwrap();
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }
}
