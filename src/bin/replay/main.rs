// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Airways Disruption Simulator - Headless Scenario Replay
//
// Usage:
//   cargo run --release --bin replay                     # Replay every scenario
//   cargo run --release --bin replay -- --ticks 120      # Frames per phase
//   cargo run --release --bin replay -- --hub            # Start in hub mode
//   cargo run --release --bin replay -- --json           # Print the JSON report
//   cargo run --release --bin replay -- Frankfurt        # Filter by name

mod report;

use airways_engine::presets;
use airways_engine::{AirwaysSession, Command, CommandStatus, FlightStatus, ScenarioTrack, SessionConfig};
use report::*;
use std::time::Instant;

const FRAME_SECS: f64 = 1.0 / 60.0;

// ─── CLI Parsing ─────────────────────────────────────────────────────────────

struct CliArgs {
    seed: u64,
    ticks: u64,
    hub: bool,
    json: bool,
    filter: Option<String>,
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut cli = CliArgs { seed: 0, ticks: 90, hub: false, json: false, filter: None };

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--seed" => {
                i += 1;
                if i < args.len() {
                    cli.seed = args[i].parse().unwrap_or(0);
                }
            }
            "--ticks" => {
                i += 1;
                if i < args.len() {
                    cli.ticks = args[i].parse().unwrap_or(90);
                }
            }
            "--hub" => cli.hub = true,
            "--json" => cli.json = true,
            arg if !arg.starts_with('-') => {
                cli.filter = Some(arg.to_string());
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
            }
        }
        i += 1;
    }

    cli
}

// ─── Replay ──────────────────────────────────────────────────────────────────

fn run_ticks(session: &mut AirwaysSession, ticks: u64) -> usize {
    (0..ticks).map(|_| session.tick_core(FRAME_SECS).violations.len()).sum()
}

fn sorted_route_ids(session: &AirwaysSession) -> Vec<String> {
    let mut ids: Vec<String> = session.world().registry().route_ids().into_iter().map(|id| id.0).collect();
    ids.sort();
    ids
}

fn replay(cli: &CliArgs, track: ScenarioTrack, index: usize) -> ScenarioRun {
    let start = Instant::now();
    let config = SessionConfig { seed: cli.seed, ..SessionConfig::default() };
    let hub = config.hub.clone();
    let mut session = AirwaysSession::with_config(config);
    if cli.hub {
        session.dispatch(Command::SetTopology { topology: presets::hub_topology(&hub) });
    }

    let mut violations = run_ticks(&mut session, cli.ticks);
    let routes_before = sorted_route_ids(&session);

    // Each disrupt advances the track cursor and supersedes the previous one.
    let mut disrupted = None;
    for _ in 0..=index {
        disrupted = Some(session.dispatch(Command::Disrupt { track }));
    }
    let routes_disrupted = disrupted.map_or(0, |r| r.snapshot.disrupted.len());
    let paused_after_disrupt = session.world().traffic().paused_count();
    violations += run_ticks(&mut session, cli.ticks);

    let corrected = session.dispatch(Command::Correct);
    let (correction_status, stranded) = match corrected.status {
        CommandStatus::Applied => ("applied".to_string(), Vec::new()),
        CommandStatus::Partial { stranded } => ("partial".to_string(), stranded),
        CommandStatus::NoOp { reason } => (format!("no-op: {}", reason), Vec::new()),
    };
    violations += run_ticks(&mut session, cli.ticks);

    let traffic = session.world().traffic();
    let rerouted = traffic.flights().iter().filter(|f| f.binding.status() == FlightStatus::Rerouted).count();

    ScenarioRun {
        track: track.to_string(),
        index,
        name: session.engine().book().name(track, index).unwrap_or("?").to_string(),
        topology: session.snapshot().topology,
        seed: cli.seed,
        routes_before: routes_before.len(),
        routes_disrupted,
        paused_after_disrupt,
        correction_status,
        stranded,
        rerouted,
        paused_at_end: traffic.paused_count(),
        routes_restored: sorted_route_ids(&session) == routes_before,
        violations,
        ticks: cli.ticks * 3,
        elapsed_ms: start.elapsed().as_millis(),
    }
}

// ─── Main ────────────────────────────────────────────────────────────────────

fn main() {
    #[cfg(not(target_arch = "wasm32"))]
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = parse_args();
    let book = presets::scenario_book();

    let mut plan: Vec<(ScenarioTrack, usize, String)> = Vec::new();
    for track in [ScenarioTrack::Routes, ScenarioTrack::Airports] {
        for index in 0..book.len(track) {
            let name = book.name(track, index).unwrap_or_default().to_string();
            plan.push((track, index, name));
        }
    }
    if let Some(f) = &cli.filter {
        let f_lower = f.to_lowercase();
        plan.retain(|(_, _, name)| name.to_lowercase().contains(&f_lower));
    }
    if plan.is_empty() {
        eprintln!("No scenarios match filter: {:?}", cli.filter);
        std::process::exit(1);
    }

    if !cli.json {
        println!("\n  Airways Scenario Replay");
        println!("  PRNG: ChaCha8Rng | Seed: {} | Ticks/phase: {} | Hub mode: {}", cli.seed, cli.ticks, cli.hub);
        println!("  Replaying {} scenario(s)...\n", plan.len());
        println!(
            "  {:<8} {:<50} {:>6} {:>7} {:>9} {:>8} {:>6}",
            "Track", "Scenario", "Routes", "Paused", "Status", "Rerouted", "Time"
        );
        println!("  {}", "-".repeat(102));
    }

    let mut runs = Vec::new();
    for (track, index, _) in &plan {
        let run = replay(&cli, *track, *index);
        if !cli.json {
            println!(
                "  {:<8} {:<50} {:>6} {:>7} {:>9} {:>8} {:>4}ms  {}",
                run.track,
                run.name,
                run.routes_before,
                run.paused_after_disrupt,
                run.correction_status,
                run.rerouted,
                run.elapsed_ms,
                if run.pass() { "PASS" } else { "FAIL" },
            );
        }
        runs.push(run);
    }

    let summary = Summary::from_runs(&runs);
    let failed = summary.failed;

    if cli.json {
        let report = ReplayReport {
            version: env!("CARGO_PKG_VERSION"),
            prng: "ChaCha8Rng",
            seed: cli.seed,
            ticks_per_phase: cli.ticks,
            summary,
            runs,
        };
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Failed to serialize report: {}", e);
                std::process::exit(2);
            }
        }
    } else {
        println!("  {}", "-".repeat(102));
        println!("  Total: {}  Passed: {}  Failed: {}\n", summary.total, summary.passed, summary.failed);
    }

    if failed > 0 {
        std::process::exit(1);
    }
}
