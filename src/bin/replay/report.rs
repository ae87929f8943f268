// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Airways Disruption Simulator - Replay Report Types

use serde::Serialize;

// ─── Single-Scenario Result ──────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct ScenarioRun {
    pub track: String,
    pub index: usize,
    pub name: String,
    pub topology: String,
    pub seed: u64,
    pub routes_before: usize,
    pub routes_disrupted: usize,
    pub paused_after_disrupt: usize,
    pub correction_status: String,
    pub stranded: Vec<String>,
    pub rerouted: usize,
    pub paused_at_end: usize,
    pub routes_restored: bool,
    pub violations: usize,
    pub ticks: u64,
    pub elapsed_ms: u128,
}

impl ScenarioRun {
    /// Healthy replay: nothing left paused, no binding violations, base
    /// routes intact after the correction.
    pub fn pass(&self) -> bool {
        self.paused_at_end == 0 && self.violations == 0 && self.routes_restored
    }
}

// ─── Top-Level Report ────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ReplayReport {
    pub version: &'static str,
    pub prng: &'static str,
    pub seed: u64,
    pub ticks_per_phase: u64,
    pub summary: Summary,
    pub runs: Vec<ScenarioRun>,
}

#[derive(Debug, Serialize)]
pub struct Summary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
}

impl Summary {
    pub fn from_runs(runs: &[ScenarioRun]) -> Self {
        let passed = runs.iter().filter(|r| r.pass()).count();
        Self { total: runs.len(), passed, failed: runs.len() - passed }
    }
}
