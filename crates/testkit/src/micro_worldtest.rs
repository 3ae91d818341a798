//! Micro-worldtest harness for deterministic, tick-based snapshot tests.
//!
//! A micro-worldtest steps a small scenario for a fixed number of ticks and
//! snapshots selected state at tick 0, every `sample_every` ticks and after
//! the last step. The report is compared against a golden JSON file (or
//! written when `MINERWORKS_UPDATE_SNAPSHOTS=1` is set).

use crate::snapshot::assert_json_snapshot;
use anyhow::{Context, Result};
use minerworks_core::SimTick;
use serde::Serialize;
use std::path::PathBuf;

/// Configuration for a micro-worldtest.
#[derive(Debug, Clone)]
pub struct MicroWorldtestConfig {
    /// Human-readable name (written into the snapshot report).
    pub name: String,
    /// Number of ticks to step.
    pub ticks: u64,
    /// Frame sampling period; 0 or 1 captures every tick.
    pub sample_every: u64,
    /// Path to the golden JSON file.
    pub snapshot_path: PathBuf,
}

/// Single snapshot frame captured at a given tick.
#[derive(Debug, Clone, Serialize)]
pub struct MicroWorldtestFrame<S> {
    /// Tick number.
    pub tick: u64,
    /// Snapshot payload.
    pub snapshot: S,
}

/// Frames captured by a run.
#[derive(Debug, Clone, Serialize)]
pub struct MicroWorldtestReport<S> {
    /// Scenario name.
    pub name: String,
    /// Captured frames in tick order.
    pub frames: Vec<MicroWorldtestFrame<S>>,
}

/// Step a scenario and collect its frames without touching the filesystem.
pub fn record_micro_worldtest<State, Snapshot, StepFn, SnapFn>(
    config: &MicroWorldtestConfig,
    state: &mut State,
    mut step: StepFn,
    mut snapshot: SnapFn,
) -> Result<MicroWorldtestReport<Snapshot>>
where
    StepFn: FnMut(SimTick, &mut State) -> Result<()>,
    SnapFn: FnMut(SimTick, &State) -> Snapshot,
{
    let every = config.sample_every.max(1);
    let mut frames = vec![MicroWorldtestFrame {
        tick: 0,
        snapshot: snapshot(SimTick::ZERO, state),
    }];

    let mut tick = SimTick::ZERO;
    for _ in 0..config.ticks {
        step(tick, state).with_context(|| format!("{} failed at tick {}", config.name, tick.0))?;
        tick = tick.advance(1);
        if tick.0 % every == 0 || tick.0 == config.ticks {
            frames.push(MicroWorldtestFrame {
                tick: tick.0,
                snapshot: snapshot(tick, state),
            });
        }
    }

    Ok(MicroWorldtestReport {
        name: config.name.clone(),
        frames,
    })
}

/// Run a micro-worldtest and assert (or update) the snapshot at
/// `config.snapshot_path`.
pub fn run_micro_worldtest<State, Snapshot, StepFn, SnapFn>(
    config: MicroWorldtestConfig,
    mut state: State,
    step: StepFn,
    snapshot: SnapFn,
) -> Result<()>
where
    Snapshot: Serialize,
    StepFn: FnMut(SimTick, &mut State) -> Result<()>,
    SnapFn: FnMut(SimTick, &State) -> Snapshot,
{
    let report = record_micro_worldtest(&config, &mut state, step, snapshot)?;
    assert_json_snapshot(&config.snapshot_path, &report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_are_sampled_and_final_tick_is_kept() {
        let config = MicroWorldtestConfig {
            name: "counter".into(),
            ticks: 7,
            sample_every: 3,
            snapshot_path: PathBuf::new(),
        };
        let mut counter = 0u32;
        let report = record_micro_worldtest(
            &config,
            &mut counter,
            |_, c| {
                *c += 1;
                Ok(())
            },
            |_, c| *c,
        )
        .unwrap();
        let ticks: Vec<u64> = report.frames.iter().map(|f| f.tick).collect();
        assert_eq!(ticks, vec![0, 3, 6, 7]);
        assert_eq!(report.frames.last().unwrap().snapshot, 7);
    }

    #[test]
    fn step_errors_carry_the_tick() {
        let config = MicroWorldtestConfig {
            name: "boom".into(),
            ticks: 5,
            sample_every: 1,
            snapshot_path: PathBuf::new(),
        };
        let err = record_micro_worldtest(
            &config,
            &mut (),
            |tick, _| {
                if tick.0 == 2 {
                    anyhow::bail!("exploded");
                }
                Ok(())
            },
            |_, _| 0,
        )
        .unwrap_err();
        assert!(err.to_string().contains("boom failed at tick 2"));
    }
}
