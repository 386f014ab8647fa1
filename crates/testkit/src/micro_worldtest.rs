//! Micro-worldtest harness for deterministic, tick-based traces.
//!
//! A micro-worldtest steps a tiny simulation for a fixed number of ticks and
//! snapshots selected state each tick. Two runs from the same inputs must yield
//! byte-identical traces, which is what the determinism tests compare.

use crate::{EventRecord, JsonlSink};
use anyhow::Result;
use serde::Serialize;
use voxelwalk_core::SimTick;

/// Configuration for a micro-worldtest.
#[derive(Debug, Clone)]
pub struct MicroWorldtestConfig {
    /// Human-readable name (written into the report).
    pub name: String,
    /// Number of ticks to step (report includes the initial snapshot at tick 0).
    pub ticks: u64,
}

/// Single snapshot frame captured at a given tick.
#[derive(Debug, Clone, Serialize)]
pub struct MicroWorldtestFrame<S> {
    /// Tick number.
    pub tick: u64,
    /// Snapshot payload.
    pub snapshot: S,
}

/// Every frame captured by one run.
#[derive(Debug, Clone, Serialize)]
pub struct MicroWorldtestReport<S> {
    /// Name from the config.
    pub name: String,
    /// Frames in tick order.
    pub frames: Vec<MicroWorldtestFrame<S>>,
}

impl<S: Serialize> MicroWorldtestReport<S> {
    /// Pretty JSON for comparisons and failure output.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Stream every frame to `sink` as one record each.
    pub fn write_jsonl(&self, sink: &mut JsonlSink) -> Result<()> {
        for frame in &self.frames {
            sink.write(&EventRecord {
                tick: SimTick(frame.tick),
                kind: &self.name,
                payload: &frame.snapshot,
            })?;
        }
        sink.flush()
    }

    /// Last frame's snapshot.
    pub fn last(&self) -> Option<&S> {
        self.frames.last().map(|frame| &frame.snapshot)
    }
}

/// Run a micro-worldtest and return its report.
///
/// Captures the initial snapshot at tick 0, then steps `config.ticks` times,
/// capturing a snapshot after each step (so the report contains `ticks + 1` frames).
pub fn run_micro_worldtest<State, Snapshot, StepFn, SnapFn>(
    config: MicroWorldtestConfig,
    mut state: State,
    mut step: StepFn,
    mut snapshot: SnapFn,
) -> MicroWorldtestReport<Snapshot>
where
    Snapshot: Serialize,
    StepFn: FnMut(SimTick, &mut State),
    SnapFn: FnMut(SimTick, &State) -> Snapshot,
{
    let mut frames = Vec::with_capacity(config.ticks as usize + 1);

    let mut tick = SimTick::ZERO;
    frames.push(MicroWorldtestFrame {
        tick: tick.0,
        snapshot: snapshot(tick, &state),
    });

    for _ in 0..config.ticks {
        step(tick, &mut state);
        tick = tick.advance(1);
        frames.push(MicroWorldtestFrame {
            tick: tick.0,
            snapshot: snapshot(tick, &state),
        });
    }

    MicroWorldtestReport {
        name: config.name,
        frames,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_has_initial_frame_plus_one_per_tick() {
        let report = run_micro_worldtest(
            MicroWorldtestConfig {
                name: "counter".into(),
                ticks: 4,
            },
            0u32,
            |_, value| *value += 2,
            |tick, value| (tick.0, *value),
        );
        assert_eq!(report.frames.len(), 5);
        assert_eq!(report.frames[0].snapshot, (0, 0));
        assert_eq!(report.last(), Some(&(4, 8)));
        assert!(report.to_json().unwrap().contains("counter"));
    }
}
