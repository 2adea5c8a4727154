use std::time::{Duration, Instant};
use parking_lot::Mutex;
use serde::{Serialize, Deserialize};

/// Named phases of query execution that get timed individually
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimingType {
    Rewrite,
    Weight,
    BuildScorer,
    NextDoc,
    Score,
}

impl TimingType {
    pub const ALL: [TimingType; 5] = [
        TimingType::Rewrite,
        TimingType::Weight,
        TimingType::BuildScorer,
        TimingType::NextDoc,
        TimingType::Score,
    ];

    fn slot(self) -> usize {
        match self {
            TimingType::Rewrite => 0,
            TimingType::Weight => 1,
            TimingType::BuildScorer => 2,
            TimingType::NextDoc => 3,
            TimingType::Score => 4,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct PhaseTiming {
    started: Option<Instant>,
    elapsed: Duration,
    count: u64,
}

/// Per-query-node timing record.
///
/// Timings only accumulate; nothing ever resets them. Handles are shared
/// between the profiler tree and the weights/scorers that report into it.
#[derive(Debug, Default)]
pub struct Breakdown {
    phases: Mutex<[PhaseTiming; 5]>,
}

impl Breakdown {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&self, timing: TimingType) {
        let mut phases = self.phases.lock();
        phases[timing.slot()].started = Some(Instant::now());
    }

    /// Records elapsed time since the matching start. A stop without a
    /// pending start is ignored rather than corrupting the record.
    pub fn stop(&self, timing: TimingType) {
        let mut phases = self.phases.lock();
        let phase = &mut phases[timing.slot()];
        if let Some(started) = phase.started.take() {
            phase.elapsed += started.elapsed();
            phase.count += 1;
        }
    }

    pub fn elapsed(&self, timing: TimingType) -> Duration {
        self.phases.lock()[timing.slot()].elapsed
    }

    pub fn count(&self, timing: TimingType) -> u64 {
        self.phases.lock()[timing.slot()].count
    }

    /// Immutable snapshot for reporting
    pub fn record(&self) -> BreakdownRecord {
        let phases = self.phases.lock();
        BreakdownRecord {
            timings: TimingType::ALL
                .iter()
                .map(|t| TimingRecord {
                    phase: *t,
                    nanos: phases[t.slot()].elapsed.as_nanos() as u64,
                    count: phases[t.slot()].count,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreakdownRecord {
    pub timings: Vec<TimingRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingRecord {
    pub phase: TimingType,
    pub nanos: u64,
    pub count: u64,
}

impl BreakdownRecord {
    pub fn nanos(&self, phase: TimingType) -> u64 {
        self.timings
            .iter()
            .find(|t| t.phase == phase)
            .map(|t| t.nanos)
            .unwrap_or(0)
    }

    pub fn count(&self, phase: TimingType) -> u64 {
        self.timings
            .iter()
            .find(|t| t.phase == phase)
            .map(|t| t.count)
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_stop_accumulates_elapsed_and_count() {
        let breakdown = Breakdown::new();
        breakdown.start(TimingType::Weight);
        breakdown.stop(TimingType::Weight);
        breakdown.start(TimingType::Weight);
        breakdown.stop(TimingType::Weight);

        assert_eq!(breakdown.count(TimingType::Weight), 2);
        assert!(breakdown.elapsed(TimingType::Weight) >= Duration::ZERO);
        assert_eq!(breakdown.count(TimingType::Score), 0);
    }

    #[test]
    fn stop_without_start_is_ignored() {
        let breakdown = Breakdown::new();
        breakdown.stop(TimingType::Rewrite);
        assert_eq!(breakdown.count(TimingType::Rewrite), 0);
        assert_eq!(breakdown.elapsed(TimingType::Rewrite), Duration::ZERO);
    }

    #[test]
    fn record_snapshots_all_phases() {
        let breakdown = Breakdown::new();
        breakdown.start(TimingType::Score);
        breakdown.stop(TimingType::Score);

        let record = breakdown.record();
        assert_eq!(record.timings.len(), TimingType::ALL.len());
        assert_eq!(record.count(TimingType::Score), 1);
        assert_eq!(record.count(TimingType::NextDoc), 0);
    }
}
