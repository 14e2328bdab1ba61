use strum::{EnumCount as _, IntoEnumIterator};

use crate::fields::{CpuMetric, MemMetric, Snapshot};

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum MetricError {
    /// A cumulative CPU counter went backwards. The kernel reports these as
    /// monotonically non-decreasing for a live process, so a regression means
    /// the snapshot belongs to a different process (pid reuse) or is corrupt.
    #[error("cpu {} time regressed from {prev}s to {next}s", .metric.name())]
    CpuRegressed {
        metric: CpuMetric,
        prev: f64,
        next: f64,
    },
}

/// Metrics folded over one launch-to-exit run of a target program.
///
/// A fresh record is created per trial and fed every successful snapshot in
/// observation order: memory gauges keep their maximum, CPU counters keep the
/// latest value. Memory gauges start at negative infinity so that any real
/// sample supersedes them; a record that never saw a snapshot stays
/// unmeasured and reports `None` for every gauge. Zero is deliberately not
/// used as the initial value, since it would be indistinguishable from a
/// measured zero.
#[derive(Debug, Clone, PartialEq)]
pub struct TrialRecord {
    mem: [f64; MemMetric::COUNT],
    cpu: [f64; CpuMetric::COUNT],
    snapshots: u32,
}

impl TrialRecord {
    #[must_use]
    pub fn new() -> Self {
        Self {
            mem: [f64::NEG_INFINITY; MemMetric::COUNT],
            cpu: [0.0; CpuMetric::COUNT],
            snapshots: 0,
        }
    }

    /// Folds one snapshot into the record.
    ///
    /// The CPU counters are validated before anything is mutated, so a
    /// rejected snapshot leaves the record unchanged.
    pub fn observe(&mut self, snap: &Snapshot) -> Result<(), MetricError> {
        for metric in CpuMetric::iter() {
            let prev = self.cpu[metric as usize];
            let next = snap.cpu.value(metric);
            if next < prev {
                return Err(MetricError::CpuRegressed { metric, prev, next });
            }
        }

        for metric in MemMetric::iter() {
            let sample = snap.mem.value(metric) as f64;
            let running = &mut self.mem[metric as usize];
            if sample > *running {
                *running = sample;
            }
        }
        for metric in CpuMetric::iter() {
            self.cpu[metric as usize] = snap.cpu.value(metric);
        }

        self.snapshots += 1;
        Ok(())
    }

    /// Number of snapshots successfully folded in.
    #[must_use]
    pub fn snapshots(&self) -> u32 {
        self.snapshots
    }

    /// Whether at least one snapshot was taken before the child exited.
    #[must_use]
    pub fn is_measured(&self) -> bool {
        self.snapshots > 0
    }

    /// Peak value of a memory gauge, or `None` if the trial was too
    /// short-lived to observe any.
    #[must_use]
    pub fn mem(&self, metric: MemMetric) -> Option<f64> {
        let v = self.mem[metric as usize];
        v.is_finite().then_some(v)
    }

    /// Last observed value of a cumulative CPU counter, in seconds.
    #[must_use]
    pub fn cpu(&self, metric: CpuMetric) -> f64 {
        self.cpu[metric as usize]
    }
}

impl Default for TrialRecord {
    fn default() -> Self {
        Self::new()
    }
}
