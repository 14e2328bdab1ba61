use strum::{EnumCount as _, IntoEnumIterator};

use crate::fields::{CpuMetric, MemMetric};
use crate::trial::TrialRecord;

/// Streaming count / mean / stdev / max over a sequence of samples
/// (Welford's algorithm, so folding order does not hurt precision).
#[derive(Debug, Clone, Copy)]
pub struct RunningStats {
    n: u64,
    mean: f64,
    m2: f64,
    max: f64,
}

impl RunningStats {
    pub fn push(&mut self, x: f64) {
        self.n = self.n.saturating_add(1);
        let n_f = self.n as f64;

        let delta = x - self.mean;
        self.mean += delta / n_f;
        let delta2 = x - self.mean;
        self.m2 += delta * delta2;

        if x > self.max {
            self.max = x;
        }
    }

    #[must_use]
    pub fn n(&self) -> u64 {
        self.n
    }

    #[must_use]
    pub fn mean(&self) -> f64 {
        self.mean
    }

    #[must_use]
    pub fn stdev(&self) -> f64 {
        if self.n < 2 {
            return 0.0;
        }
        (self.m2 / (self.n as f64 - 1.0)).sqrt()
    }

    /// Largest sample pushed so far; negative infinity while empty.
    #[must_use]
    pub fn max(&self) -> f64 {
        self.max
    }
}

impl Default for RunningStats {
    fn default() -> Self {
        Self {
            n: 0,
            mean: 0.0,
            m2: 0.0,
            max: f64::NEG_INFINITY,
        }
    }
}

/// Reduces a set of per-trial records into one aggregate.
///
/// Unmeasured trials (the child exited before a single snapshot) reduce the
/// effective sample count instead of being blended in as zeros; `min_measured`
/// is the floor below which the whole aggregate is reported as unmeasured.
#[derive(Debug, Clone, Copy)]
pub struct Aggregator {
    min_measured: u32,
}

impl Aggregator {
    #[must_use]
    pub fn new(min_measured: u32) -> Self {
        Self { min_measured }
    }

    pub fn aggregate<'a, I>(&self, records: I) -> AggregateRecord
    where
        I: IntoIterator<Item = &'a TrialRecord>,
    {
        let mut agg = AggregateRecord::new(self.min_measured);
        for record in records {
            agg.fold(record);
        }
        agg
    }
}

/// Field-by-field statistics over the measured trials of one benchmark input.
#[derive(Debug, Clone)]
pub struct AggregateRecord {
    mem: [RunningStats; MemMetric::COUNT],
    cpu: [RunningStats; CpuMetric::COUNT],
    attempted: u32,
    measured: u32,
    min_measured: u32,
}

impl AggregateRecord {
    fn new(min_measured: u32) -> Self {
        Self {
            mem: [RunningStats::default(); MemMetric::COUNT],
            cpu: [RunningStats::default(); CpuMetric::COUNT],
            attempted: 0,
            measured: 0,
            min_measured,
        }
    }

    fn fold(&mut self, record: &TrialRecord) {
        self.attempted += 1;
        if !record.is_measured() {
            return;
        }
        self.measured += 1;

        for metric in MemMetric::iter() {
            if let Some(v) = record.mem(metric) {
                self.mem[metric as usize].push(v);
            }
        }
        for metric in CpuMetric::iter() {
            self.cpu[metric as usize].push(record.cpu(metric));
        }
    }

    /// Trials folded in, measured or not.
    #[must_use]
    pub fn attempted(&self) -> u32 {
        self.attempted
    }

    /// Trials that contributed at least one snapshot.
    #[must_use]
    pub fn measured(&self) -> u32 {
        self.measured
    }

    /// Whether enough trials were measured to report statistics at all.
    #[must_use]
    pub fn is_measured(&self) -> bool {
        self.measured >= self.min_measured.max(1)
    }

    #[must_use]
    pub fn mem_stats(&self, metric: MemMetric) -> Option<&RunningStats> {
        self.is_measured().then(|| &self.mem[metric as usize])
    }

    #[must_use]
    pub fn cpu_stats(&self, metric: CpuMetric) -> Option<&RunningStats> {
        self.is_measured().then(|| &self.cpu[metric as usize])
    }

    /// Mean of user + system time, in seconds.
    #[must_use]
    pub fn cpu_total_mean(&self) -> Option<f64> {
        let user = self.cpu_stats(CpuMetric::User)?.mean();
        let system = self.cpu_stats(CpuMetric::System)?.mean();
        Some(user + system)
    }
}
