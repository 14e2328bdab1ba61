use strum::{EnumCount, EnumIter, IntoStaticStr};

/// Memory gauges, in bytes. All of these are instantaneous values: a trial
/// records the maximum seen over the child's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumCount, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum MemMetric {
    /// Resident set size.
    Rss,
    /// Virtual memory size.
    Vms,
    /// Shared pages.
    Shared,
    /// Text (code) segment.
    Text,
    /// Library size (always 0 on modern kernels, kept for table parity).
    Lib,
    /// Data + stack segment.
    Data,
    /// Dirty pages (always 0 on modern kernels, kept for table parity).
    Dirty,
    /// Unique set size.
    Uss,
    /// Proportional set size.
    Pss,
    /// Swapped-out size.
    Swap,
}

impl MemMetric {
    #[must_use]
    pub fn name(self) -> &'static str {
        self.into()
    }

    /// All gauges, in table order.
    pub fn all() -> impl Iterator<Item = MemMetric> {
        <Self as strum::IntoEnumIterator>::iter()
    }
}

/// Cumulative CPU-time counters, in seconds. Monotonically non-decreasing
/// for a live process: a trial records the last value observed before exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumCount, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum CpuMetric {
    User,
    System,
}

impl CpuMetric {
    #[must_use]
    pub fn name(self) -> &'static str {
        self.into()
    }

    /// Both counters, in table order.
    pub fn all() -> impl Iterator<Item = CpuMetric> {
        <Self as strum::IntoEnumIterator>::iter()
    }
}

/// One instantaneous reading of the memory gauge family.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemSnapshot {
    pub rss: u64,
    pub vms: u64,
    pub shared: u64,
    pub text: u64,
    pub lib: u64,
    pub data: u64,
    pub dirty: u64,
    pub uss: u64,
    pub pss: u64,
    pub swap: u64,
}

impl MemSnapshot {
    #[must_use]
    pub fn value(&self, metric: MemMetric) -> u64 {
        match metric {
            MemMetric::Rss => self.rss,
            MemMetric::Vms => self.vms,
            MemMetric::Shared => self.shared,
            MemMetric::Text => self.text,
            MemMetric::Lib => self.lib,
            MemMetric::Data => self.data,
            MemMetric::Dirty => self.dirty,
            MemMetric::Uss => self.uss,
            MemMetric::Pss => self.pss,
            MemMetric::Swap => self.swap,
        }
    }
}

/// One reading of the cumulative CPU counters.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CpuSnapshot {
    pub user: f64,
    pub system: f64,
}

impl CpuSnapshot {
    #[must_use]
    pub fn value(&self, metric: CpuMetric) -> f64 {
        match metric {
            CpuMetric::User => self.user,
            CpuMetric::System => self.system,
        }
    }
}

/// One atomic resource snapshot of a running process.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Snapshot {
    pub mem: MemSnapshot,
    pub cpu: CpuSnapshot,
}
