use procbench_metrics::{AggregateRecord, CpuMetric, MemMetric};

use crate::cli::OutputFormat;
use crate::run::TargetOutcome;
use crate::suite::{MetricSelection, Suite};

mod csv;
mod human;
mod json;

pub(crate) trait Formatter {
    fn header(&mut self, suite: &Suite) -> anyhow::Result<()>;
    fn row(&mut self, size: u64, row: &[TargetOutcome]) -> anyhow::Result<()>;
    fn finish(&mut self) -> anyhow::Result<()> {
        Ok(())
    }
}

pub(crate) fn formatter(format: OutputFormat, suite: &Suite) -> Box<dyn Formatter> {
    let columns = columns(suite.metrics);
    match format {
        OutputFormat::Csv => Box::new(csv::CsvOutput::new(columns)),
        OutputFormat::HumanReadable => Box::new(human::HumanOutput::new(columns)),
        OutputFormat::Json => Box::new(json::JsonOutput::new(columns)),
    }
}

/// One aggregated output field, in fixed table order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Column {
    Mem(MemMetric),
    Cpu(CpuMetric),
    /// Derived user + system mean, the original tables' "total time" column.
    CpuTotal,
}

impl Column {
    pub(crate) fn name(self) -> &'static str {
        match self {
            Column::Mem(m) => m.name(),
            Column::Cpu(CpuMetric::User) => "user_s",
            Column::Cpu(CpuMetric::System) => "system_s",
            Column::CpuTotal => "total_s",
        }
    }

    pub(crate) fn mean(self, record: &AggregateRecord) -> Option<f64> {
        match self {
            Column::Mem(m) => record.mem_stats(m).map(|s| s.mean()),
            Column::Cpu(c) => record.cpu_stats(c).map(|s| s.mean()),
            Column::CpuTotal => record.cpu_total_mean(),
        }
    }

    /// CSV cell for this column: empty when unmeasured, fixed precision
    /// otherwise (6 decimals for CPU seconds, 1 for byte means).
    pub(crate) fn cell(self, record: &AggregateRecord) -> String {
        match self.mean(record) {
            None => String::new(),
            Some(v) => match self {
                Column::Mem(_) => format!("{v:.1}"),
                Column::Cpu(_) | Column::CpuTotal => format!("{v:.6}"),
            },
        }
    }
}

pub(crate) fn columns(metrics: MetricSelection) -> Vec<Column> {
    let mut cols = Vec::new();
    if matches!(metrics, MetricSelection::Memory | MetricSelection::All) {
        cols.extend(MemMetric::all().map(Column::Mem));
    }
    if matches!(metrics, MetricSelection::Cpu | MetricSelection::All) {
        cols.extend(CpuMetric::all().map(Column::Cpu));
        cols.push(Column::CpuTotal);
    }
    cols
}

pub(crate) fn format_bytes(b: f64) -> String {
    const KIB: f64 = 1024.0;
    const MIB: f64 = 1024.0 * 1024.0;
    const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

    if b >= GIB {
        return format!("{:.2}GiB", b / GIB);
    }
    if b >= MIB {
        return format!("{:.2}MiB", b / MIB);
    }
    if b >= KIB {
        return format!("{:.2}KiB", b / KIB);
    }

    format!("{b:.0}B")
}

/// Measurement context worth keeping next to saved tables.
pub(crate) fn host_summary() -> String {
    use sysinfo::{MemoryRefreshKind, RefreshKind, System};

    let cpus = std::thread::available_parallelism().map_or(0, std::num::NonZeroUsize::get);
    let sys = System::new_with_specifics(
        RefreshKind::nothing().with_memory(MemoryRefreshKind::everything()),
    );
    format!(
        "{cpus} cpus, {} memory",
        format_bytes(sys.total_memory() as f64)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_sets_match_metric_selection() {
        assert_eq!(columns(MetricSelection::Memory).len(), 10);
        assert_eq!(columns(MetricSelection::Cpu).len(), 3);
        assert_eq!(columns(MetricSelection::All).len(), 13);

        let all = columns(MetricSelection::All);
        assert_eq!(all[0].name(), "rss");
        assert_eq!(all[10].name(), "user_s");
        assert_eq!(all[12].name(), "total_s");
    }

    #[test]
    fn format_bytes_picks_sane_units() {
        assert_eq!(format_bytes(512.0), "512B");
        assert_eq!(format_bytes(2048.0), "2.00KiB");
        assert_eq!(format_bytes(3.5 * 1024.0 * 1024.0), "3.50MiB");
        assert_eq!(format_bytes(2.0 * 1024.0 * 1024.0 * 1024.0), "2.00GiB");
    }
}
