use std::io::{self, Write as _};

use serde::Serialize;

use procbench_metrics::RunningStats;

use crate::run::TargetOutcome;
use crate::suite::Suite;

use super::{Column, Formatter};

/// NDJSON: one object per benchmark size, plus a trailing summary line.
pub(crate) struct JsonOutput {
    columns: Vec<Column>,
    rows: u64,
}

impl JsonOutput {
    pub(crate) fn new(columns: Vec<Column>) -> Self {
        Self { columns, rows: 0 }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonRow<'a> {
    kind: &'static str,
    size: u64,
    targets: Vec<JsonTarget<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonTarget<'a> {
    label: &'a str,
    trials: u32,
    measured: u32,
    nonzero_exits: u32,
    wall_secs_mean: f64,
    metrics: Vec<JsonMetric>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonMetric {
    name: &'static str,
    mean: f64,
    stdev: f64,
    max: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonSummary {
    kind: &'static str,
    rows: u64,
}

fn metric(name: &'static str, stats: &RunningStats) -> JsonMetric {
    JsonMetric {
        name,
        mean: stats.mean(),
        stdev: stats.stdev(),
        max: stats.max(),
    }
}

fn emit_json_line<T: Serialize>(line: &T) -> anyhow::Result<()> {
    let mut out = io::stdout().lock();
    serde_json::to_writer(&mut out, line)?;
    out.write_all(b"\n")?;
    out.flush()?;
    Ok(())
}

impl Formatter for JsonOutput {
    fn header(&mut self, _suite: &Suite) -> anyhow::Result<()> {
        Ok(())
    }

    fn row(&mut self, size: u64, row: &[TargetOutcome]) -> anyhow::Result<()> {
        let targets = row
            .iter()
            .map(|target| {
                let record = &target.outcome.record;
                let mut metrics = Vec::with_capacity(self.columns.len());
                for col in &self.columns {
                    match col {
                        Column::Mem(m) => {
                            if let Some(stats) = record.mem_stats(*m) {
                                metrics.push(metric(col.name(), stats));
                            }
                        }
                        Column::Cpu(c) => {
                            if let Some(stats) = record.cpu_stats(*c) {
                                metrics.push(metric(col.name(), stats));
                            }
                        }
                        // Derived column: only the mean is meaningful.
                        Column::CpuTotal => {
                            if let Some(total) = record.cpu_total_mean() {
                                metrics.push(JsonMetric {
                                    name: col.name(),
                                    mean: total,
                                    stdev: 0.0,
                                    max: total,
                                });
                            }
                        }
                    }
                }
                JsonTarget {
                    label: &target.label,
                    trials: record.attempted(),
                    measured: record.measured(),
                    nonzero_exits: target.outcome.nonzero_exits,
                    wall_secs_mean: target.outcome.wall.mean(),
                    metrics,
                }
            })
            .collect();

        self.rows += 1;
        emit_json_line(&JsonRow {
            kind: "row",
            size,
            targets,
        })
    }

    fn finish(&mut self) -> anyhow::Result<()> {
        emit_json_line(&JsonSummary {
            kind: "summary",
            rows: self.rows,
        })
    }
}
