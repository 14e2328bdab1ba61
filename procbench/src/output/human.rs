use procbench_metrics::RunningStats;

use crate::run::TargetOutcome;
use crate::suite::Suite;

use super::{Column, Formatter, format_bytes, host_summary};

pub(crate) struct HumanOutput {
    columns: Vec<Column>,
}

impl HumanOutput {
    pub(crate) fn new(columns: Vec<Column>) -> Self {
        Self { columns }
    }
}

impl Formatter for HumanOutput {
    fn header(&mut self, suite: &Suite) -> anyhow::Result<()> {
        println!("host: {}", host_summary());
        println!(
            "iterations: {} | sizes: {} | min measured: {}",
            suite.iterations,
            suite.sizes.len(),
            suite.min_measured
        );
        for target in &suite.targets {
            println!(
                "target {}: {} {}",
                target.label,
                target.command.display(),
                target.args.join(" ")
            );
        }
        println!();
        Ok(())
    }

    fn row(&mut self, size: u64, row: &[TargetOutcome]) -> anyhow::Result<()> {
        println!("size {size}");
        for target in row {
            let record = &target.outcome.record;
            if !record.is_measured() {
                println!(
                    "  {}: unmeasured ({} of {} trials sampled)",
                    target.label,
                    record.measured(),
                    record.attempted()
                );
                continue;
            }

            let exits = if target.outcome.nonzero_exits > 0 {
                format!(", {} non-zero exits", target.outcome.nonzero_exits)
            } else {
                String::new()
            };
            println!(
                "  {} ({} of {} trials measured, wall mean {:.3}s{exits})",
                target.label,
                record.measured(),
                record.attempted(),
                target.outcome.wall.mean()
            );

            for col in &self.columns {
                match col {
                    Column::Mem(m) => {
                        if let Some(stats) = record.mem_stats(*m) {
                            println!("    {:<10} {}", col.name(), render_bytes(stats));
                        }
                    }
                    Column::Cpu(c) => {
                        if let Some(stats) = record.cpu_stats(*c) {
                            println!("    {:<10} {}", col.name(), render_secs(stats));
                        }
                    }
                    Column::CpuTotal => {
                        if let Some(total) = record.cpu_total_mean() {
                            println!("    {:<10} mean {total:.6}s", col.name());
                        }
                    }
                }
            }
        }
        println!();
        Ok(())
    }
}

fn render_bytes(stats: &RunningStats) -> String {
    format!(
        "mean {:>10}  stdev {:>10}  max {:>10}",
        format_bytes(stats.mean()),
        format_bytes(stats.stdev()),
        format_bytes(stats.max())
    )
}

fn render_secs(stats: &RunningStats) -> String {
    format!(
        "mean {:.6}s  stdev {:.6}s  max {:.6}s",
        stats.mean(),
        stats.stdev(),
        stats.max()
    )
}
