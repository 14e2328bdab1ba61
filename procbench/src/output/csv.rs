use std::io::{self, Write as _};

use crate::run::TargetOutcome;
use crate::suite::Suite;

use super::{Column, Formatter};

/// The default format, shaped like the tables the harness exists to produce:
/// a header row, then one comma-separated row per benchmark size, streamed
/// and flushed so partial tables survive interruption.
pub(crate) struct CsvOutput {
    columns: Vec<Column>,
}

impl CsvOutput {
    pub(crate) fn new(columns: Vec<Column>) -> Self {
        Self { columns }
    }

    fn emit(&self, cells: Vec<String>) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();
        writeln!(out, "{}", cells.join(","))?;
        out.flush()?;
        Ok(())
    }
}

impl Formatter for CsvOutput {
    fn header(&mut self, suite: &Suite) -> anyhow::Result<()> {
        // Single-target tables keep bare field names; comparisons qualify
        // each column with the target label.
        let qualify = suite.targets.len() > 1;

        let mut cells = vec!["size".to_string()];
        for target in &suite.targets {
            for col in &self.columns {
                cells.push(if qualify {
                    format!("{}_{}", target.label, col.name())
                } else {
                    col.name().to_string()
                });
            }
        }
        self.emit(cells)
    }

    fn row(&mut self, size: u64, row: &[TargetOutcome]) -> anyhow::Result<()> {
        let mut cells = vec![size.to_string()];
        for target in row {
            for col in &self.columns {
                cells.push(col.cell(&target.outcome.record));
            }
        }
        self.emit(cells)
    }
}
