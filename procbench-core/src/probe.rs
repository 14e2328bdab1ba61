use std::io;

use procfs::ProcError;
use procfs::process::Process;

use procbench_metrics::{CpuSnapshot, MemSnapshot, Snapshot};

use crate::smaps;

#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    /// The process-table entry disappeared between the liveness check and the
    /// metrics read. Expected near exit; the caller should re-check liveness
    /// rather than abort the trial.
    #[error("process {pid} is gone")]
    Gone { pid: i32 },

    /// A single read failed while the process may still be alive. The caller
    /// skips this tick and keeps polling.
    #[error("transient read failure for process {pid}: {detail}")]
    Transient { pid: i32, detail: String },
}

/// Reads one atomic resource snapshot of a pid from procfs: `statm` for the
/// page-granular gauges, `smaps_rollup` for uss/pss/swap, `stat` for the
/// cumulative CPU counters.
#[derive(Debug, Clone, Copy)]
pub struct Probe {
    pid: i32,
    page_size: u64,
    tick_secs: f64,
}

impl Probe {
    #[must_use]
    pub fn new(pid: u32) -> Self {
        Self {
            pid: pid as i32,
            page_size: procfs::page_size(),
            tick_secs: 1.0 / procfs::ticks_per_second() as f64,
        }
    }

    #[must_use]
    pub fn pid(&self) -> i32 {
        self.pid
    }

    pub fn snapshot(&self) -> Result<Snapshot, ProbeError> {
        let process = Process::new(self.pid).map_err(|e| self.classify(e))?;
        let statm = process.statm().map_err(|e| self.classify(e))?;
        let stat = process.stat().map_err(|e| self.classify(e))?;
        let rollup = smaps::read(self.pid).map_err(|e| self.classify_io(&e))?;

        let pages = |n: u64| n * self.page_size;
        Ok(Snapshot {
            mem: MemSnapshot {
                rss: pages(statm.resident),
                vms: pages(statm.size),
                shared: pages(statm.shared),
                text: pages(statm.text),
                lib: pages(statm.lib),
                data: pages(statm.data),
                dirty: pages(statm.dt),
                uss: rollup.uss,
                pss: rollup.pss,
                swap: rollup.swap,
            },
            cpu: CpuSnapshot {
                user: stat.utime as f64 * self.tick_secs,
                system: stat.stime as f64 * self.tick_secs,
            },
        })
    }

    fn classify(&self, err: ProcError) -> ProbeError {
        match err {
            ProcError::NotFound(_) => ProbeError::Gone { pid: self.pid },
            other => ProbeError::Transient {
                pid: self.pid,
                detail: other.to_string(),
            },
        }
    }

    fn classify_io(&self, err: &io::Error) -> ProbeError {
        if err.kind() == io::ErrorKind::NotFound {
            ProbeError::Gone { pid: self.pid }
        } else {
            ProbeError::Transient {
                pid: self.pid,
                detail: err.to_string(),
            }
        }
    }
}
