use std::fmt;
use std::io;
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use procbench_metrics::{MetricError, TrialRecord};

use crate::probe::{Probe, ProbeError};

/// A target program as a structured argv. No shell is involved anywhere:
/// arguments are passed through verbatim and output discard is configured on
/// the launch interface instead of via redirection syntax.
#[derive(Debug, Clone)]
pub struct CommandSpec {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl CommandSpec {
    #[must_use]
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        cmd
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", quote_for_display(&self.program.to_string_lossy()))?;
        for arg in &self.args {
            write!(f, " {}", quote_for_display(arg))?;
        }
        Ok(())
    }
}

// Not a shell-accurate escaper; just makes spaces/specials unambiguous in
// diagnostics.
fn quote_for_display(s: &str) -> String {
    let needs_quotes = s
        .chars()
        .any(|c| c.is_whitespace() || matches!(c, '"' | '\\'));
    if !needs_quotes {
        return s.to_string();
    }

    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

#[derive(Debug, thiserror::Error)]
pub enum SampleError {
    #[error("failed to launch {command}: {source}")]
    Launch {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to query child liveness: {source}")]
    Wait {
        #[source]
        source: io::Error,
    },

    #[error("child still running after {timeout:?}, killed")]
    Timeout { timeout: Duration },

    #[error(transparent)]
    Metric(#[from] MetricError),
}

/// When to poll. The default busy-polls for the whole trial: there is no
/// portable notify-on-exit cheaper than polling at this granularity, and a
/// sleep long enough to matter would miss the only samplable window of a
/// millisecond-scale child. For long-running targets `hybrid` trades that
/// accuracy for idle CPU: spin for `tight_for`, then sleep `interval`
/// between polls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub tight_for: Duration,
    pub interval: Duration,
}

impl PollPolicy {
    #[must_use]
    pub fn busy() -> Self {
        Self {
            tight_for: Duration::MAX,
            interval: Duration::ZERO,
        }
    }

    #[must_use]
    pub fn hybrid(tight_for: Duration, interval: Duration) -> Self {
        Self { tight_for, interval }
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::busy()
    }
}

/// What one trial produced: the folded metrics plus process facts the
/// harness surfaces but never interprets.
#[derive(Debug, Clone)]
pub struct TrialOutcome {
    pub record: TrialRecord,
    pub status: ExitStatus,
    pub elapsed: Duration,
}

/// Launches one child per call and reduces its live resource snapshots into
/// a [`TrialRecord`].
#[derive(Debug, Clone, Copy)]
pub struct Sampler {
    policy: PollPolicy,
    timeout: Option<Duration>,
}

impl Sampler {
    #[must_use]
    pub fn new(policy: PollPolicy, timeout: Option<Duration>) -> Self {
        Self { policy, timeout }
    }

    /// Runs `spec` to completion while polling its resource counters.
    ///
    /// Exit is re-checked every iteration; a probe failure while the child is
    /// alive skips that tick instead of aborting the trial. The child is
    /// always reaped before this returns, on every path.
    pub fn sample(&self, spec: &CommandSpec) -> Result<TrialOutcome, SampleError> {
        let mut child = spec.command().spawn().map_err(|source| SampleError::Launch {
            command: spec.to_string(),
            source,
        })?;
        let probe = Probe::new(child.id());
        let mut record = TrialRecord::new();
        let mut skipped_ticks: u32 = 0;
        let started = Instant::now();

        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {}
                Err(source) => {
                    kill_and_reap(&mut child);
                    return Err(SampleError::Wait { source });
                }
            }

            if let Some(timeout) = self.timeout {
                if started.elapsed() >= timeout {
                    kill_and_reap(&mut child);
                    return Err(SampleError::Timeout { timeout });
                }
            }

            match probe.snapshot() {
                Ok(snap) => {
                    if let Err(err) = record.observe(&snap) {
                        kill_and_reap(&mut child);
                        return Err(err.into());
                    }
                }
                // Exit will show up on the next liveness check.
                Err(ProbeError::Gone { .. }) => continue,
                Err(ProbeError::Transient { .. }) => skipped_ticks += 1,
            }

            self.pace(started);
        };

        let elapsed = started.elapsed();
        if skipped_ticks > 0 {
            log::debug!(
                "pid {}: {skipped_ticks} transient probe failures tolerated",
                probe.pid()
            );
        }
        if !record.is_measured() {
            log::debug!(
                "pid {}: exited after {elapsed:?} before the first snapshot",
                probe.pid()
            );
        }

        Ok(TrialOutcome {
            record,
            status,
            elapsed,
        })
    }

    fn pace(&self, started: Instant) {
        if self.policy.interval.is_zero() || started.elapsed() < self.policy.tight_for {
            std::hint::spin_loop();
        } else {
            thread::sleep(self.policy.interval);
        }
    }
}

fn kill_and_reap(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}
