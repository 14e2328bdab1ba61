use std::num::NonZeroU32;

use procbench_metrics::{AggregateRecord, Aggregator, RunningStats};

use crate::sampler::{CommandSpec, SampleError, Sampler, TrialOutcome};

/// A trial failure, tagged with which iteration of the sequence it was.
#[derive(Debug, thiserror::Error)]
#[error("iteration {iteration}/{iterations}: {source}")]
pub struct TrialError {
    pub iteration: u32,
    pub iterations: u32,
    #[source]
    pub source: SampleError,
}

/// The cross-trial result for one benchmark input: field statistics plus
/// wall-clock spread and exit-status accounting.
#[derive(Debug, Clone)]
pub struct AggregateOutcome {
    pub record: AggregateRecord,
    pub wall: RunningStats,
    pub nonzero_exits: u32,
}

/// Runs the sampler a fixed number of times for one input and reduces the
/// per-trial records into one aggregate.
///
/// Trials are strictly sequential. Concurrent trials would share the host's
/// memory bandwidth and caches and bias the very quantities being measured,
/// so this is a correctness requirement, not a scheduling choice.
#[derive(Debug, Clone, Copy)]
pub struct TrialRunner {
    iterations: NonZeroU32,
    aggregator: Aggregator,
}

impl TrialRunner {
    #[must_use]
    pub fn new(iterations: NonZeroU32, min_measured: u32) -> Self {
        Self {
            iterations,
            aggregator: Aggregator::new(min_measured),
        }
    }

    pub fn run(
        &self,
        sampler: &Sampler,
        spec: &CommandSpec,
    ) -> Result<AggregateOutcome, TrialError> {
        let iterations = self.iterations.get();
        let mut records = Vec::with_capacity(iterations as usize);
        let mut wall = RunningStats::default();
        let mut nonzero_exits = 0u32;

        for iteration in 1..=iterations {
            let TrialOutcome {
                record,
                status,
                elapsed,
            } = sampler.sample(spec).map_err(|source| TrialError {
                iteration,
                iterations,
                source,
            })?;

            if !status.success() {
                nonzero_exits += 1;
                log::warn!("{spec} exited with {status} on iteration {iteration}");
            }
            log::trace!(
                "iteration {iteration}/{iterations}: {} snapshots over {elapsed:?}",
                record.snapshots()
            );

            wall.push(elapsed.as_secs_f64());
            records.push(record);
        }

        Ok(AggregateOutcome {
            record: self.aggregator.aggregate(&records),
            wall,
            nonzero_exits,
        })
    }
}
