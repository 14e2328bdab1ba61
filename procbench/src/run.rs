use procbench_core::{AggregateOutcome, SampleError, Sampler, TrialError, TrialRunner};

use crate::cli::RunArgs;
use crate::output;
use crate::run_error::RunError;
use crate::suite::{Suite, Target};

/// One target's aggregate for the row currently being emitted.
pub(crate) struct TargetOutcome {
    pub label: String,
    pub outcome: AggregateOutcome,
}

pub fn run(args: RunArgs) -> Result<(), RunError> {
    let suite = Suite::load(&args.suite, &args).map_err(RunError::InvalidInput)?;
    log::debug!("host: {}", output::host_summary());

    let mut out = output::formatter(args.output, &suite);
    out.header(&suite).map_err(RunError::Runtime)?;

    let sampler = Sampler::new(suite.poll, suite.trial_timeout);
    let runner = TrialRunner::new(suite.iterations, suite.min_measured);

    // Rows stream in size order; everything printed before a failure stays
    // valid.
    for &size in &suite.sizes {
        let mut row = Vec::with_capacity(suite.targets.len());
        for target in &suite.targets {
            let spec = suite.command_for(target, size);
            log::debug!("size {size} target {}: {spec}", target.label);

            let outcome = runner
                .run(&sampler, &spec)
                .map_err(|err| trial_failure(err, target, size))?;
            row.push(TargetOutcome {
                label: target.label.clone(),
                outcome,
            });
        }
        out.row(size, &row).map_err(RunError::Runtime)?;
    }

    out.finish().map_err(RunError::Runtime)
}

fn trial_failure(err: TrialError, target: &Target, size: u64) -> RunError {
    let launch = matches!(err.source, SampleError::Launch { .. });
    let err = anyhow::Error::new(err).context(format!(
        "target `{}` failed at benchmark size {size}",
        target.label
    ));
    if launch {
        RunError::Launch(err)
    } else {
        RunError::Runtime(err)
    }
}
