use std::fs;

use anyhow::{Context as _, bail};

use crate::cli::InitArgs;

const SUITE_FILE: &str = "suite.yaml";

const SUITE_TEMPLATE: &str = r#"# procbench suite
#
# Each target is launched against the input resolved from inputTemplate for
# every size 1..=maxSize, measured over `iterations` sequential trials, and
# one aggregated row per size is printed to stdout.

iterations: 10
maxSize: 5
inputTemplate: "test_suite/test_MC_{size}.cnf"

# memory | cpu | all
metrics: all

targets:
  - label: dnf
    command: ./converter_new_opt
    args: ["{input}"]
  - label: par
    command: ./converter_new_par_opt
    args: ["{input}"]
  - label: z3
    command: /usr/bin/z3
    args: ["{input}"]

# pollInterval: 500us   # sleep between polls after pollTightFor (default: busy-poll)
# pollTightFor: 25ms
# trialTimeout: 30s     # kill trials that run longer (default: none)
# minMeasured: 1        # report a row unmeasured below this many sampled trials
"#;

pub fn init(args: &InitArgs) -> anyhow::Result<()> {
    fs::create_dir_all(&args.dir)
        .with_context(|| format!("failed to create {}", args.dir.display()))?;

    let path = args.dir.join(SUITE_FILE);
    if path.exists() && !args.force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }

    fs::write(&path, SUITE_TEMPLATE)
        .with_context(|| format!("failed to write {}", path.display()))?;
    eprintln!("wrote {}", path.display());
    Ok(())
}
