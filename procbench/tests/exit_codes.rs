use std::fs;
use std::process::Command;

use anyhow::Context as _;

fn status_code(status: std::process::ExitStatus) -> i32 {
    status.code().unwrap_or(-1)
}

fn run_procbench(args: &[&str]) -> anyhow::Result<std::process::Output> {
    Command::new(env!("CARGO_BIN_EXE_procbench"))
        .args(args)
        .output()
        .context("run procbench binary")
}

#[test]
fn help_exits_zero() -> anyhow::Result<()> {
    let out = run_procbench(&["--help"])?;
    anyhow::ensure!(status_code(out.status) == 0);
    Ok(())
}

#[test]
fn invalid_flags_exit_30() -> anyhow::Result<()> {
    let out = run_procbench(&["run", "suite.yaml", "--poll-interval", "10x"])?;
    anyhow::ensure!(
        status_code(out.status) == 30,
        "expected exit code 30, got {}\nstderr:\n{}",
        status_code(out.status),
        String::from_utf8_lossy(&out.stderr)
    );
    Ok(())
}

#[test]
fn missing_suite_exits_30() -> anyhow::Result<()> {
    let out = run_procbench(&["run", "/definitely/not/a/suite.yaml"])?;
    anyhow::ensure!(
        status_code(out.status) == 30,
        "expected exit code 30, got {}",
        status_code(out.status)
    );
    Ok(())
}

#[test]
fn invalid_suite_exits_30() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("suite.yaml");
    fs::write(&path, "targets: []\n")?;

    let out = run_procbench(&["run", path.to_str().context("suite path")?])?;
    anyhow::ensure!(
        status_code(out.status) == 30,
        "expected exit code 30, got {}\nstderr:\n{}",
        status_code(out.status),
        String::from_utf8_lossy(&out.stderr)
    );
    Ok(())
}

#[test]
fn missing_target_binary_exits_20_and_names_the_failure() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("suite.yaml");
    fs::write(
        &path,
        "
iterations: 2
maxSize: 1
targets:
  - label: ghost
    command: /definitely/not/here
",
    )?;

    let out = run_procbench(&["run", path.to_str().context("suite path")?])?;
    anyhow::ensure!(
        status_code(out.status) == 20,
        "expected exit code 20, got {}\nstderr:\n{}",
        status_code(out.status),
        String::from_utf8_lossy(&out.stderr)
    );

    // The diagnostic names the target, the benchmark size, and the iteration.
    let stderr = String::from_utf8_lossy(&out.stderr);
    anyhow::ensure!(stderr.contains("ghost"), "stderr was:\n{stderr}");
    anyhow::ensure!(stderr.contains("size 1"), "stderr was:\n{stderr}");
    anyhow::ensure!(stderr.contains("iteration 1/2"), "stderr was:\n{stderr}");
    Ok(())
}

#[test]
fn rows_already_printed_survive_a_later_failure() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("suite.yaml");
    // Size 1 exits instantly; size 2 hangs past the trial timeout, which is
    // fatal. The size-1 row must already be on stdout when the run aborts.
    fs::write(
        &path,
        "
iterations: 1
maxSize: 2
trialTimeout: 500ms
targets:
  - label: flaky
    command: /bin/sh
    args: [\"-c\", \"if [ $0 -ge 2 ]; then sleep 30; fi\", \"{size}\"]
",
    )?;

    let out = run_procbench(&["run", path.to_str().context("suite path")?])?;
    anyhow::ensure!(
        status_code(out.status) == 40,
        "expected exit code 40, got {}\nstderr:\n{}",
        status_code(out.status),
        String::from_utf8_lossy(&out.stderr)
    );

    let stdout = String::from_utf8_lossy(&out.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    anyhow::ensure!(
        lines.len() == 2,
        "expected header + the size-1 row, got:\n{stdout}"
    );
    anyhow::ensure!(lines[1].starts_with("1,"), "row was {}", lines[1]);

    let stderr = String::from_utf8_lossy(&out.stderr);
    anyhow::ensure!(stderr.contains("size 2"), "stderr was:\n{stderr}");
    Ok(())
}
