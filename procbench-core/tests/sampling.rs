use std::num::NonZeroU32;
use std::time::{Duration, Instant};

use procbench_core::{CommandSpec, PollPolicy, SampleError, Sampler, TrialRunner};
use procbench_metrics::MemMetric;

fn sh(script: &str) -> CommandSpec {
    CommandSpec::new("/bin/sh", vec!["-c".into(), script.into()])
}

fn iters(n: u32) -> NonZeroU32 {
    match NonZeroU32::new(n) {
        Some(n) => n,
        None => panic!("iterations must be non-zero"),
    }
}

#[test]
fn instant_exit_completes_without_hanging() {
    let sampler = Sampler::new(PollPolicy::busy(), None);
    let runner = TrialRunner::new(iters(5), 0);

    let started = Instant::now();
    let outcome = match runner.run(&sampler, &sh("exit 0")) {
        Ok(v) => v,
        Err(err) => panic!("aggregate failed: {err}"),
    };
    assert!(started.elapsed() < Duration::from_secs(10));

    assert_eq!(outcome.record.attempted(), 5);
    assert_eq!(outcome.nonzero_exits, 0);
    // The process may have been too short-lived to snapshot; that must show
    // up as a reduced measured count, never as fabricated zeros.
    assert!(outcome.record.measured() <= 5);
}

#[test]
fn sleeping_child_is_sampled_and_rss_is_positive() {
    let sampler = Sampler::new(PollPolicy::busy(), None);
    let outcome = match sampler.sample(&sh("sleep 0.3")) {
        Ok(v) => v,
        Err(err) => panic!("sample failed: {err}"),
    };

    assert!(outcome.status.success());
    assert!(outcome.elapsed >= Duration::from_millis(250));
    assert!(outcome.record.is_measured());
    assert!(outcome.record.snapshots() > 10);

    let rss = match outcome.record.mem(MemMetric::Rss) {
        Some(v) => v,
        None => panic!("expected rss to be measured"),
    };
    assert!(rss > 0.0, "rss was {rss}");
}

#[test]
fn allocated_block_shows_up_in_peak_rss() {
    const BLOCK: u64 = 4 * 1024 * 1024;

    // Builds a 4MiB shell variable, then sleeps so the peak is observable.
    let spec = sh("x=$(head -c 4194304 /dev/zero | tr '\\0' a); sleep 0.3");
    let sampler = Sampler::new(PollPolicy::busy(), None);
    let outcome = match sampler.sample(&spec) {
        Ok(v) => v,
        Err(err) => panic!("sample failed: {err}"),
    };

    let rss = match outcome.record.mem(MemMetric::Rss) {
        Some(v) => v,
        None => panic!("expected rss to be measured"),
    };
    assert!(
        rss >= BLOCK as f64,
        "peak rss {rss} below allocated block {BLOCK}"
    );
}

#[test]
fn hybrid_polling_still_observes_the_child() {
    let policy = PollPolicy::hybrid(Duration::from_millis(10), Duration::from_micros(500));
    let sampler = Sampler::new(policy, None);
    let outcome = match sampler.sample(&sh("sleep 0.2")) {
        Ok(v) => v,
        Err(err) => panic!("sample failed: {err}"),
    };
    assert!(outcome.record.is_measured());
}

#[test]
fn missing_executable_is_a_launch_error() {
    let sampler = Sampler::new(PollPolicy::busy(), None);
    let spec = CommandSpec::new("/definitely/not/here", vec![]);
    match sampler.sample(&spec) {
        Err(SampleError::Launch { command, .. }) => {
            assert!(command.contains("/definitely/not/here"));
        }
        Err(err) => panic!("expected launch error, got {err}"),
        Ok(_) => panic!("expected launch error, got success"),
    }
}

#[test]
fn hung_child_is_killed_on_timeout() {
    let sampler = Sampler::new(PollPolicy::busy(), Some(Duration::from_millis(100)));
    let started = Instant::now();
    match sampler.sample(&sh("sleep 30")) {
        Err(SampleError::Timeout { timeout }) => {
            assert_eq!(timeout, Duration::from_millis(100));
        }
        Err(err) => panic!("expected timeout, got {err}"),
        Ok(_) => panic!("expected timeout, got success"),
    }
    // Well under the child's sleep: the child was killed, not waited out.
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[test]
fn nonzero_exits_are_counted_not_interpreted() {
    let sampler = Sampler::new(PollPolicy::busy(), None);
    let runner = TrialRunner::new(iters(3), 0);
    let outcome = match runner.run(&sampler, &sh("exit 3")) {
        Ok(v) => v,
        Err(err) => panic!("aggregate failed: {err}"),
    };
    assert_eq!(outcome.nonzero_exits, 3);
}

#[test]
fn trial_error_names_the_failing_iteration() {
    let sampler = Sampler::new(PollPolicy::busy(), None);
    let runner = TrialRunner::new(iters(4), 0);
    let spec = CommandSpec::new("/definitely/not/here", vec![]);
    match runner.run(&sampler, &spec) {
        Err(err) => {
            assert_eq!(err.iteration, 1);
            assert_eq!(err.iterations, 4);
            assert!(err.to_string().contains("iteration 1/4"));
        }
        Ok(_) => panic!("expected launch failure"),
    }
}
