use std::fs;
use std::num::NonZeroU32;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context as _, bail};
use serde::Deserialize;

use procbench_core::{CommandSpec, PollPolicy};

use crate::cli::RunArgs;

const DEFAULT_ITERATIONS: u32 = 10;
const DEFAULT_POLL_TIGHT_FOR: Duration = Duration::from_millis(25);

/// Which metric families appear in the output table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricSelection {
    Memory,
    Cpu,
    #[default]
    All,
}

#[derive(Debug, Clone, Copy)]
struct YamlDuration(Duration);

impl YamlDuration {
    fn into_inner(self) -> Duration {
        self.0
    }
}

impl<'de> Deserialize<'de> for YamlDuration {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        humantime::parse_duration(&s)
            .map(YamlDuration)
            .map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SuiteYaml {
    #[serde(default)]
    targets: Vec<TargetYaml>,

    /// Benchmark-input template; `{size}` is replaced by the size index.
    input_template: Option<String>,

    /// Sizes run 1..=maxSize unless an explicit `sizes` list is given.
    max_size: Option<u64>,
    #[serde(default)]
    sizes: Vec<u64>,

    iterations: Option<u32>,

    #[serde(default)]
    metrics: MetricSelection,

    min_measured: Option<u32>,

    poll_interval: Option<YamlDuration>,
    poll_tight_for: Option<YamlDuration>,
    trial_timeout: Option<YamlDuration>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TargetYaml {
    label: Option<String>,
    command: PathBuf,
    #[serde(default)]
    args: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Target {
    pub label: String,
    pub command: PathBuf,
    /// Argument templates; `{input}` and `{size}` are expanded per size.
    pub args: Vec<String>,
}

/// A fully-resolved benchmark suite: the YAML file with CLI overrides
/// applied and every cross-field rule checked, so the driver loop can run
/// without further validation.
#[derive(Debug, Clone)]
pub struct Suite {
    pub targets: Vec<Target>,
    pub input_template: Option<String>,
    pub sizes: Vec<u64>,
    pub iterations: NonZeroU32,
    pub metrics: MetricSelection,
    pub min_measured: u32,
    pub poll: PollPolicy,
    pub trial_timeout: Option<Duration>,
}

impl Suite {
    pub fn load(path: &Path, args: &RunArgs) -> anyhow::Result<Suite> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read suite: {}", path.display()))?;
        let yaml: SuiteYaml = serde_yaml::from_str(&text)
            .with_context(|| format!("invalid suite: {}", path.display()))?;
        Self::resolve(yaml, args)
    }

    fn resolve(yaml: SuiteYaml, args: &RunArgs) -> anyhow::Result<Suite> {
        if yaml.targets.is_empty() {
            bail!("suite has no targets");
        }

        let input_template = yaml.input_template;

        let mut targets = Vec::with_capacity(yaml.targets.len());
        for t in yaml.targets {
            let label = match t.label {
                Some(label) => label,
                None => t
                    .command
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .map(str::to_string)
                    .with_context(|| {
                        format!("cannot derive a label from command {}", t.command.display())
                    })?,
            };
            if t.args.iter().any(|a| a.contains("{input}")) && input_template.is_none() {
                bail!("target `{label}` uses {{input}} but the suite has no inputTemplate");
            }
            if targets.iter().any(|o: &Target| o.label == label) {
                bail!("duplicate target label `{label}`");
            }
            targets.push(Target {
                label,
                command: t.command,
                args: t.args,
            });
        }

        // --max-size beats everything; otherwise an explicit list beats the
        // suite's maxSize.
        let sizes: Vec<u64> = if let Some(max) = args.max_size {
            (1..=max).collect()
        } else if !yaml.sizes.is_empty() {
            yaml.sizes
        } else if let Some(max) = yaml.max_size {
            (1..=max).collect()
        } else {
            bail!("suite needs `sizes` or `maxSize`");
        };
        if sizes.is_empty() {
            bail!("benchmark size range is empty");
        }

        let iterations = args
            .iterations
            .or(yaml.iterations)
            .unwrap_or(DEFAULT_ITERATIONS);
        let iterations =
            NonZeroU32::new(iterations).context("iterations must be at least 1")?;

        let min_measured = args.min_measured.or(yaml.min_measured).unwrap_or(1);

        let poll_interval = args
            .poll_interval
            .or(yaml.poll_interval.map(YamlDuration::into_inner));
        let poll_tight_for = args
            .poll_tight_for
            .or(yaml.poll_tight_for.map(YamlDuration::into_inner))
            .unwrap_or(DEFAULT_POLL_TIGHT_FOR);
        let poll = match poll_interval {
            Some(interval) if !interval.is_zero() => PollPolicy::hybrid(poll_tight_for, interval),
            _ => PollPolicy::busy(),
        };

        let trial_timeout = args
            .trial_timeout
            .or(yaml.trial_timeout.map(YamlDuration::into_inner));

        Ok(Suite {
            targets,
            input_template,
            sizes,
            iterations,
            metrics: yaml.metrics,
            min_measured,
            poll,
            trial_timeout,
        })
    }

    /// Expands a target's argument templates for one benchmark size.
    #[must_use]
    pub fn command_for(&self, target: &Target, size: u64) -> CommandSpec {
        let size_str = size.to_string();
        let input = self
            .input_template
            .as_ref()
            .map(|t| t.replace("{size}", &size_str));

        let args = target
            .args
            .iter()
            .map(|arg| {
                let arg = arg.replace("{size}", &size_str);
                match &input {
                    Some(input) => arg.replace("{input}", input),
                    None => arg,
                }
            })
            .collect();

        CommandSpec::new(target.command.clone(), args)
    }
}
