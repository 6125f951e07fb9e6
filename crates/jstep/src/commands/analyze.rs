//! Analyze command - estimate outcome likelihoods by running sampled inputs.
//!
//! Each argument tuple runs in its own child process (`jstep run`), so runs
//! never share interpreter state.

use anyhow::{Context, Result};
use clap::Args;
use jstep_bytecode::MethodId;
use jstep_core::Outcome;
use std::path::Path;
use std::process::{Command, Stdio};

use super::InterpreterArgs;
use crate::analysis::{Tally, report_lines, synthesize};
use crate::config::Config;

#[derive(Args)]
pub struct AnalyzeCommand {
    /// Method to analyze, e.g. `jpamb.cases.Simple.assertPositive:(I)V`
    pub method: String,

    /// Sampler seed (overrides the config file)
    #[arg(long)]
    pub seed: Option<u64>,

    #[command(flatten)]
    pub interpreter: InterpreterArgs,
}

impl AnalyzeCommand {
    pub fn run(&self, config: &Config, config_path: Option<&Path>) -> Result<()> {
        let method: MethodId = self
            .method
            .parse()
            .with_context(|| format!("Invalid method `{}`", self.method))?;

        let mut analysis = config.analysis.clone();
        if let Some(seed) = self.seed {
            analysis.seed = seed;
        }
        let settings = self.interpreter.apply(&config.interpreter);

        let exe = std::env::current_exe().context("Cannot locate the jstep executable")?;
        let tuples = synthesize(&method.descriptor, &analysis);
        tracing::debug!(method = %method, tuples = tuples.len(), "starting analysis");

        let mut tally = Tally::new();
        for args in &tuples {
            let child = ChildRun {
                exe: &exe,
                method: &self.method,
                args,
                step_limit: settings.step_limit,
                classpath: &settings.classpath,
                config: config_path,
            };
            match child.outcome()? {
                Some(outcome) => {
                    tracing::debug!(args = %args, %outcome, "run finished");
                    tally.record(outcome);
                }
                None => tally.record_fault(),
            }
        }

        if tally.faults() > 0 {
            tracing::warn!(
                faults = tally.faults(),
                runs = tally.runs(),
                "some runs faulted"
            );
        }

        for line in report_lines(&tally, &analysis) {
            println!("{line}");
        }
        Ok(())
    }
}

/// One `jstep run` child process
struct ChildRun<'a> {
    exe: &'a Path,
    method: &'a str,
    args: &'a str,
    step_limit: usize,
    classpath: &'a Path,
    config: Option<&'a Path>,
}

impl ChildRun<'_> {
    /// Outcome of the run, `None` if it faulted
    fn outcome(&self) -> Result<Option<Outcome>> {
        let mut command = Command::new(self.exe);
        if let Some(config) = self.config {
            command.arg("--config").arg(config);
        }
        command
            .arg("run")
            .arg(self.method)
            .arg(self.args)
            .arg("--step-limit")
            .arg(self.step_limit.to_string())
            .arg("--classpath")
            .arg(self.classpath)
            .stdin(Stdio::null());

        let output = command
            .output()
            .with_context(|| format!("Failed to spawn {}", self.exe.display()))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let outcome = stdout.lines().next().and_then(Outcome::from_label);
        if !output.status.success() || outcome.is_none() {
            tracing::warn!(
                args = %self.args,
                status = ?output.status.code(),
                stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                "run did not produce an outcome"
            );
            return Ok(None);
        }
        Ok(outcome)
    }
}
