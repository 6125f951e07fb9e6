//! Run command - interpret one method invocation and print its outcome.

use anyhow::Result;
use clap::Args;
use jstep_bytecode::BytecodeProvider;
use jstep_core::{Interpreter, Invocation, RunReport, VmResult};

use super::{FAULT_EXIT_CODE, InterpreterArgs, build_interpreter};
use crate::config::Config;

#[derive(Args)]
pub struct RunCommand {
    /// Method to run, e.g. `jpamb.cases.Simple.divideByN:(II)I`
    pub method: String,

    /// Argument tuple, e.g. `(10, 0)`
    #[arg(default_value = "()", allow_hyphen_values = true)]
    pub args: String,

    #[command(flatten)]
    pub interpreter: InterpreterArgs,
}

impl RunCommand {
    pub fn run(&self, config: &Config) -> Result<()> {
        let settings = self.interpreter.apply(&config.interpreter);
        let mut interpreter = build_interpreter(&settings);

        match execute(&mut interpreter, &self.method, &self.args) {
            Ok(report) => {
                tracing::debug!(steps = report.steps, "run complete");
                println!("{}", report.outcome);
                Ok(())
            }
            Err(fault) => {
                eprintln!("error: {fault}");
                std::process::exit(FAULT_EXIT_CODE);
            }
        }
    }
}

/// Parse an invocation and run it to an outcome
pub fn execute<P: BytecodeProvider>(
    interpreter: &mut Interpreter<P>,
    method: &str,
    args: &str,
) -> VmResult<RunReport> {
    let invocation = Invocation::parse(method, args)?;
    interpreter.invoke(&invocation.method, invocation.args)
}
