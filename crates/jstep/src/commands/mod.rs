//! CLI command implementations.

pub mod analyze;
pub mod info;
pub mod run;

use clap::Args;
use jstep_bytecode::Suite;
use jstep_core::{Interpreter, InterpreterConfig, MethodTable};
use std::path::PathBuf;

use crate::config::InterpreterSettings;

/// Exit status for interpreter faults
pub const FAULT_EXIT_CODE: i32 = 2;

/// Flags that override the `[interpreter]` config section
#[derive(Args, Debug, Clone, Default)]
pub struct InterpreterArgs {
    /// Maximum number of steps before reporting `*`
    #[arg(long, value_name = "N")]
    pub step_limit: Option<usize>,

    /// Directory of JSON class files
    #[arg(long, value_name = "DIR")]
    pub classpath: Option<PathBuf>,
}

impl InterpreterArgs {
    /// Config settings with command-line overrides applied
    pub fn apply(&self, settings: &InterpreterSettings) -> InterpreterSettings {
        let mut settings = settings.clone();
        if let Some(limit) = self.step_limit {
            settings.step_limit = limit;
        }
        if let Some(classpath) = &self.classpath {
            settings.classpath = classpath.clone();
        }
        settings
    }
}

/// Build an interpreter reading class files from the configured class path
pub fn build_interpreter(settings: &InterpreterSettings) -> Interpreter<Suite> {
    tracing::debug!(
        classpath = %settings.classpath.display(),
        step_limit = settings.step_limit,
        "creating interpreter"
    );
    let table = MethodTable::new(Suite::new(&settings.classpath))
        .with_builtin_packages(settings.builtin_packages.iter().cloned());
    let config = InterpreterConfig {
        step_limit: settings.step_limit,
        strict_statics: settings.strict_statics,
        max_array_len: settings.max_array_len,
    };
    Interpreter::from_table(table, config)
}
