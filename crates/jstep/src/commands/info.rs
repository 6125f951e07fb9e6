//! Info command - show a method's resolved instructions.

use anyhow::{Context, Result};
use clap::Args;
use jstep_bytecode::{BytecodeProvider, Instruction, MethodId, Suite};

use super::InterpreterArgs;
use crate::config::Config;

#[derive(Args)]
pub struct InfoCommand {
    /// Method to show, e.g. `jpamb.cases.Simple.divideByN:(II)I`
    pub method: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub interpreter: InterpreterArgs,
}

impl InfoCommand {
    pub fn run(&self, config: &Config) -> Result<()> {
        let settings = self.interpreter.apply(&config.interpreter);
        let method: MethodId = self
            .method
            .parse()
            .with_context(|| format!("Invalid method `{}`", self.method))?;

        let suite = Suite::new(&settings.classpath);
        let code = suite
            .resolve(&method)
            .with_context(|| format!("Cannot resolve {method}"))?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&code)?);
        } else {
            print!("{}", listing(&method, &code));
        }
        Ok(())
    }
}

/// Human-readable listing, one instruction per line
fn listing(method: &MethodId, code: &[Instruction]) -> String {
    let mut out = format!("{method}\n");
    for (offset, instruction) in code.iter().enumerate() {
        let marker = match instruction.branch_target() {
            Some(target) if target.offset() >= code.len() => "  ; target out of range",
            _ => "",
        };
        out.push_str(&format!("{offset:>4}  {instruction}{marker}\n"));
    }
    out
}
