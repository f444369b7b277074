use anyhow::{Context, Result};
use clap::{Args, CommandFactory};
use clap_complete::{Generator, Shell, generate};

#[derive(Args)]
pub struct CompletionCommand {
    /// The shell to generate completions for.
    #[arg(value_enum)]
    pub shell: Shell,
}

pub(super) fn run(args: CompletionCommand) -> Result<()> {
    let mut cmd = super::Scribe::command();
    let script = completions_script(args.shell, &mut cmd).context("Printing completions failed")?;
    println!("{script}");
    Ok(())
}

/// Renders the completion script for `shell` as a UTF-8 string.
pub fn completions_script<G: Generator>(shell: G, cmd: &mut clap::Command) -> Result<String> {
    let bin_name = cmd.get_bin_name().unwrap_or("diffscribe").to_string();

    let mut script = Vec::new();
    generate::<G, _>(shell, cmd, bin_name, &mut script);

    String::from_utf8(script).map_err(Into::into)
}
