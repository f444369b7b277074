use anyhow::{Result, anyhow};
use clap::{Args, Subcommand};
use colored::Colorize;

use crate::{config::ScribeConfig, utils::shine_success};

#[derive(Args)]
pub struct ConfigCommand {
    #[command(subcommand)]
    action: ConfigAction,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the value of a setting.
    Get { key: String },
    /// Change a setting. Use `none` to clear optional ones.
    Set { key: String, value: String },
    /// List all settings that have a value.
    List,
    /// Print where the config file lives.
    Path,
}

pub(super) fn run(args: ConfigCommand) -> Result<()> {
    match args.action {
        ConfigAction::Get { key } => {
            let config = ScribeConfig::load()?;
            let value = config
                .get(&key)
                .ok_or_else(|| anyhow!("No value set for {}", key))?;
            println!("{value}");
        }
        ConfigAction::Set { key, value } => {
            let mut config = ScribeConfig::load()?;
            config.set(&key, &value)?;
            config.save()?;
            shine_success(&format!("Set {key}"));
        }
        ConfigAction::List => {
            let config = ScribeConfig::load()?;
            for (key, value) in config.list() {
                println!("{}: {}", key.blue().bold(), value);
            }
        }
        ConfigAction::Path => println!("{}", ScribeConfig::path()?.display()),
    }
    Ok(())
}
