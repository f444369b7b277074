use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use tracing::warn;

use super::{CommitSource, prompt_renderer};
use crate::{
    ai::{AI, provider::ModelLocation},
    config::ScribeConfig,
    record::Commit,
    utils::{shine_success, spin_progress, summary_line},
};

const SHORT_ID_LEN: usize = 7;

#[derive(Args)]
pub struct GenerateCommand {
    #[command(flatten)]
    pub source: CommitSource,
    /// Override the configured model, as `provider:model`.
    #[arg(short, long)]
    pub model: Option<String>,
    /// Print the whole history as JSON instead of plain text.
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct RenderCommand {
    #[command(flatten)]
    pub source: CommitSource,
}

pub(super) async fn run(args: GenerateCommand) -> Result<()> {
    let config = ScribeConfig::load()?;
    let location = match &args.model {
        Some(model) => model
            .parse::<ModelLocation>()?
            .with_endpoint(config.ollama_host.clone()),
        None => config.model_location()?,
    };

    let mut ai = AI::load(&location)
        .with_context(|| format!("Failed to load model {location}"))?
        .with_params(config.generation_params());
    if let Some(capacity) = config.history_capacity() {
        ai = ai.with_history_capacity(capacity);
    }

    let renderer = prompt_renderer(&config)?;
    let commits = args.source.load()?;

    let mut runs = Vec::with_capacity(commits.len());
    for commit in commits {
        let prompt = renderer.render(&commit)?;
        let message = format!("Generating for {}...", short_id(&commit));

        let ai_ref = &mut ai;
        let prompt_ref = prompt.as_str();
        let reference = Arc::clone(&commit);
        spin_progress(&message, || async move {
            ai_ref
                .run(prompt_ref, reference)
                .await
                .map_err(anyhow::Error::from)
        })
        .await?;

        runs.push((commit, prompt));
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(ai.history())?);
        return Ok(());
    }

    for (commit, prompt) in &runs {
        let Some(node) = ai.history().get(prompt) else {
            warn!(commit = %commit.id, "result was evicted from history");
            continue;
        };
        println!(
            "{} {}",
            short_id(commit).yellow(),
            summary_line(&commit.message).bold()
        );
        println!("{}\n", node.output);
    }
    shine_success(&format!("Generated text for {} commit(s)", runs.len()));

    Ok(())
}

pub(super) fn render(args: RenderCommand) -> Result<()> {
    let config = ScribeConfig::load()?;
    let renderer = prompt_renderer(&config)?;

    for commit in args.source.load()? {
        println!("{}", renderer.render(&commit)?);
    }
    Ok(())
}

fn short_id(commit: &Commit) -> &str {
    commit
        .id
        .get(..SHORT_ID_LEN)
        .unwrap_or(commit.id.as_str())
}

#[cfg(test)]
mod tests {
    use std::{fs, path::PathBuf};

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn short_id_truncates_long_ids() {
        let commit = Commit {
            id: "0123456789abcdef".to_string(),
            message: String::new(),
            hunks: Vec::new(),
        };
        assert_eq!(short_id(&commit), "0123456");
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn render_runs_without_a_runtime() {
        let dir = TempDir::new().unwrap();
        let records = dir.path().join("commits.json");
        fs::write(&records, r#"{"id":"a","message":"m","hunks":[]}"#).unwrap();
        let args = RenderCommand {
            source: CommitSource {
                repo: PathBuf::from("."),
                revs: Vec::new(),
                records: Some(records),
                branch: None,
                base: "main".to_string(),
            },
        };

        temp_env::with_var("XDG_CONFIG_HOME", Some(dir.path()), || {
            render(args).unwrap();
        });
    }
}
