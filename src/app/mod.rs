use std::{fs, path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use crate::{
    config::ScribeConfig,
    git::{commit_from_revision, commits_between},
    prompt::PromptRenderer,
    record::Commit,
};

pub mod completion;
pub mod config;
pub mod generate;
pub mod schema;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Scribe {
    /// Increase log verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate text for one or more commits.
    Generate(generate::GenerateCommand),
    /// Print the prompts that `generate` would send.
    Render(generate::RenderCommand),
    /// Print the JSON schema of commit records.
    Schema,
    /// Read or change settings.
    Config(config::ConfigCommand),
    /// Generate shell completion scripts.
    Completion(completion::CompletionCommand),
}

/// Where commits are read from: a records file, git revisions, or the
/// commits a branch adds on top of its base.
#[derive(Args, Debug, Clone)]
pub struct CommitSource {
    /// Repository to read revisions from.
    #[arg(long, default_value = ".")]
    pub repo: PathBuf,
    /// Revisions to read (defaults to HEAD). Can be repeated.
    #[arg(short, long = "rev", value_name = "REV")]
    pub revs: Vec<String>,
    /// JSON file with a commit record or an array of them.
    #[arg(long, conflicts_with = "revs")]
    pub records: Option<PathBuf>,
    /// Branch whose commits not on the base branch are read, newest first.
    #[arg(long, conflicts_with_all = ["revs", "records"])]
    pub branch: Option<String>,
    /// Base branch for --branch.
    #[arg(long, default_value = "main", requires = "branch")]
    pub base: String,
}

impl CommitSource {
    pub fn load(&self) -> Result<Vec<Arc<Commit>>> {
        if let Some(path) = &self.records {
            let commits = Commit::list_from_path(path)
                .with_context(|| format!("Failed to load records file: {}", path.display()))?;
            return Ok(commits.into_iter().map(Arc::new).collect());
        }

        if let Some(branch) = &self.branch {
            let commits = commits_between(&self.repo, &self.base, branch)
                .with_context(|| format!("Failed to read commits of {branch} over {}", self.base))?;
            return Ok(commits.into_iter().map(Arc::new).collect());
        }

        let head = ["HEAD".to_string()];
        let revs = if self.revs.is_empty() {
            &head[..]
        } else {
            &self.revs[..]
        };

        revs.iter()
            .map(|rev| {
                commit_from_revision(&self.repo, rev)
                    .map(Arc::new)
                    .with_context(|| format!("Failed to read revision {rev}"))
            })
            .collect()
    }
}

fn prompt_renderer(config: &ScribeConfig) -> Result<PromptRenderer> {
    match &config.prompt_template {
        Some(path) => {
            let template = fs::read_to_string(path)
                .with_context(|| format!("Failed to read prompt template: {}", path.display()))?;
            Ok(PromptRenderer::with_template(&template)?)
        }
        None => Ok(PromptRenderer::new()?),
    }
}

pub async fn run_app(cli: Scribe) -> Result<()> {
    match cli.command {
        Commands::Generate(args) => generate::run(args).await?,
        Commands::Render(args) => generate::render(args)?,
        Commands::Schema => schema::run()?,
        Commands::Config(args) => config::run(args)?,
        Commands::Completion(args) => completion::run(args)?,
    }
    Ok(())
}
