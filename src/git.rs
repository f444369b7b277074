use std::path::Path;

use git2::{BranchType, DiffOptions, Oid, Patch, Repository, Sort, Tree};
use tracing::debug;

use crate::{
    error::ScribeError,
    record::{Commit, Hunk},
};

const CONTEXT_LINES: u32 = 3;

/// Builds a [`Commit`] from `rev` in the repository at `repo_path`.
///
/// The commit is diffed against its first parent, or against the empty tree
/// when it has none.
pub fn commit_from_revision(repo_path: &Path, rev: &str) -> Result<Commit, ScribeError> {
    let repo = Repository::discover(repo_path)?;
    let commit = repo
        .revparse_single(rev)
        .and_then(|object| object.peel_to_commit())
        .map_err(|_| ScribeError::RevisionNotFound(rev.to_string()))?;

    build_commit(&repo, &commit)
}

/// Builds a [`Commit`] for every commit reachable from branch `compare` but
/// not from branch `base`, newest first.
pub fn commits_between(
    repo_path: &Path,
    base: &str,
    compare: &str,
) -> Result<Vec<Commit>, ScribeError> {
    let repo = Repository::discover(repo_path)?;
    let base_oid = branch_tip(&repo, base)?;
    let compare_oid = branch_tip(&repo, compare)?;

    let mut revwalk = repo.revwalk()?;
    revwalk.push(compare_oid)?;
    revwalk.hide(base_oid)?;
    revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)?;

    let commits = revwalk
        .map(|oid| {
            let commit = repo.find_commit(oid?)?;
            build_commit(&repo, &commit)
        })
        .collect::<Result<Vec<_>, _>>()?;
    debug!(base, compare, commits = commits.len(), "walked branch range");

    Ok(commits)
}

fn branch_tip(repo: &Repository, name: &str) -> Result<Oid, ScribeError> {
    let branch = repo
        .find_branch(name, BranchType::Local)
        .map_err(|_| ScribeError::RevisionNotFound(name.to_string()))?;
    Ok(branch.get().peel_to_commit()?.id())
}

fn build_commit(repo: &Repository, commit: &git2::Commit) -> Result<Commit, ScribeError> {
    let new_tree = commit.tree()?;
    let old_tree = match commit.parents().next() {
        Some(parent) => parent.tree()?,
        None => empty_tree(repo)?,
    };

    let hunks = collect_hunks(repo, &old_tree, &new_tree)?;
    debug!(commit = %commit.id(), hunks = hunks.len(), "collected hunks");

    Ok(Commit {
        id: commit.id().to_string(),
        message: commit.message().unwrap_or_default().to_string(),
        hunks,
    })
}

fn empty_tree(repo: &Repository) -> Result<Tree<'_>, git2::Error> {
    let tree_id = repo.treebuilder(None)?.write()?;
    repo.find_tree(tree_id)
}

fn collect_hunks(
    repo: &Repository,
    old_tree: &Tree,
    new_tree: &Tree,
) -> Result<Vec<Hunk>, ScribeError> {
    let mut options = DiffOptions::new();
    options.context_lines(CONTEXT_LINES);
    let diff = repo.diff_tree_to_tree(Some(old_tree), Some(new_tree), Some(&mut options))?;

    let mut hunks = Vec::new();
    for idx in 0..diff.deltas().len() {
        // Binary deltas carry no text patch.
        let Some(patch) = Patch::from_diff(&diff, idx)? else {
            continue;
        };
        let delta = patch.delta();
        let file_name = delta
            .new_file()
            .path()
            .or_else(|| delta.old_file().path())
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_default();

        for hunk_idx in 0..patch.num_hunks() {
            let (header, line_count) = patch.hunk(hunk_idx)?;
            let mut old_text = String::new();
            let mut new_text = String::new();

            for line_idx in 0..line_count {
                let line = patch.line_in_hunk(hunk_idx, line_idx)?;
                let content = String::from_utf8_lossy(line.content());
                match line.origin() {
                    ' ' => {
                        old_text.push_str(&content);
                        new_text.push_str(&content);
                    }
                    '-' => old_text.push_str(&content),
                    '+' => new_text.push_str(&content),
                    // End-of-file newline markers.
                    _ => {}
                }
            }

            hunks.push(Hunk {
                file_name: file_name.clone(),
                old_start: header.old_start(),
                old_lines: header.old_lines(),
                new_start: header.new_start(),
                new_lines: header.new_lines(),
                old_text,
                new_text,
            });
        }
    }

    Ok(hunks)
}
