use git2::{Diff, DiffFormat, DiffOptions, Tree};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{GitError, Workdir};

/// One diff-summary entry: a changed file and its line stats.
///
/// `insertions`/`deletions` are `None` when libgit2 produces no line counts
/// for the file (binary content). Callers render missing stats as zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeStat {
    pub file: String,
    pub insertions: Option<usize>,
    pub deletions: Option<usize>,
}

impl Workdir {
    /// Summarize every change between HEAD and the working tree.
    ///
    /// Untracked files are included with their full content counted as
    /// insertions. Entry order follows libgit2's delta order, which is what
    /// the per-file diff queries are issued in.
    pub fn diff_summary(&self) -> Result<Vec<ChangeStat>, GitError> {
        let mut opts = base_diff_options();
        let diff = self.workdir_diff(&mut opts)?;

        let mut entries = Vec::with_capacity(diff.deltas().len());
        for idx in 0..diff.deltas().len() {
            let Some(delta) = diff.get_delta(idx) else {
                continue;
            };
            let Some(file) = delta_path(&delta) else {
                continue;
            };

            let (insertions, deletions) = match git2::Patch::from_diff(&diff, idx)? {
                Some(patch) if !patch.delta().flags().is_binary() => {
                    let (_context, additions, deletions) = patch.line_stats()?;
                    (Some(additions), Some(deletions))
                }
                _ => (None, None),
            };

            entries.push(ChangeStat {
                file,
                insertions,
                deletions,
            });
        }

        debug!(files = entries.len(), "built diff summary");
        Ok(entries)
    }

    /// Unified diff text for a single file, relative to HEAD.
    ///
    /// `path` is matched literally (no glob expansion). Returns an empty
    /// string when the file has no changes.
    pub fn file_diff(&self, path: &str) -> Result<String, GitError> {
        let mut opts = base_diff_options();
        opts.pathspec(path).disable_pathspec_match(true);
        let diff = self.workdir_diff(&mut opts)?;

        let mut text = String::new();
        diff.print(DiffFormat::Patch, |_delta, _hunk, line| {
            match line.origin() {
                '+' | '-' | ' ' => text.push(line.origin()),
                _ => {}
            }
            if let Ok(content) = std::str::from_utf8(line.content()) {
                text.push_str(content);
            }
            true
        })?;

        debug!(path, bytes = text.len(), "rendered file diff");
        Ok(text)
    }

    /// Diff HEAD (when born) against the working tree plus index.
    fn workdir_diff(&self, opts: &mut DiffOptions) -> Result<Diff<'_>, GitError> {
        let head_tree = self.head_tree()?;
        let mut diff = self
            .repo
            .diff_tree_to_workdir_with_index(head_tree.as_ref(), Some(opts))?;
        // Pair up delete/add halves of a rename into one delta.
        diff.find_similar(None)?;
        Ok(diff)
    }

    /// HEAD's tree, or `None` on an unborn branch (no commits yet).
    fn head_tree(&self) -> Result<Option<Tree<'_>>, GitError> {
        match self.repo.head() {
            Ok(head) => Ok(Some(head.peel_to_tree()?)),
            Err(e) if e.code() == git2::ErrorCode::UnbornBranch => Ok(None),
            Err(e) => Err(GitError::Git(e)),
        }
    }
}

fn base_diff_options() -> DiffOptions {
    let mut opts = DiffOptions::new();
    opts.include_untracked(true)
        .recurse_untracked_dirs(true)
        .show_untracked_content(true);
    opts
}

/// Path of a delta, preferring the post-change side.
fn delta_path(delta: &git2::DiffDelta<'_>) -> Option<String> {
    delta
        .new_file()
        .path()
        .or_else(|| delta.old_file().path())
        .map(|p| p.to_string_lossy().into_owned())
}
