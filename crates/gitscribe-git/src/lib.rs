//! # gitscribe-git
//!
//! Read-only git queries for the gitscribe tool set.
//!
//! This crate wraps libgit2 behind a narrow interface: the working-tree
//! status, a per-file diff summary, and the unified diff text of a single
//! file. Nothing here mutates the repository.
//!
//! ## Key types
//!
//! - [`Workdir`] — a repository handle scoped to one working directory
//! - [`RepoStatus`] — created/modified/deleted counts plus renames
//! - [`ChangeStat`] — one diff-summary entry with optional line stats
//!
//! ## Usage
//!
//! ```rust,ignore
//! use gitscribe_git::Workdir;
//! use std::path::Path;
//!
//! let repo = Workdir::open(Path::new("."))?;
//!
//! let status = repo.status()?;
//! println!("{} created, {} modified", status.created, status.modified);
//!
//! for stat in repo.diff_summary()? {
//!     let diff = repo.file_diff(&stat.file)?;
//!     println!("{}\n{diff}", stat.file);
//! }
//! ```
//!
//! Every caller opens its own [`Workdir`]; handles are cheap and nothing is
//! cached between calls, so each query observes the repository as it is at
//! that moment.

mod diff;
mod status;

pub use diff::ChangeStat;
pub use status::{Rename, RepoStatus};

use git2::Repository;
use std::path::Path;
use thiserror::Error;

/// Errors surfaced by the git query layer.
#[derive(Error, Debug)]
pub enum GitError {
    #[error("not a git repository: {0}")]
    NotARepo(String),

    #[error("git operation failed: {0}")]
    Git(#[from] git2::Error),
}

/// A repository handle scoped to one working directory.
///
/// Opened fresh per tool invocation; holds no state beyond the underlying
/// libgit2 repository.
pub struct Workdir {
    pub(crate) repo: Repository,
}

impl std::fmt::Debug for Workdir {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workdir")
            .field("path", &self.repo.path())
            .finish()
    }
}

impl Workdir {
    /// Open the repository containing `path`.
    ///
    /// Walks up parent directories the way `git` itself does. Returns
    /// [`GitError::NotARepo`] when no repository is found.
    pub fn open(path: &Path) -> Result<Self, GitError> {
        let repo = Repository::discover(path).map_err(|e| {
            if e.code() == git2::ErrorCode::NotFound {
                GitError::NotARepo(path.display().to_string())
            } else {
                GitError::Git(e)
            }
        })?;
        Ok(Self { repo })
    }
}

#[cfg(test)]
pub(crate) mod testutil {
    use git2::{Repository, Signature};
    use std::path::Path;

    /// Initialize a repository with one committed file (`base.txt`).
    pub fn scratch_repo(dir: &Path) -> Repository {
        let repo = Repository::init(dir).unwrap();
        std::fs::write(dir.join("base.txt"), "base\n").unwrap();
        commit_all(&repo, "initial");
        repo
    }

    /// Stage everything and commit.
    pub fn commit_all(repo: &Repository, message: &str) {
        let mut index = repo.index().unwrap();
        index
            .add_all(["*"], git2::IndexAddOption::DEFAULT, None)
            .unwrap();
        index.write().unwrap();
        let tree_id = index.write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        let sig = Signature::now("tester", "tester@example.com").unwrap();
        let parent = repo
            .head()
            .ok()
            .and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();
        repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .unwrap();
    }
}
