use git2::StatusOptions;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{GitError, Workdir};

/// Snapshot of the working-tree status.
///
/// Counts classify each changed path into exactly one bucket; renames carry
/// their old and new paths so callers can render `from → to` pairs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RepoStatus {
    pub created: usize,
    pub modified: usize,
    pub deleted: usize,
    pub renamed: Vec<Rename>,
}

/// A renamed file, old path and new path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rename {
    pub from: String,
    pub to: String,
}

impl RepoStatus {
    /// Whether no changes were recorded.
    pub fn is_clean(&self) -> bool {
        self.created == 0 && self.modified == 0 && self.deleted == 0 && self.renamed.is_empty()
    }

    /// Total number of changed paths across all buckets.
    pub fn total(&self) -> usize {
        self.created + self.modified + self.deleted + self.renamed.len()
    }
}

impl Workdir {
    /// Read the current working-tree status.
    ///
    /// Untracked files count as created. Rename detection runs both between
    /// HEAD and the index and between the index and the working tree.
    pub fn status(&self) -> Result<RepoStatus, GitError> {
        let mut opts = StatusOptions::new();
        opts.include_untracked(true)
            .recurse_untracked_dirs(true)
            .renames_head_to_index(true)
            .renames_index_to_workdir(true);

        let statuses = self.repo.statuses(Some(&mut opts))?;

        let mut status = RepoStatus::default();
        for entry in statuses.iter() {
            let st = entry.status();
            if st.is_index_renamed() || st.is_wt_renamed() {
                if let Some(rename) = rename_of(&entry) {
                    status.renamed.push(rename);
                }
            } else if st.is_index_new() || st.is_wt_new() {
                status.created += 1;
            } else if st.is_index_deleted() || st.is_wt_deleted() {
                status.deleted += 1;
            } else if st.is_index_modified() || st.is_wt_modified() {
                status.modified += 1;
            }
        }

        debug!(
            created = status.created,
            modified = status.modified,
            deleted = status.deleted,
            renamed = status.renamed.len(),
            "read working-tree status"
        );

        Ok(status)
    }
}

/// Extract old/new paths from a rename entry's delta.
fn rename_of(entry: &git2::StatusEntry<'_>) -> Option<Rename> {
    let delta = entry.head_to_index().or_else(|| entry.index_to_workdir())?;
    let from = delta.old_file().path()?.to_string_lossy().into_owned();
    let to = delta.new_file().path()?.to_string_lossy().into_owned();
    Some(Rename { from, to })
}
