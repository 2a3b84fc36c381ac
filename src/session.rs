use std::collections::BTreeSet;
use std::path::Path;

use crate::config::Config;
use crate::engine;
use crate::error::{Error, Result};
use crate::git::{CommitId, EditRef, Repo, Rev};
use crate::state::{RefHistory, RefState, RepoState, StateDir};

/// One editing session: the repository, the held state lock, and the
/// reconciled per-ref histories. Constructed once and passed by
/// reference through the command handlers; dropped (after [`finish`])
/// at process exit.
///
/// [`finish`]: Session::finish
pub struct Session {
    repo: Repo,
    repo_state: RepoState,
    // Held for the whole session; every read-then-write against the
    // persisted histories happens under this lock.
    _state_dir: StateDir,
}

impl Session {
    /// Open the repository, take the state lock, and reconcile the
    /// histories of the named refs with what is persisted on disk.
    pub fn open(config: &Config, repo_path: &Path, ref_names: &[String]) -> Result<Session> {
        let repo = Repo::open(repo_path)?;
        let state_dir = StateDir::open(&config.state_dir)?;

        let mut refs = Vec::new();
        for name in ref_names {
            refs.push(resolve_edit_ref(&repo, name)?);
        }
        let repo_state = RepoState::load(state_dir.repo_state_dir(&repo)?, &repo, &refs)?;
        tracing::debug!("session open on {:?} editing {:?}", repo_path, ref_names);

        Ok(Session {
            repo,
            repo_state,
            _state_dir: state_dir,
        })
    }

    pub fn repo(&self) -> &Repo {
        &self.repo
    }

    pub fn history(&self, reference: &EditRef) -> Result<&RefHistory> {
        self.repo_state.history(reference)
    }

    /// Resolve a name against this session's repository, requiring a
    /// mutable (branch- or tag-backed) rev.
    pub fn edit_ref(&self, name: &str) -> Result<EditRef> {
        resolve_edit_ref(&self.repo, name)
    }

    /// Record a completed mutation: repoint the ref (preserving its
    /// metadata), then push a new snapshot selecting the new head. The
    /// history is only touched after the ref update succeeds.
    pub fn record(&mut self, reference: &EditRef, new_head: CommitId) -> Result<()> {
        engine::replace_ref(&self.repo, reference, new_head)?;
        let previous_selection = self.repo_state.history(reference)?.get().selection.clone();
        let snapshot = RefState {
            head: new_head,
            selection: BTreeSet::from([new_head]),
            selection_prev: previous_selection,
        };
        self.repo_state.history_mut(reference)?.push(snapshot);
        Ok(())
    }

    /// Step the ref back to the previous snapshot. Returns the restored
    /// state, or `None` when there is nothing to undo.
    pub fn undo(&mut self, reference: &EditRef) -> Result<Option<RefState>> {
        let history = self.repo_state.history(reference)?;
        let Some(target) = history.peek_undo() else {
            return Ok(None);
        };
        engine::replace_ref(&self.repo, reference, target.head)?;
        let history = self.repo_state.history_mut(reference)?;
        history.undo();
        Ok(Some(history.get().clone()))
    }

    /// Step the ref forward to the next snapshot. Returns the restored
    /// state, or `None` when there is nothing to redo.
    pub fn redo(&mut self, reference: &EditRef) -> Result<Option<RefState>> {
        let history = self.repo_state.history(reference)?;
        let Some(target) = history.peek_redo() else {
            return Ok(None);
        };
        engine::replace_ref(&self.repo, reference, target.head)?;
        let history = self.repo_state.history_mut(reference)?;
        history.redo();
        Ok(Some(history.get().clone()))
    }

    /// Write changed histories back to disk, still under the lock.
    pub fn finish(self) -> Result<()> {
        self.repo_state.write(&self.repo)
    }
}

fn resolve_edit_ref(repo: &Repo, name: &str) -> Result<EditRef> {
    let rev = repo.resolve_revision(name)?;
    if !rev.is_mutable() {
        return Err(match rev {
            Rev::Named { reference, .. } => Error::UnsupportedRefKind(reference.name),
            Rev::Detached(_) => {
                Error::InvalidArgument(format!("{} is not a branch or tag", name))
            }
        });
    }
    match rev {
        Rev::Named { reference, .. } => Ok(reference),
        Rev::Detached(_) => unreachable!("mutable revs are ref-backed"),
    }
}
