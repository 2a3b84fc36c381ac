use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::{Error, Result};
use crate::git::{CommitId, EditRef, Repo};
use crate::history::History;

use super::{RefHistory, RefState};

const FILE_NAME: &str = "RefHistory";

/// On-disk document: `refName -> commitId -> RefHistory`. The two map
/// levels are deliberately loose so that entries this process cannot
/// resolve (a ref or commit that no longer exists) are carried through
/// a write verbatim instead of being silently dropped; only the
/// RefState leaf is strongly typed.
type Document = BTreeMap<String, BTreeMap<String, Value>>;

/// Per-repository persisted ref histories for one editing session.
///
/// Construction adopts the on-disk history keyed by each ref's current
/// head (resuming a mid-edit session) or starts a fresh one, and keeps
/// the adopted value as the "previous" snapshot so a no-op session does
/// not grow the file.
pub struct RepoState {
    dir: PathBuf,
    histories: BTreeMap<EditRef, RefHistory>,
    previous: BTreeMap<EditRef, RefHistory>,
}

impl RepoState {
    pub fn load(dir: PathBuf, repo: &Repo, refs: &[EditRef]) -> Result<RepoState> {
        let document = read_document(&dir);
        let mut histories = BTreeMap::new();
        let mut previous = BTreeMap::new();

        for reference in refs {
            let head = repo.ref_head(reference)?;
            let adopted = document
                .get(&reference.name)
                .and_then(|entries| entries.get(&head.to_string()))
                .and_then(|value| decode_history(repo, value));
            let history = match adopted {
                Some(history) => {
                    tracing::debug!("resuming history for {} at {}", reference, head);
                    history
                }
                None => History::new(RefState::new(head)),
            };
            previous.insert(reference.clone(), history.clone());
            histories.insert(reference.clone(), history);
        }

        Ok(RepoState {
            dir,
            histories,
            previous,
        })
    }

    pub fn history(&self, reference: &EditRef) -> Result<&RefHistory> {
        self.histories
            .get(reference)
            .ok_or_else(|| Error::RefNotFound(reference.name.clone()))
    }

    pub fn history_mut(&mut self, reference: &EditRef) -> Result<&mut RefHistory> {
        self.histories
            .get_mut(reference)
            .ok_or_else(|| Error::RefNotFound(reference.name.clone()))
    }

    /// Write changed histories back, under the session's state lock.
    ///
    /// The document is re-read fresh first so edits made out of band by
    /// other sessions on other refs are merged rather than clobbered.
    /// For each changed ref the stale (ref, previousHead) entry is
    /// removed and a (ref, currentHead) entry inserted; unchanged refs
    /// are left untouched, which bounds on-disk growth.
    pub fn write(&self, repo: &Repo) -> Result<()> {
        let mut document = read_document(&self.dir);
        let mut changed = false;

        for (reference, prev) in &self.previous {
            let Some(history) = self.histories.get(reference) else {
                continue;
            };
            if history == prev {
                continue;
            }
            changed = true;
            let head = repo.ref_head(reference)?;
            let entries = document.entry(reference.name.clone()).or_default();
            entries.remove(&prev.get().head.to_string());
            entries.insert(head.to_string(), serde_json::to_value(history)?);
            tracing::debug!("recording history for {} at {}", reference, head);
        }

        // Nothing changed this session: leave the file alone.
        if !changed {
            return Ok(());
        }

        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(FILE_NAME);
        let tmp = self.dir.join(".RefHistory.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(&document)?)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

fn read_document(dir: &Path) -> Document {
    let path = dir.join(FILE_NAME);
    let contents = match fs::read_to_string(&path) {
        Ok(contents) => contents,
        Err(_) => return Document::new(),
    };
    match serde_json::from_str(&contents) {
        Ok(document) => document,
        Err(e) => {
            tracing::debug!("discarding unreadable ref history at {:?}: {}", path, e);
            Document::new()
        }
    }
}

/// Lenient decoding: a history whose `current` cannot be resolved is
/// discarded entirely; individual stack snapshots and selection ids
/// that no longer resolve are dropped one by one.
fn decode_history(repo: &Repo, value: &Value) -> Option<RefHistory> {
    let current = decode_ref_state(repo, value.get("current")?)?;
    let undo = decode_states(repo, value.get("prev"));
    let redo = decode_states(repo, value.get("next"));
    Some(History::from_parts(current, undo, redo))
}

fn decode_states(repo: &Repo, value: Option<&Value>) -> VecDeque<RefState> {
    let mut out = VecDeque::new();
    if let Some(Value::Array(items)) = value {
        for item in items {
            if let Some(state) = decode_ref_state(repo, item) {
                out.push_back(state);
            }
        }
    }
    out
}

fn decode_ref_state(repo: &Repo, value: &Value) -> Option<RefState> {
    let head: CommitId = serde_json::from_value(value.get("head")?.clone()).ok()?;
    repo.lookup_commit(head).ok()?;
    let mut state = RefState::new(head);
    decode_ids(repo, value.get("selection"), &mut state.selection);
    decode_ids(repo, value.get("selectionPrev"), &mut state.selection_prev);
    Some(state)
}

fn decode_ids(repo: &Repo, value: Option<&Value>, out: &mut BTreeSet<CommitId>) {
    if let Some(Value::Array(items)) = value {
        for item in items {
            if let Ok(id) = serde_json::from_value::<CommitId>(item.clone()) {
                if repo.lookup_commit(id).is_ok() {
                    out.insert(id);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil;

    /// Repo with root A, A→B, branch "feature" at B.
    fn setup() -> (
        tempfile::TempDir,
        tempfile::TempDir,
        git2::Repository,
        git2::Oid,
        git2::Oid,
    ) {
        let state_dir = tempfile::tempdir().unwrap();
        let (repo_dir, raw) = testutil::init_repo();
        let a = testutil::commit_file(&raw, None, "a.txt", "a", "A", &[]);
        let b = testutil::commit_file(&raw, None, "b.txt", "b", "B", &[a]);
        let commit = raw.find_commit(b).unwrap();
        raw.branch("feature", &commit, false).unwrap();
        drop(commit);
        (state_dir, repo_dir, raw, a, b)
    }

    fn move_branch(raw: &git2::Repository, name: &str, to: git2::Oid) {
        let commit = raw.find_commit(to).unwrap();
        raw.branch(name, &commit, true).unwrap();
    }

    #[test]
    fn round_trip_resumes_when_the_head_matches() {
        let (state_dir, repo_dir, raw, a, _b) = setup();
        let repo = Repo::open(repo_dir.path()).unwrap();
        let feature = EditRef::branch("feature");
        let dir = state_dir.path().join("repo");

        let mut state = RepoState::load(dir.clone(), &repo, &[feature.clone()]).unwrap();
        // Simulate an edit: the branch now points at A.
        move_branch(&raw, "feature", a);
        let mut snapshot = RefState::new(CommitId(a));
        snapshot.selection.insert(CommitId(a));
        state.history_mut(&feature).unwrap().push(snapshot);
        state.write(&repo).unwrap();

        let reloaded = RepoState::load(dir, &repo, &[feature.clone()]).unwrap();
        assert_eq!(
            reloaded.history(&feature).unwrap(),
            state.history(&feature).unwrap()
        );
        assert!(reloaded.history(&feature).unwrap().can_undo());
    }

    #[test]
    fn unchanged_session_writes_nothing() {
        let (state_dir, repo_dir, _raw, _a, b) = setup();
        let repo = Repo::open(repo_dir.path()).unwrap();
        let feature = EditRef::branch("feature");
        let dir = state_dir.path().join("repo");

        let state = RepoState::load(dir.clone(), &repo, &[feature.clone()]).unwrap();
        state.write(&repo).unwrap();
        assert!(!dir.join(FILE_NAME).exists());

        let reloaded = RepoState::load(dir, &repo, &[feature.clone()]).unwrap();
        let current = reloaded.history(&feature).unwrap().get().clone();
        assert_eq!(current, RefState::new(CommitId(b)));
    }

    #[test]
    fn external_head_move_starts_fresh() {
        let (state_dir, repo_dir, raw, a, b) = setup();
        let repo = Repo::open(repo_dir.path()).unwrap();
        let feature = EditRef::branch("feature");
        let dir = state_dir.path().join("repo");

        let mut state = RepoState::load(dir.clone(), &repo, &[feature.clone()]).unwrap();
        move_branch(&raw, "feature", a);
        state
            .history_mut(&feature)
            .unwrap()
            .push(RefState::new(CommitId(a)));
        state.write(&repo).unwrap();

        // Another tool moves the branch; no persisted entry matches the
        // new head, so the session starts over.
        let c = testutil::commit_file(&raw, None, "c.txt", "c", "C", &[b]);
        move_branch(&raw, "feature", c);

        let reloaded = RepoState::load(dir, &repo, &[feature.clone()]).unwrap();
        let history = reloaded.history(&feature).unwrap();
        assert_eq!(*history.get(), RefState::new(CommitId(c)));
        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn unresolvable_entries_survive_a_write_verbatim() {
        let (state_dir, repo_dir, raw, a, _b) = setup();
        let repo = Repo::open(repo_dir.path()).unwrap();
        let feature = EditRef::branch("feature");
        let dir = state_dir.path().join("repo");

        // Seed the document with entries this process cannot resolve: a
        // ref that no longer exists and a stale commit key under an
        // edited ref.
        let ghost_state = serde_json::json!({
            "current": {"head": "00000000000000000000000000000000000000aa"}
        });
        let mut document = Document::new();
        document
            .entry("ghost".to_string())
            .or_default()
            .insert("00000000000000000000000000000000000000aa".into(), ghost_state.clone());
        document
            .entry("feature".to_string())
            .or_default()
            .insert("00000000000000000000000000000000000000bb".into(), ghost_state.clone());
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join(FILE_NAME),
            serde_json::to_string_pretty(&document).unwrap(),
        )
        .unwrap();

        let mut state = RepoState::load(dir.clone(), &repo, &[feature.clone()]).unwrap();
        move_branch(&raw, "feature", a);
        state
            .history_mut(&feature)
            .unwrap()
            .push(RefState::new(CommitId(a)));
        state.write(&repo).unwrap();

        let written = read_document(&dir);
        assert_eq!(
            written.get("ghost").and_then(|m| m.get("00000000000000000000000000000000000000aa")),
            Some(&ghost_state)
        );
        assert_eq!(
            written
                .get("feature")
                .and_then(|m| m.get("00000000000000000000000000000000000000bb")),
            Some(&ghost_state)
        );
        // And the real entry landed alongside them.
        assert!(written
            .get("feature")
            .and_then(|m| m.get(&a.to_string()))
            .is_some());
    }

    #[test]
    fn lenient_load_drops_only_what_cannot_resolve() {
        let (state_dir, repo_dir, _raw, a, b) = setup();
        let repo = Repo::open(repo_dir.path()).unwrap();
        let feature = EditRef::branch("feature");
        let dir = state_dir.path().join("repo");

        let bogus = "00000000000000000000000000000000000000ee";
        let entry = serde_json::json!({
            "current": {
                "head": b.to_string(),
                // One resolvable selection id and one bogus one.
                "selection": [a.to_string(), bogus],
            },
            "prev": [
                {"head": a.to_string()},
                {"head": bogus},
                "not even an object",
            ],
            "next": [],
        });
        let mut document = Document::new();
        document
            .entry("feature".to_string())
            .or_default()
            .insert(b.to_string(), entry);
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join(FILE_NAME),
            serde_json::to_string(&document).unwrap(),
        )
        .unwrap();

        let state = RepoState::load(dir, &repo, &[feature.clone()]).unwrap();
        let history = state.history(&feature).unwrap();
        assert_eq!(history.get().head, CommitId(b));
        assert_eq!(
            history.get().selection,
            BTreeSet::from([CommitId(a)])
        );
        // Of the three undo snapshots only the resolvable one survives.
        assert!(history.can_undo());
        assert_eq!(history.peek_undo().unwrap().head, CommitId(a));
    }
}
