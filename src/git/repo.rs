use std::path::Path;

use crate::error::{Error, Result};

use super::{CommitId, EditRef, RefKind, Rev};

fn is_not_found(e: &git2::Error) -> bool {
    e.code() == git2::ErrorCode::NotFound
}

/// Ownership wrapper around the underlying object database.
///
/// `git2` handles release the native resource when the last owner is
/// dropped, mirroring libgit2's own reference counting; none of them are
/// `Sync`, so a `Repo` stays on the thread that opened it.
pub struct Repo {
    inner: git2::Repository,
}

impl Repo {
    pub fn open(path: &Path) -> Result<Repo> {
        match git2::Repository::open(path) {
            Ok(inner) => Ok(Repo { inner }),
            Err(e) if is_not_found(&e) => Err(Error::NotAGitRepository(path.to_path_buf())),
            Err(e) => Err(e.into()),
        }
    }

    /// The repository's `.git` directory.
    pub fn path(&self) -> &Path {
        self.inner.path()
    }

    pub(crate) fn raw(&self) -> &git2::Repository {
        &self.inner
    }

    pub fn lookup_commit(&self, id: CommitId) -> Result<git2::Commit<'_>> {
        match self.inner.find_commit(id.raw()) {
            Ok(commit) => Ok(commit),
            Err(e) if is_not_found(&e) => Err(Error::CommitNotFound(id.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    /// Resolve a user-supplied revision: ref resolution first (branch,
    /// tag, dwim short-name matching), falling back to generic revision
    /// expression parsing. A ref hit produces a ref-backed rev.
    pub fn resolve_revision(&self, expr: &str) -> Result<Rev> {
        if let Ok(reference) = self.inner.resolve_reference_from_short_name(expr) {
            if let Some(edit) = EditRef::classify(&reference) {
                let head = CommitId(reference.peel_to_commit()?.id());
                return Ok(Rev::Named {
                    reference: edit,
                    head,
                });
            }
        }
        let object = match self.inner.revparse_single(expr) {
            Ok(object) => object,
            Err(e) if is_not_found(&e) => return Err(Error::CommitNotFound(expr.to_string())),
            Err(_) => return Err(Error::InvalidRevision(expr.to_string())),
        };
        let commit = object
            .peel_to_commit()
            .map_err(|_| Error::InvalidRevision(expr.to_string()))?;
        Ok(Rev::Detached(CommitId(commit.id())))
    }

    /// Current head commit of a ref under edit.
    pub fn ref_head(&self, reference: &EditRef) -> Result<CommitId> {
        let full = Self::full_ref_name(reference);
        match self.inner.find_reference(&full) {
            Ok(r) => Ok(CommitId(r.peel_to_commit()?.id())),
            Err(e) if is_not_found(&e) => Err(Error::RefNotFound(reference.name.clone())),
            Err(e) => Err(e.into()),
        }
    }

    pub(crate) fn full_ref_name(reference: &EditRef) -> String {
        match reference.kind {
            RefKind::Branch => format!("refs/heads/{}", reference.name),
            RefKind::Tag => format!("refs/tags/{}", reference.name),
            RefKind::Remote => format!("refs/remotes/{}", reference.name),
        }
    }

    /// Name of the branch HEAD points at; `None` when detached or the
    /// branch is unborn.
    pub fn current_branch_name(&self) -> Option<String> {
        let head = self.inner.find_reference("HEAD").ok()?;
        let target = head.symbolic_target()?;
        target.strip_prefix("refs/heads/").map(|s| s.to_string())
    }

    /// Lazy, single-pass walk over `range` in reverse topological
    /// (newest-first) order. The walker is consumed by iteration; create
    /// a fresh one to re-enumerate.
    pub fn walk_commits(&self, range: &str) -> Result<CommitWalk<'_>> {
        let mut walk = self.inner.revwalk()?;
        walk.set_sorting(git2::Sort::TOPOLOGICAL)?;
        if range.contains("..") {
            walk.push_range(range)
                .map_err(|_| Error::InvalidRevision(range.to_string()))?;
        } else {
            let rev = self.resolve_revision(range)?;
            walk.push(rev.commit().raw())?;
        }
        Ok(CommitWalk { walk })
    }
}

pub struct CommitWalk<'repo> {
    walk: git2::Revwalk<'repo>,
}

impl Iterator for CommitWalk<'_> {
    type Item = Result<CommitId>;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.walk.next()?;
        Some(next.map(CommitId).map_err(Error::from))
    }
}
