//! History-mutation engine: every operation writes new immutable
//! objects and returns the new commit id; refs move only in
//! [`replace_ref`], after all object writes have succeeded, so a failed
//! operation never leaves a partial result visible through any ref.

use crate::error::{Error, Result};
use crate::git::{CommitId, EditRef, RefKind, Repo, Signature};

/// Cherry-pick `src` onto `dst`.
///
/// With no `dst`, the result is a new root commit carrying `src`'s tree.
/// Otherwise the change `src` made relative to its first parent is
/// replayed onto `dst`'s tree with a three-way merge and committed with
/// `dst` as sole parent. Authorship, message, and encoding are copied
/// from `src` — the acting user is not stamped in.
pub fn attach(repo: &Repo, dst: Option<CommitId>, src: CommitId) -> Result<CommitId> {
    let src_commit = repo.lookup_commit(src)?;

    let dst_commit = match dst {
        Some(dst) => repo.lookup_commit(dst)?,
        None => {
            let tree = src_commit.tree()?;
            let id = repo.raw().commit(
                None,
                &src_commit.author(),
                &src_commit.committer(),
                src_commit.message().unwrap_or(""),
                &tree,
                &[],
            )?;
            return carry_encoding(repo, id, &src_commit);
        }
    };

    let ancestor = ancestor_tree(repo, &src_commit)?;
    let merged = merge_trees(repo, &ancestor, &dst_commit.tree()?, &src_commit.tree()?)?;
    let id = repo.raw().commit(
        None,
        &src_commit.author(),
        &src_commit.committer(),
        src_commit.message().unwrap_or(""),
        &merged,
        &[&dst_commit],
    )?;
    carry_encoding(repo, id, &src_commit)
}

/// Squash `src` into `dst`.
///
/// Replays `src`'s change onto `dst`'s tree and amends `dst` with the
/// merged tree and the concatenated message `dst + "\n" + src`. `dst`'s
/// author, committer, and parents are preserved; its original id becomes
/// unreachable once the ref is repointed.
pub fn integrate(repo: &Repo, dst: CommitId, src: CommitId) -> Result<CommitId> {
    let src_commit = repo.lookup_commit(src)?;
    let dst_commit = repo.lookup_commit(dst)?;

    let parent = src_commit
        .parent(0)
        .map_err(|_| Error::InvalidArgument(format!("cannot squash root commit {}", src)))?;
    let merged = merge_trees(
        repo,
        &parent.tree()?,
        &dst_commit.tree()?,
        &src_commit.tree()?,
    )?;

    let message = format!(
        "{}\n{}",
        dst_commit.message().unwrap_or(""),
        src_commit.message().unwrap_or("")
    );
    let id = dst_commit.amend(None, None, None, None, Some(&message), Some(&merged))?;
    Ok(CommitId(id))
}

/// Rewrite `commit` with the given metadata overrides. Tree and parents
/// are always carried over; omitted fields keep the original values.
pub fn amend(
    repo: &Repo,
    commit: CommitId,
    author: Option<&Signature>,
    message: Option<&str>,
) -> Result<CommitId> {
    let target = repo.lookup_commit(commit)?;
    let author = author.map(Signature::to_git).transpose()?;
    let id = target.amend(None, author.as_ref(), None, None, message, None)?;
    Ok(CommitId(id))
}

/// Repoint `reference` at `new_head`, preserving the metadata a naive
/// pointer move would drop: a branch keeps its upstream, an annotated
/// tag keeps its annotation (tagger + message), a lightweight tag stays
/// lightweight.
pub fn replace_ref(repo: &Repo, reference: &EditRef, new_head: CommitId) -> Result<EditRef> {
    let commit = repo.lookup_commit(new_head)?;
    match reference.kind {
        RefKind::Branch => {
            let upstream = repo
                .raw()
                .find_branch(&reference.name, git2::BranchType::Local)
                .ok()
                .and_then(|b| b.upstream().ok())
                .and_then(|u| u.name().ok().flatten().map(String::from));

            let mut branch = repo.raw().branch(&reference.name, &commit, true)?;
            if let Some(upstream) = upstream {
                if branch.upstream().is_err() {
                    branch.set_upstream(Some(&upstream))?;
                }
            }
            Ok(reference.clone())
        }
        RefKind::Tag => {
            let full = Repo::full_ref_name(reference);
            let tag_ref = match repo.raw().find_reference(&full) {
                Ok(r) => r,
                Err(_) => return Err(Error::RefNotFound(reference.name.clone())),
            };
            let annotation = tag_ref
                .target()
                .and_then(|oid| repo.raw().find_tag(oid).ok());

            match annotation {
                Some(tag) => {
                    let tagger = match tag.tagger() {
                        Some(tagger) => Signature::from_git(&tagger).to_git()?,
                        None => repo.raw().signature()?,
                    };
                    repo.raw().tag(
                        &reference.name,
                        commit.as_object(),
                        &tagger,
                        tag.message().unwrap_or(""),
                        true,
                    )?;
                }
                None => {
                    repo.raw()
                        .tag_lightweight(&reference.name, commit.as_object(), true)?;
                }
            }
            Ok(reference.clone())
        }
        RefKind::Remote => Err(Error::UnsupportedRefKind(reference.name.clone())),
    }
}

/// Tree of `src`'s first parent, or the empty tree for a root commit.
fn ancestor_tree<'r>(repo: &'r Repo, src: &git2::Commit<'_>) -> Result<git2::Tree<'r>> {
    match src.parent(0) {
        Ok(parent) => {
            let id = parent.tree_id();
            Ok(repo.raw().find_tree(id)?)
        }
        Err(_) => {
            let builder = repo.raw().treebuilder(None)?;
            let id = builder.write()?;
            Ok(repo.raw().find_tree(id)?)
        }
    }
}

/// Three-way tree merge via the store's standard algorithm. A conflicted
/// index is rejected; nothing referenced by a ref has been written at
/// that point.
fn merge_trees<'r>(
    repo: &'r Repo,
    ancestor: &git2::Tree<'_>,
    ours: &git2::Tree<'_>,
    theirs: &git2::Tree<'_>,
) -> Result<git2::Tree<'r>> {
    let mut index = repo.raw().merge_trees(ancestor, ours, theirs, None)?;
    if index.has_conflicts() {
        let mut paths = Vec::new();
        for conflict in index.conflicts()? {
            let conflict = conflict?;
            let entry = conflict.our.or(conflict.their).or(conflict.ancestor);
            if let Some(entry) = entry {
                paths.push(String::from_utf8_lossy(&entry.path).into_owned());
            }
        }
        return Err(Error::MergeConflict(paths));
    }
    let tree_id = index.write_tree_to(repo.raw())?;
    Ok(repo.raw().find_tree(tree_id)?)
}

/// `Repository::commit` takes no message encoding, so a non-default
/// encoding on `src` is applied with a follow-up amend before any ref
/// can observe the commit.
fn carry_encoding(repo: &Repo, id: git2::Oid, src: &git2::Commit<'_>) -> Result<CommitId> {
    match src.message_encoding() {
        Some(encoding) => {
            let commit = repo.lookup_commit(CommitId(id))?;
            let id = commit.amend(None, None, None, Some(encoding), None, None)?;
            Ok(CommitId(id))
        }
        None => Ok(CommitId(id)),
    }
}
