use std::cmp::Ordering;
use std::fmt;

use super::CommitId;

/// Kind of a named ref. Only branches and tags may be edited; anything
/// else (remote-tracking refs, notes, ...) is read-only here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RefKind {
    Branch,
    Tag,
    Remote,
}

/// A mutable named pointer under edit: short name plus kind.
///
/// Branch upstreams and tag annotations are not cached here; they are
/// read back from the repository at replace time so that out-of-band
/// changes are picked up.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EditRef {
    pub name: String,
    pub kind: RefKind,
}

impl EditRef {
    pub fn branch(name: impl Into<String>) -> Self {
        EditRef {
            name: name.into(),
            kind: RefKind::Branch,
        }
    }

    pub fn tag(name: impl Into<String>) -> Self {
        EditRef {
            name: name.into(),
            kind: RefKind::Tag,
        }
    }

    /// Classify a resolved libgit2 reference; `None` for refs that do
    /// not live in a recognized namespace (e.g. direct HEAD).
    pub(crate) fn classify(reference: &git2::Reference<'_>) -> Option<EditRef> {
        let name = reference.shorthand()?.to_string();
        if reference.is_branch() {
            Some(EditRef {
                name,
                kind: RefKind::Branch,
            })
        } else if reference.is_tag() {
            Some(EditRef {
                name,
                kind: RefKind::Tag,
            })
        } else if reference.is_remote() {
            Some(EditRef {
                name,
                kind: RefKind::Remote,
            })
        } else {
            None
        }
    }
}

impl fmt::Display for EditRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A commit, optionally backed by the named ref that currently resolves
/// to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rev {
    /// A bare commit; never mutable.
    Detached(CommitId),
    /// A commit reached through a named ref. Invariant: the ref
    /// currently resolves to `head`.
    Named { reference: EditRef, head: CommitId },
}

impl Rev {
    pub fn commit(&self) -> CommitId {
        match self {
            Rev::Detached(id) => *id,
            Rev::Named { head, .. } => *head,
        }
    }

    pub fn edit_ref(&self) -> Option<&EditRef> {
        match self {
            Rev::Detached(_) => None,
            Rev::Named { reference, .. } => Some(reference),
        }
    }

    /// Whether mutation operations may be offered on this rev: it must
    /// be ref-backed, and the ref must be a branch or tag.
    pub fn is_mutable(&self) -> bool {
        match self {
            Rev::Detached(_) => false,
            Rev::Named { reference, .. } => {
                matches!(reference.kind, RefKind::Branch | RefKind::Tag)
            }
        }
    }
}

// Primary key is the commit id, secondary key is the ref identity, so
// two revs on the same commit via different refs stay distinct and
// orderable, with the bare rev sorting first.
impl Ord for Rev {
    fn cmp(&self, other: &Self) -> Ordering {
        self.commit()
            .cmp(&other.commit())
            .then_with(|| self.edit_ref().cmp(&other.edit_ref()))
    }
}

impl PartialOrd for Rev {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u8) -> CommitId {
        format!("{:040x}", n).parse().unwrap()
    }

    #[test]
    fn mutability_requires_a_branch_or_tag() {
        assert!(!Rev::Detached(id(1)).is_mutable());
        assert!(Rev::Named {
            reference: EditRef::branch("main"),
            head: id(1),
        }
        .is_mutable());
        assert!(Rev::Named {
            reference: EditRef::tag("v1"),
            head: id(1),
        }
        .is_mutable());
        assert!(!Rev::Named {
            reference: EditRef {
                name: "origin/main".to_string(),
                kind: RefKind::Remote,
            },
            head: id(1),
        }
        .is_mutable());
    }

    #[test]
    fn ordering_is_commit_first_then_ref() {
        let detached = Rev::Detached(id(1));
        let named = Rev::Named {
            reference: EditRef::branch("main"),
            head: id(1),
        };
        let other_ref = Rev::Named {
            reference: EditRef::tag("v1"),
            head: id(1),
        };
        let later_commit = Rev::Detached(id(2));

        // Same commit through different refs: distinct, bare rev first.
        assert_ne!(named, other_ref);
        assert!(detached < named);
        // Commit id dominates ref identity.
        assert!(named < later_commit);
    }
}
