use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::git::CommitId;
use crate::history::History;

/// One point-in-time snapshot of a ref under edit: where it points and
/// what the user has selected. Field names are part of the on-disk
/// format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefState {
    pub head: CommitId,
    #[serde(default)]
    pub selection: BTreeSet<CommitId>,
    #[serde(default, rename = "selectionPrev")]
    pub selection_prev: BTreeSet<CommitId>,
}

impl RefState {
    pub fn new(head: CommitId) -> Self {
        RefState {
            head,
            selection: BTreeSet::new(),
            selection_prev: BTreeSet::new(),
        }
    }
}

pub type RefHistory = History<RefState>;
