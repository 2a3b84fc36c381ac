//! Squash a ref's head commit into its first parent.

use std::io::Write;

use anyhow::{bail, Result};

use crate::engine;
use crate::git::CommitId;
use crate::session::Session;

pub fn handle<W: Write>(session: &mut Session, output: &mut W, ref_name: &str) -> Result<()> {
    let reference = session.edit_ref(ref_name)?;
    let head = session.repo().ref_head(&reference)?;

    let parent = {
        let commit = session.repo().lookup_commit(head)?;
        commit.parent_id(0).ok().map(CommitId)
    };
    let Some(parent) = parent else {
        bail!("{} has a single commit; nothing to squash into", reference);
    };

    let squashed = engine::integrate(session.repo(), parent, head)?;
    session.record(&reference, squashed)?;

    writeln!(
        output,
        "squashed {} into {} as {}",
        head.short(),
        parent.short(),
        squashed.short()
    )?;
    Ok(())
}
