//! Cherry-pick a commit onto a ref's head.

use std::io::Write;

use anyhow::{Context, Result};

use crate::engine;
use crate::session::Session;

pub fn handle<W: Write>(
    session: &mut Session,
    output: &mut W,
    ref_name: &str,
    commit_expr: &str,
) -> Result<()> {
    let reference = session.edit_ref(ref_name)?;
    let head = session.repo().ref_head(&reference)?;
    let src = session
        .repo()
        .resolve_revision(commit_expr)
        .with_context(|| format!("cannot resolve {}", commit_expr))?
        .commit();

    let picked = engine::attach(session.repo(), Some(head), src)?;
    session.record(&reference, picked)?;

    writeln!(
        output,
        "picked {} onto {} as {}",
        src.short(),
        reference,
        picked.short()
    )?;
    Ok(())
}
