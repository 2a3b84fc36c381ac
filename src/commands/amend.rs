//! Rewrite a ref's head commit metadata.

use std::io::Write;

use anyhow::{bail, Result};

use crate::engine;
use crate::git::Signature;
use crate::session::Session;

pub fn handle<W: Write>(
    session: &mut Session,
    output: &mut W,
    ref_name: &str,
    message: Option<&str>,
    author: Option<&str>,
) -> Result<()> {
    if message.is_none() && author.is_none() {
        bail!("nothing to amend: pass --message and/or --author");
    }
    let author = author.map(Signature::parse).transpose()?;

    let reference = session.edit_ref(ref_name)?;
    let head = session.repo().ref_head(&reference)?;
    let amended = engine::amend(session.repo(), head, author.as_ref(), message)?;
    session.record(&reference, amended)?;

    writeln!(output, "amended {} as {}", head.short(), amended.short())?;
    Ok(())
}
