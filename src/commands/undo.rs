//! Step a ref back to its previous recorded state.

use std::io::Write;

use anyhow::Result;

use crate::session::Session;

pub fn handle<W: Write>(session: &mut Session, output: &mut W, ref_name: &str) -> Result<()> {
    let reference = session.edit_ref(ref_name)?;
    match session.undo(&reference)? {
        Some(restored) => writeln!(output, "{} is now {}", reference, restored.head.short())?,
        None => writeln!(output, "nothing to undo on {}", reference)?,
    }
    Ok(())
}
