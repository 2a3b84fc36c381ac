//! Step a ref forward to its next recorded state.

use std::io::Write;

use anyhow::Result;

use crate::session::Session;

pub fn handle<W: Write>(session: &mut Session, output: &mut W, ref_name: &str) -> Result<()> {
    let reference = session.edit_ref(ref_name)?;
    match session.redo(&reference)? {
        Some(restored) => writeln!(output, "{} is now {}", reference, restored.head.short())?,
        None => writeln!(output, "nothing to redo on {}", reference)?,
    }
    Ok(())
}
