//! List a ref's commits, newest first, marking the current selection.

use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, FixedOffset};

use crate::session::Session;

pub fn handle<W: Write>(
    session: &Session,
    output: &mut W,
    ref_name: &str,
    max: usize,
) -> Result<()> {
    let reference = session.edit_ref(ref_name)?;
    let selection = session.history(&reference)?.get().selection.clone();

    for id in session.repo().walk_commits(ref_name)?.take(max) {
        let id = id?;
        let marker = if selection.contains(&id) { '*' } else { ' ' };
        let (when, summary) = {
            let commit = session.repo().lookup_commit(id)?;
            let time = commit.time();
            (
                format_time(time.seconds(), time.offset_minutes()),
                commit.summary().unwrap_or("").to_string(),
            )
        };
        writeln!(output, "{} {} {} {}", marker, id.short(), when, summary)?;
    }
    Ok(())
}

fn format_time(seconds: i64, offset_minutes: i32) -> String {
    let offset = FixedOffset::east_opt(offset_minutes * 60)
        .unwrap_or_else(|| FixedOffset::east_opt(0).expect("zero offset is valid"));
    match DateTime::from_timestamp(seconds, 0) {
        Some(utc) => utc.with_timezone(&offset).format("%a %b %d %R").to_string(),
        None => "?".to_string(),
    }
}
