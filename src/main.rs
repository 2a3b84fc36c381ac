#![deny(clippy::mod_module_files)]
use std::io;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod engine;
mod error;
mod git;
mod history;
mod session;
mod state;
#[cfg(test)]
mod testutil;

use config::Config;
use session::Session;

/// Rewrite git history commit-by-commit, with per-ref undo.
#[derive(Parser)]
#[command(name = "git-histedit", version)]
struct Cli {
    /// Run as if started in this directory.
    #[arg(short = 'C', long = "repo", default_value = ".")]
    repo: PathBuf,

    /// Directory for persisted histories (default: the per-user config
    /// directory, or $GIT_HISTEDIT_STATE_DIR).
    #[arg(long)]
    state_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List a ref's commits, newest first, marking the current selection
    Log {
        /// Branch or tag to list (default: the checked-out branch)
        ref_name: Option<String>,
        /// Stop after this many commits
        #[arg(short = 'n', long, default_value_t = 20)]
        max: usize,
    },
    /// Cherry-pick a commit onto a ref's head
    Pick {
        /// Branch or tag to move
        ref_name: String,
        /// Commit (or revision expression) to pick
        commit: String,
    },
    /// Fold a ref's head commit into its parent
    Squash {
        /// Branch or tag to move
        ref_name: String,
    },
    /// Rewrite a ref's head commit message and/or author
    Amend {
        /// Branch or tag to move
        ref_name: String,
        /// New commit message
        #[arg(short, long)]
        message: Option<String>,
        /// New author, as "Name <email>"
        #[arg(long)]
        author: Option<String>,
    },
    /// Step a ref back to its previous recorded state
    Undo {
        /// Branch or tag to move
        ref_name: String,
    },
    /// Step a ref forward again after an undo
    Redo {
        /// Branch or tag to move
        ref_name: String,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load(cli.state_dir.clone())?;

    let ref_name = match &cli.command {
        Command::Log { ref_name, .. } => match ref_name {
            Some(name) => name.clone(),
            None => git::Repo::open(&cli.repo)?
                .current_branch_name()
                .ok_or_else(|| anyhow::anyhow!("HEAD is detached; name a branch or tag"))?,
        },
        Command::Pick { ref_name, .. }
        | Command::Squash { ref_name }
        | Command::Amend { ref_name, .. }
        | Command::Undo { ref_name }
        | Command::Redo { ref_name } => ref_name.clone(),
    };

    let mut session = Session::open(&config, &cli.repo, std::slice::from_ref(&ref_name))?;
    let stdout = io::stdout();
    let mut output = stdout.lock();

    match &cli.command {
        Command::Log { max, .. } => {
            commands::log::handle(&session, &mut output, &ref_name, *max)?;
        }
        Command::Pick { commit, .. } => {
            commands::pick::handle(&mut session, &mut output, &ref_name, commit)?;
        }
        Command::Squash { .. } => {
            commands::squash::handle(&mut session, &mut output, &ref_name)?;
        }
        Command::Amend {
            message, author, ..
        } => {
            commands::amend::handle(
                &mut session,
                &mut output,
                &ref_name,
                message.as_deref(),
                author.as_deref(),
            )?;
        }
        Command::Undo { .. } => {
            commands::undo::handle(&mut session, &mut output, &ref_name)?;
        }
        Command::Redo { .. } => {
            commands::redo::handle(&mut session, &mut output, &ref_name)?;
        }
    }

    session.finish()?;
    Ok(())
}
