use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::error::{Error, Result};
use crate::git::Repo;

/// Current on-disk schema version.
pub const STATE_VERSION: u32 = 0;

/// Root of the persisted state: holds the exclusive lock on the
/// `Version` file for the lifetime of the editing session, so every
/// read-then-write sequence against the ref-history files happens under
/// one cross-process lock. The lock is released when the `StateDir` is
/// dropped.
pub struct StateDir {
    root: PathBuf,
    // Keeps the flock alive; the OS releases it on close.
    _lock: File,
}

impl StateDir {
    /// Open (creating if absent) and lock the state directory, checking
    /// the schema version before anything else is read or written.
    pub fn open(root: &Path) -> Result<StateDir> {
        fs::create_dir_all(root)?;
        let mut lock = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(root.join("Version"))?;
        lock.lock_exclusive()?;

        let mut contents = String::new();
        lock.read_to_string(&mut contents)?;
        let on_disk: Option<u32> = serde_json::from_str(contents.trim()).ok();

        match on_disk {
            Some(version) if version > STATE_VERSION => {
                return Err(Error::VersionMismatch {
                    on_disk: version,
                    supported: STATE_VERSION,
                });
            }
            Some(version) if version < STATE_VERSION => {
                Self::migrate(root, version)?;
                Self::write_version(&mut lock)?;
            }
            Some(_) => {}
            // Absent or unreadable: initialize fresh. Stale repo state
            // is harmless; the lenient loader drops what it cannot
            // resolve.
            None => Self::write_version(&mut lock)?,
        }

        tracing::debug!("state directory ready at {:?}", root);
        Ok(StateDir {
            root: root.to_path_buf(),
            _lock: lock,
        })
    }

    /// Per-repository state directory: the canonicalized repo path with
    /// separators flattened to dashes, under `Repo/`.
    pub fn repo_state_dir(&self, repo: &Repo) -> Result<PathBuf> {
        let canonical = fs::canonicalize(repo.path())?;
        let name: String = canonical
            .to_string_lossy()
            .chars()
            .map(|c| if c == std::path::MAIN_SEPARATOR { '-' } else { c })
            .collect();
        Ok(self.root.join("Repo").join(name))
    }

    fn write_version(lock: &mut File) -> Result<()> {
        lock.set_len(0)?;
        lock.seek(SeekFrom::Start(0))?;
        lock.write_all(serde_json::to_string(&STATE_VERSION)?.as_bytes())?;
        lock.flush()?;
        Ok(())
    }

    /// Upgrade older on-disk state in place. No schema changes have
    /// shipped yet, so every known older version is a no-op.
    fn migrate(_root: &Path, from: u32) -> Result<()> {
        tracing::info!("migrating state from v{} to v{}", from, STATE_VERSION);
        Ok(())
    }
}
