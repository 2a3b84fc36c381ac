use std::fmt;
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    /// The given path is not (inside) a git repository.
    NotAGitRepository(PathBuf),
    /// A commit lookup missed; carries the id or expression.
    CommitNotFound(String),
    /// A branch/tag/ref lookup missed.
    RefNotFound(String),
    /// Malformed object id or revision expression.
    InvalidRevision(String),
    /// A caller-supplied argument that cannot be honored.
    InvalidArgument(String),
    /// `replace_ref` on a ref kind other than branch or tag.
    UnsupportedRefKind(String),
    /// Three-way tree merge produced conflicts; carries the paths.
    MergeConflict(Vec<String>),
    /// An underlying object-store primitive failed; carries the native
    /// diagnostic text. The repository's ref set is unchanged.
    OperationFailed(String),
    /// On-disk state schema is newer than this build supports.
    VersionMismatch { on_disk: u32, supported: u32 },
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::NotAGitRepository(path) => {
                write!(f, "not a git repository: {}", path.display())
            }
            Error::CommitNotFound(what) => write!(f, "commit not found: {}", what),
            Error::RefNotFound(name) => write!(f, "ref not found: {}", name),
            Error::InvalidRevision(expr) => write!(f, "invalid revision: {}", expr),
            Error::InvalidArgument(msg) => write!(f, "invalid argument: {}", msg),
            Error::UnsupportedRefKind(name) => {
                write!(f, "unsupported ref kind (not a branch or tag): {}", name)
            }
            Error::MergeConflict(paths) => {
                write!(f, "merge conflict in: {}", paths.join(", "))
            }
            Error::OperationFailed(msg) => write!(f, "git operation failed: {}", msg),
            Error::VersionMismatch { on_disk, supported } => write!(
                f,
                "state on disk (v{}) is newer than this build supports (v{}); \
                 upgrade git-histedit or remove the state directory",
                on_disk, supported
            ),
            Error::Io(e) => write!(f, "IO error: {}", e),
            Error::Json(e) => write!(f, "JSON error: {}", e),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Json(e)
    }
}

impl From<git2::Error> for Error {
    fn from(e: git2::Error) -> Self {
        Error::OperationFailed(e.message().to_string())
    }
}
