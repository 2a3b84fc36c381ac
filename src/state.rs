mod dir;
mod ref_state;
mod repo_state;

pub use dir::{StateDir, STATE_VERSION};
pub use ref_state::{RefHistory, RefState};
pub use repo_state::RepoState;
