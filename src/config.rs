use std::{
    env,
    path::{Path, PathBuf},
};

use crate::error::{Error, Result};

/// Expand tilde (~) in path to user's home directory
fn expand_tilde(path: &Path) -> PathBuf {
    if let Some(s) = path.to_str() {
        if let Some(stripped) = s.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(stripped);
            }
        } else if s == "~" {
            if let Some(home) = dirs::home_dir() {
                return home;
            }
        }
    }
    path.to_path_buf()
}

/// Runtime configuration. Resolution order for the state directory:
/// explicit flag, `GIT_HISTEDIT_STATE_DIR`, then the per-user config
/// directory (`$XDG_CONFIG_HOME/git-histedit` on Linux).
#[derive(Debug, Clone)]
pub struct Config {
    pub state_dir: PathBuf,
}

impl Config {
    pub fn load(state_dir_flag: Option<PathBuf>) -> Result<Config> {
        if let Some(dir) = state_dir_flag {
            return Ok(Config {
                state_dir: expand_tilde(&dir),
            });
        }
        if let Ok(dir) = env::var("GIT_HISTEDIT_STATE_DIR") {
            return Ok(Config {
                state_dir: expand_tilde(&PathBuf::from(dir)),
            });
        }
        let base = dirs::config_dir().ok_or_else(|| {
            Error::InvalidArgument("could not determine a config directory for state".to_string())
        })?;
        Ok(Config {
            state_dir: base.join("git-histedit"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // One test so the env var mutation cannot race a parallel test.
    #[test]
    fn flag_then_environment_then_default() {
        env::set_var("GIT_HISTEDIT_STATE_DIR", "/tmp/env-state");
        let config = Config::load(Some(PathBuf::from("/tmp/flag-state"))).unwrap();
        assert_eq!(config.state_dir, PathBuf::from("/tmp/flag-state"));
        let config = Config::load(None).unwrap();
        assert_eq!(config.state_dir, PathBuf::from("/tmp/env-state"));
        env::remove_var("GIT_HISTEDIT_STATE_DIR");

        let config = Config::load(None).unwrap();
        assert!(config.state_dir.ends_with("git-histedit"));
    }

    #[test]
    fn tilde_expansion() {
        if let Some(home) = dirs::home_dir() {
            let config = Config::load(Some(PathBuf::from("~/state"))).unwrap();
            assert_eq!(config.state_dir, home.join("state"));
        }
    }
}
