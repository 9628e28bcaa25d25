//! Environment constants and path utilities.
//!
//! Directory names, file names and defaults used by configuration
//! discovery and the command line front end.

use std::path::{Path, PathBuf};

/// Application directory name (hidden directory like .git)
pub const COSYNTH_DIR_NAME: &str = ".cosynth";

/// Configuration file name inside the application directory
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Configuration file name looked up directly in the working directory
pub const LOCAL_CONFIG_FILE_NAME: &str = "cosynth.toml";

/// System-wide configuration directory (unix)
pub const SYSTEM_CONFIG_DIR: &str = "/etc/cosynth";

/// Log filter used when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "cosynth=info";

/// Log filter used with `--verbose`
pub const VERBOSE_LOG_FILTER: &str = "cosynth=debug";

/// Defaults for commands that read or write problem files
pub mod defaults {
    /// Problem file written by `generate` when no path is given
    pub const PROBLEM_FILE_NAME: &str = "problem.txt";

    /// Subtask count range of a synthesized compound task
    pub const COMPOUND_MIN_SUBTASKS: usize = 2;
    pub const COMPOUND_MAX_SUBTASKS: usize = 5;
}

/// Build the application directory path under `root`
pub fn cosynth_dir_path(root: &Path) -> PathBuf {
    root.join(COSYNTH_DIR_NAME)
}

/// Build config file path in user's home directory
pub fn user_config_file_path(home_dir: &Path) -> PathBuf {
    cosynth_dir_path(home_dir).join(CONFIG_FILE_NAME)
}

/// Build `./cosynth.toml`
pub fn local_config_file_path(current_dir: &Path) -> PathBuf {
    current_dir.join(LOCAL_CONFIG_FILE_NAME)
}

/// Build `./.cosynth/config.toml`
pub fn local_dir_config_file_path(current_dir: &Path) -> PathBuf {
    cosynth_dir_path(current_dir).join(CONFIG_FILE_NAME)
}

/// Build the system config file path
pub fn system_config_file_path() -> PathBuf {
    Path::new(SYSTEM_CONFIG_DIR).join(CONFIG_FILE_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_paths() {
        let home_dir = Path::new("/home/user");
        let current_dir = Path::new("/current/project");

        assert_eq!(
            user_config_file_path(home_dir),
            Path::new("/home/user/.cosynth/config.toml")
        );
        assert_eq!(
            local_config_file_path(current_dir),
            Path::new("/current/project/cosynth.toml")
        );
        assert_eq!(
            local_dir_config_file_path(current_dir),
            Path::new("/current/project/.cosynth/config.toml")
        );
        assert_eq!(
            system_config_file_path(),
            Path::new("/etc/cosynth/config.toml")
        );
    }
}
