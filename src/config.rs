// Runtime settings: every fixed path and program name the tool uses lives
// here so the rest of the crate never hard-codes them. Each value can be
// overridden from the environment.

use std::env;
use std::path::{Path, PathBuf};

/// Name of the downloader binary looked up on PATH by default.
pub const DEFAULT_DOWNLOADER: &str = "icloudpd";

/// File holding previously used Apple IDs, stored beside the executable.
pub const IDENTITY_FILE_NAME: &str = "known_apple_ids.txt";

pub const ENV_DOWNLOADER: &str = "ICLOUDPD_BIN";
pub const ENV_COOKIE_DIR: &str = "ICLOUDPD_COOKIE_DIR";
pub const ENV_DEST: &str = "ICLOUD_YEAR_SELECTOR_DEST";
pub const ENV_IDENTITY_FILE: &str = "ICLOUD_YEAR_SELECTOR_IDS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Program used for every downloader invocation.
    pub downloader: String,
    /// Where the downloader keeps its session cookies.
    pub cookie_dir: PathBuf,
    /// Destination used when the user leaves the prompt blank.
    pub default_dest: PathBuf,
    /// Text file with one known Apple ID per line.
    pub identity_file: PathBuf,
}

impl Settings {
    /// Build settings from the environment, falling back to the defaults
    /// under the user's home directory.
    pub fn from_env() -> Self {
        let home = home_dir();
        Settings {
            downloader: env_var(ENV_DOWNLOADER).unwrap_or_else(|| DEFAULT_DOWNLOADER.into()),
            cookie_dir: env_var(ENV_COOKIE_DIR)
                .map(PathBuf::from)
                .unwrap_or_else(|| home.join(".pyicloud")),
            default_dest: env_var(ENV_DEST)
                .map(PathBuf::from)
                .unwrap_or_else(|| home.join("iCloudPD_Test")),
            identity_file: env_var(ENV_IDENTITY_FILE)
                .map(PathBuf::from)
                .unwrap_or_else(default_identity_file),
        }
    }
}

/// Home directory, or `.` when the platform cannot tell us.
pub fn home_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

fn env_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn default_identity_file() -> PathBuf {
    // The file sits next to the installed binary, not the working directory.
    let dir = env::current_exe()
        .ok()
        .and_then(|exe| exe.canonicalize().ok())
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."));
    dir.join(IDENTITY_FILE_NAME)
}
