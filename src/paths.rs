// Path helpers for the destination prompt: `~` expansion and turning user
// input into an absolute path whether or not it exists yet.

use anyhow::{Context, Result};
use std::env;
use std::path::{Component, Path, PathBuf};

/// Expand a leading `~` or `~/` against `home`. Other forms (`~user`) are
/// left untouched.
pub fn expand_tilde(input: &str, home: &Path) -> PathBuf {
    if input == "~" {
        return home.to_path_buf();
    }
    match input.strip_prefix("~/").or_else(|| input.strip_prefix("~\\")) {
        Some(rest) => home.join(rest),
        None => PathBuf::from(input),
    }
}

/// Absolute form of `path`. Existing paths are canonicalised (symlinks
/// resolved); missing ones are joined to the working directory and
/// normalised lexically.
pub fn absolutize(path: &Path) -> Result<PathBuf> {
    if let Ok(real) = path.canonicalize() {
        return Ok(real);
    }
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        env::current_dir()
            .context("Failed to read the current directory")?
            .join(path)
    };
    Ok(normalize(&joined))
}

fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
