// Downloader module: builds `icloudpd` invocations and runs them. The child
// process shares our terminal so its own prompts (two-factor codes, progress
// output) reach the user untouched.

use crate::config::Settings;
use crate::years::YearRange;
use anyhow::{Context, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use tracing::{debug, info};

/// strftime-style template; photos land in `2024/06-Jun` style folders.
pub const FOLDER_STRUCTURE: &str = "{:%Y/%m-%b}";

pub const SKIP_VIDEOS_FLAG: &str = "--skip-videos";
pub const DRY_RUN_FLAG: &str = "--dry-run";

/// A fully built downloader invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloaderCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl DownloaderCommand {
    /// Program followed by its arguments.
    pub fn argv(&self) -> Vec<&str> {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect()
    }
}

/// Shell-like rendering used for display and for the run log: words with
/// spaces are wrapped in double quotes, nothing else is escaped.
impl fmt::Display for DownloaderCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let words: Vec<String> = self
            .argv()
            .into_iter()
            .map(|w| {
                if w.contains(' ') {
                    format!("\"{}\"", w)
                } else {
                    w.to_string()
                }
            })
            .collect();
        write!(f, "{}", words.join(" "))
    }
}

/// Knows which program to call and where its cookies live.
#[derive(Debug, Clone)]
pub struct Downloader {
    program: String,
    cookie_dir: PathBuf,
}

impl Downloader {
    pub fn new(program: impl Into<String>, cookie_dir: impl Into<PathBuf>) -> Self {
        Downloader {
            program: program.into(),
            cookie_dir: cookie_dir.into(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.downloader.clone(), settings.cookie_dir.clone())
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn cookie_dir(&self) -> &Path {
        &self.cookie_dir
    }

    /// Login and two-factor handshake only; nothing is downloaded.
    pub fn auth_command(&self, username: &str) -> DownloaderCommand {
        DownloaderCommand {
            program: self.program.clone(),
            args: vec![
                "--auth-only".into(),
                "--username".into(),
                username.into(),
                "--cookie-directory".into(),
                path_arg(&self.cookie_dir),
            ],
        }
    }

    /// Download everything created inside `range` (inclusive) into `dest`.
    /// The range is expressed as a pair of exclusion dates; `extra` flags
    /// are appended verbatim.
    pub fn sync_command(
        &self,
        username: &str,
        dest: &Path,
        range: YearRange,
        extra: &[String],
    ) -> DownloaderCommand {
        let mut args: Vec<String> = vec![
            "--username".into(),
            username.into(),
            "--directory".into(),
            path_arg(dest),
            "--folder-structure".into(),
            FOLDER_STRUCTURE.into(),
            "--set-exif-datetime".into(),
            "--size".into(),
            "original".into(),
            "--skip-created-before".into(),
            range.skip_created_before(),
            "--skip-created-after".into(),
            range.skip_created_after(),
            "--cookie-directory".into(),
            path_arg(&self.cookie_dir),
        ];
        args.extend(extra.iter().cloned());
        DownloaderCommand {
            program: self.program.clone(),
            args,
        }
    }
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Something that can run a downloader command to completion and hand back
/// its exit code.
pub trait ProcessRunner {
    fn run(&mut self, command: &DownloaderCommand) -> Result<i32>;
}

/// Runs commands as real child processes with inherited stdio.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(&mut self, command: &DownloaderCommand) -> Result<i32> {
        info!(command = %command, "spawning downloader");
        let status = Command::new(&command.program)
            .args(&command.args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .with_context(|| format!("Failed to start '{}'. Is it installed and on PATH?", command.program))?;
        let code = exit_code(status);
        debug!(code, "downloader finished");
        Ok(code)
    }
}

/// Exit code as reported by the child. A child killed by a signal reports
/// the negated signal number.
#[cfg(unix)]
fn exit_code(status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    status
        .code()
        .or_else(|| status.signal().map(|s| -s))
        .unwrap_or(-1)
}

#[cfg(not(unix))]
fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(-1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn downloader() -> Downloader {
        Downloader::new("icloudpd", "/home/me/.pyicloud")
    }

    fn has_pair(cmd: &DownloaderCommand, flag: &str, value: &str) -> bool {
        cmd.args.windows(2).any(|w| w[0] == flag && w[1] == value)
    }

    #[test]
    fn test_sync_command_layout() {
        let (range, _) = YearRange::ordered(2018, 2020);
        let cmd = downloader().sync_command("a@x.com", Path::new("/photos"), range, &[]);

        assert_eq!(
            cmd.argv(),
            vec![
                "icloudpd",
                "--username",
                "a@x.com",
                "--directory",
                "/photos",
                "--folder-structure",
                "{:%Y/%m-%b}",
                "--set-exif-datetime",
                "--size",
                "original",
                "--skip-created-before",
                "2018-01-01",
                "--skip-created-after",
                "2021-01-01",
                "--cookie-directory",
                "/home/me/.pyicloud",
            ]
        );
    }

    #[test]
    fn test_sync_command_exclusion_pair_for_every_range() {
        let d = downloader();
        for start in 1900..1910 {
            for end in start..start + 4 {
                let (range, _) = YearRange::ordered(start, end);
                let cmd = d.sync_command("a@x.com", Path::new("/p"), range, &[]);
                assert!(has_pair(&cmd, "--skip-created-before", &format!("{}-01-01", start)));
                assert!(has_pair(&cmd, "--skip-created-after", &format!("{}-01-01", end + 1)));
            }
        }
    }

    #[test]
    fn test_extra_flags_appended_last() {
        let extra = vec![SKIP_VIDEOS_FLAG.to_string(), DRY_RUN_FLAG.to_string()];
        let cmd = downloader().sync_command(
            "a@x.com",
            Path::new("/p"),
            YearRange::ordered(2020, 2020).0,
            &extra,
        );

        let n = cmd.args.len();
        assert_eq!(&cmd.args[n - 2..], &["--skip-videos", "--dry-run"]);
    }

    #[test]
    fn test_auth_command() {
        let cmd = downloader().auth_command("b@y.com");
        assert_eq!(
            cmd.to_string(),
            "icloudpd --auth-only --username b@y.com --cookie-directory /home/me/.pyicloud"
        );
    }

    #[test]
    fn test_display_quotes_words_with_spaces() {
        let cmd = downloader().sync_command(
            "a@x.com",
            Path::new("/Users/me/My Photos"),
            YearRange::ordered(2020, 2020).0,
            &[],
        );
        let shown = cmd.to_string();
        assert!(shown.contains("--directory \"/Users/me/My Photos\" "));
        assert!(shown.contains("--folder-structure {:%Y/%m-%b} "));
    }

    #[cfg(unix)]
    #[test]
    fn test_system_runner_returns_exit_code() {
        let mut runner = SystemRunner;
        let ok = DownloaderCommand {
            program: "sh".into(),
            args: vec!["-c".into(), "exit 0".into()],
        };
        let failed = DownloaderCommand {
            program: "sh".into(),
            args: vec!["-c".into(), "exit 3".into()],
        };

        assert_eq!(runner.run(&ok).unwrap(), 0);
        assert_eq!(runner.run(&failed).unwrap(), 3);
    }

    #[test]
    fn test_system_runner_missing_program_is_error() {
        let mut runner = SystemRunner;
        let cmd = DownloaderCommand {
            program: "definitely-not-a-real-downloader-binary".into(),
            args: vec![],
        };

        let err = runner.run(&cmd).unwrap_err();
        assert!(err.to_string().contains("Failed to start"));
    }
}
