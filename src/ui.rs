// UI layer: the interactive prompt sequence and the two run flows built on
// it. Every read and write to the terminal goes through `Prompter`, so the
// flows run the same against `dialoguer` or a scripted test double.

use crate::config::{home_dir, Settings};
use crate::downloader::{
    Downloader, DownloaderCommand, ProcessRunner, DRY_RUN_FLAG, SKIP_VIDEOS_FLAG,
};
use crate::history::{self, RunRecord};
use crate::identities::IdentityStore;
use crate::paths::{absolutize, expand_tilde};
use crate::years::{max_year, parse_year, YearError, YearRange, MIN_YEAR};
use anyhow::{Context, Result};
use crossterm::style::{style, Stylize};
use dialoguer::{Confirm, Input};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Terminal interaction used by the flows.
pub trait Prompter {
    /// Free text; may come back empty. Surrounding whitespace is trimmed.
    fn input(&mut self, prompt: &str) -> Result<String>;
    /// Yes/no question with a default for a bare Enter.
    fn confirm(&mut self, prompt: &str, default: bool) -> Result<bool>;
    fn say(&mut self, message: &str);
    fn warn(&mut self, message: &str);
}

/// `Prompter` backed by `dialoguer` on the real terminal.
#[derive(Debug, Default)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn input(&mut self, prompt: &str) -> Result<String> {
        let answer = Input::<String>::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()?;
        Ok(answer.trim().to_string())
    }

    fn confirm(&mut self, prompt: &str, default: bool) -> Result<bool> {
        Ok(Confirm::new().with_prompt(prompt).default(default).interact()?)
    }

    fn say(&mut self, message: &str) {
        println!("{}", message);
    }

    fn warn(&mut self, message: &str) {
        println!("{}", style(message).yellow());
    }
}

/// Why an identity choice was refused; the text is shown before re-asking.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    #[error("Invalid selection.")]
    OutOfRange,

    #[error("Invalid input. Please enter a number or a valid email.")]
    NotAnIdentity,

    #[error("Invalid Apple ID format. Please try again.")]
    BadFormat,
}

/// Resolve a choice typed against the numbered list of known identities:
/// a 1-based index or a new address containing `@`.
pub fn parse_identity_choice(choice: &str, known: &[String]) -> Result<String, SelectionError> {
    let choice = choice.trim();
    if !choice.is_empty() && choice.chars().all(|c| c.is_ascii_digit()) {
        return choice
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|idx| known.get(idx))
            .cloned()
            .ok_or(SelectionError::OutOfRange);
    }
    if choice.contains('@') {
        return Ok(choice.to_string());
    }
    Err(SelectionError::NotAnIdentity)
}

/// Check a freshly typed identity when there is no list to pick from.
pub fn parse_new_identity(input: &str) -> Result<String, SelectionError> {
    let input = input.trim();
    if input.contains('@') {
        Ok(input.to_string())
    } else {
        Err(SelectionError::BadFormat)
    }
}

/// Ask which Apple ID to use until a valid answer arrives.
pub fn prompt_identity(p: &mut dyn Prompter, known: &[String]) -> Result<String> {
    loop {
        p.say("\n--- Apple ID Selection ---");
        let parsed = if known.is_empty() {
            let answer = p.input("Enter your Apple ID email (e.g., name@example.com)")?;
            parse_new_identity(&answer)
        } else {
            p.say("Select a known Apple ID or enter a new one:");
            for (i, id) in known.iter().enumerate() {
                p.say(&format!("  [{}] {}", i + 1, id));
            }
            let answer = p.input(&format!(
                "Enter choice (1-{}) or new email",
                known.len()
            ))?;
            parse_identity_choice(&answer, known)
        };
        match parsed {
            Ok(id) => return Ok(id),
            Err(e) => p.warn(&e.to_string()),
        }
    }
}

/// Offer an auth-only run for an identity we have not seen before. The
/// identity is remembered once the child exits, whatever its status.
/// Returns the child's exit code when the offer was taken.
pub fn offer_auth(
    p: &mut dyn Prompter,
    runner: &mut dyn ProcessRunner,
    downloader: &Downloader,
    store: &IdentityStore,
    username: &str,
) -> Result<Option<i32>> {
    let question = format!(
        "New Apple ID '{}'. Run {} --auth-only now?",
        username,
        downloader.program()
    );
    if !p.confirm(&question, true)? {
        return Ok(None);
    }

    p.say(&format!(
        "\nRunning auth-only for user: {}. Complete 2FA when prompted...",
        username
    ));
    let code = runner.run(&downloader.auth_command(username))?;
    debug!(code, "auth-only finished");

    match store.save(username) {
        Ok(true) => p.say(&format!(
            "Added '{}' to the list of known Apple IDs.",
            username
        )),
        Ok(false) => {}
        Err(e) => p.warn(&format!(
            "Warning: Could not save Apple ID to {}: {:#}",
            store.path().display(),
            e
        )),
    }
    Ok(Some(code))
}

/// Ask for the destination folder; blank picks `default`.
pub fn prompt_destination(p: &mut dyn Prompter, default: &Path) -> Result<PathBuf> {
    let answer = p.input(&format!(
        "Enter destination directory (Default: {})",
        default.display()
    ))?;
    let chosen = if answer.is_empty() {
        default.to_path_buf()
    } else {
        expand_tilde(&answer, &home_dir())
    };
    absolutize(&chosen)
}

pub fn prompt_dry_run(p: &mut dyn Prompter, program: &str) -> Result<bool> {
    let dry_run = p.confirm(&format!("Perform a dry run ({} --dry-run)?", program), true)?;
    p.say(&format!(
        "Running in {} mode.",
        if dry_run { "DRY RUN" } else { "LIVE DOWNLOAD" }
    ));
    Ok(dry_run)
}

/// Ask for an inclusive year range. The start year is required, the end
/// year defaults to it, and reversed input is swapped with a warning.
pub fn prompt_year_range(p: &mut dyn Prompter, current_year: i32) -> Result<YearRange> {
    let max = max_year(current_year);

    let start = loop {
        let answer = p.input("Enter START year (e.g., 2018)")?;
        match parse_year(&answer, current_year) {
            Ok(year) => break year,
            Err(YearError::Empty) => p.warn("Start year cannot be empty."),
            Err(YearError::OutOfRange { .. }) => p.warn(&format!(
                "Start year must be between {} and {}.",
                MIN_YEAR, max
            )),
            Err(e) => p.warn(&e.to_string()),
        }
    };

    let end = loop {
        let answer = p.input(&format!("Enter END year (Default: {})", start))?;
        if answer.trim().is_empty() {
            break start;
        }
        match parse_year(&answer, current_year) {
            Ok(year) => break year,
            Err(YearError::OutOfRange { .. }) => p.warn(&format!(
                "End year must be between {} and {}.",
                MIN_YEAR, max
            )),
            Err(e) => p.warn(&e.to_string()),
        }
    };

    let (range, swapped) = YearRange::ordered(start, end);
    if swapped {
        p.warn("Warning: Start year was after end year. Swapping range.");
    }
    Ok(range)
}

/// Flags from the command line that shape the main run.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    pub skip_videos: bool,
}

/// What the main flow did, for callers and tests.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub username: String,
    pub dest: PathBuf,
    pub dry_run: bool,
    pub range: YearRange,
    pub command: DownloaderCommand,
    pub exit_code: i32,
    pub log_path: PathBuf,
}

/// The full interactive run: pick an identity, choose where and what to
/// download, run the downloader once and record the run.
pub fn main_flow(
    settings: &Settings,
    options: RunOptions,
    current_year: i32,
    p: &mut dyn Prompter,
    runner: &mut dyn ProcessRunner,
) -> Result<RunSummary> {
    let store = IdentityStore::new(&settings.identity_file);
    let downloader = Downloader::from_settings(settings);

    let known = store.load()?;
    let username = prompt_identity(p, &known)?;
    if !known.contains(&username) {
        offer_auth(p, runner, &downloader, &store, &username)?;
    }

    let dest = prompt_destination(p, &settings.default_dest)?;
    p.say(&format!("\nUsing Apple ID: {}", username));
    p.say(&format!("Using Cookie Dir: {}", downloader.cookie_dir().display()));
    p.say(&format!("Using Destination: {}\n", dest.display()));

    let dry_run = prompt_dry_run(p, downloader.program())?;

    fs::create_dir_all(&dest)
        .with_context(|| format!("Failed to create destination {}", dest.display()))?;

    p.say("\n--- Download Range Selection ---");
    let range = prompt_year_range(p, current_year)?;

    let mut extra = Vec::new();
    if options.skip_videos {
        extra.push(SKIP_VIDEOS_FLAG.to_string());
    }
    if dry_run {
        extra.push(DRY_RUN_FLAG.to_string());
    }
    let command = downloader.sync_command(&username, &dest, range, &extra);

    let started = history::now();
    if dry_run {
        p.say(&format!(
            "\nStarting DRY RUN for years {}. {} will list files but not download them.",
            range,
            downloader.program()
        ));
    } else {
        p.say(&format!(
            "\nStarting LIVE DOWNLOAD for years {}. This may take a long time...",
            range
        ));
    }
    p.say(&format!("Command: {}", command));

    let exit_code = runner.run(&command)?;
    if exit_code != 0 {
        p.say(&format!(
            "\n{} exited with code {}. Please check the output above for errors.",
            downloader.program(),
            exit_code
        ));
    } else {
        p.say(&format!(
            "\nProcess completed successfully ({} returned 0).",
            downloader.program()
        ));
    }
    info!(exit_code, range = %range, dry_run, "download finished");

    let record = RunRecord::new(started, range, &command, dry_run);
    let log_path = history::append(&dest, &record)?;
    p.say(&format!("Wrote run log to {}", log_path.display()));
    p.say("Done.");

    Ok(RunSummary {
        username,
        dest,
        dry_run,
        range,
        command,
        exit_code,
        log_path,
    })
}

/// `--auth-only`: ask for one identity, run the login handshake, stop.
/// Returns `None` when no identity was given.
pub fn auth_only_flow(
    settings: &Settings,
    p: &mut dyn Prompter,
    runner: &mut dyn ProcessRunner,
) -> Result<Option<i32>> {
    let downloader = Downloader::from_settings(settings);

    let username = p.input("Enter Apple ID for --auth-only authentication")?;
    if username.is_empty() {
        p.say("Apple ID cannot be empty. Exiting.");
        return Ok(None);
    }

    p.say(&format!(
        "Running auth-only for user: {}. Complete 2FA when prompted.",
        username
    ));
    let code = runner.run(&downloader.auth_command(&username))?;
    info!(code, "auth-only finished");
    Ok(Some(code))
}
