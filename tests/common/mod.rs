// Shared test doubles: a prompter fed from a script of answers and a runner
// that records commands instead of spawning them.
#![allow(dead_code)]

use anyhow::{anyhow, Result};
use icloud_year_selector::config::{Settings, DEFAULT_DOWNLOADER, IDENTITY_FILE_NAME};
use icloud_year_selector::downloader::{DownloaderCommand, ProcessRunner};
use icloud_year_selector::ui::Prompter;
use std::collections::VecDeque;
use std::path::Path;

/// Settings with every path inside `root`.
pub fn settings_rooted_at(root: &Path) -> Settings {
    Settings {
        downloader: DEFAULT_DOWNLOADER.into(),
        cookie_dir: root.join(".pyicloud"),
        default_dest: root.join("iCloudPD_Test"),
        identity_file: root.join(IDENTITY_FILE_NAME),
    }
}

/// Argument lookups used by the flow assertions.
pub trait CommandExt {
    fn has_pair(&self, flag: &str, value: &str) -> bool;
    fn has_flag(&self, flag: &str) -> bool;
}

impl CommandExt for DownloaderCommand {
    fn has_pair(&self, flag: &str, value: &str) -> bool {
        self.args.windows(2).any(|w| w[0] == flag && w[1] == value)
    }

    fn has_flag(&self, flag: &str) -> bool {
        self.args.iter().any(|a| a == flag)
    }
}

#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<String>,
    pub prompts: Vec<String>,
    pub said: Vec<String>,
    pub warnings: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new(answers: &[&str]) -> Self {
        ScriptedPrompter {
            answers: answers.iter().map(|a| a.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn remaining(&self) -> usize {
        self.answers.len()
    }

    pub fn asked(&self, needle: &str) -> bool {
        self.prompts.iter().any(|p| p.contains(needle))
    }

    pub fn warned(&self, needle: &str) -> bool {
        self.warnings.iter().any(|w| w.contains(needle))
    }

    pub fn output_contains(&self, needle: &str) -> bool {
        self.said.iter().any(|s| s.contains(needle))
    }

    fn next(&mut self, prompt: &str) -> Result<String> {
        self.prompts.push(prompt.to_string());
        self.answers
            .pop_front()
            .ok_or_else(|| anyhow!("script ran out of answers at prompt: {}", prompt))
    }
}

impl Prompter for ScriptedPrompter {
    fn input(&mut self, prompt: &str) -> Result<String> {
        Ok(self.next(prompt)?.trim().to_string())
    }

    fn confirm(&mut self, prompt: &str, default: bool) -> Result<bool> {
        let answer = self.next(prompt)?.trim().to_lowercase();
        Ok(match answer.as_str() {
            "" => default,
            "y" | "yes" => true,
            _ => false,
        })
    }

    fn say(&mut self, message: &str) {
        self.said.push(message.to_string());
    }

    fn warn(&mut self, message: &str) {
        self.warnings.push(message.to_string());
    }
}

/// Records every command and answers with the queued exit codes (0 once
/// the queue is empty).
#[derive(Debug, Default)]
pub struct RecordingRunner {
    pub commands: Vec<DownloaderCommand>,
    codes: VecDeque<i32>,
}

impl RecordingRunner {
    pub fn with_codes(codes: &[i32]) -> Self {
        RecordingRunner {
            commands: Vec::new(),
            codes: codes.iter().copied().collect(),
        }
    }
}

impl ProcessRunner for RecordingRunner {
    fn run(&mut self, command: &DownloaderCommand) -> Result<i32> {
        self.commands.push(command.clone());
        Ok(self.codes.pop_front().unwrap_or(0))
    }
}
