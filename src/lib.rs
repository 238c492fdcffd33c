// Library root
// -----------
// This crate exposes the pieces behind the `icloud-year-selector` binary,
// which asks for an Apple ID, a destination and a year range, then runs
// `icloudpd` once restricted to those years.
//
// Module responsibilities:
// - `cli`: command-line flags.
// - `config`: default paths and program name, with env overrides.
// - `identities`: the flat file of previously used Apple IDs.
// - `years`: year parsing and the inclusive range type.
// - `paths`: destination path expansion.
// - `downloader`: building `icloudpd` argument lists and running them.
// - `history`: the CSV run log under the destination.
// - `ui`: the interactive prompts and the run flows that tie it together.
pub mod cli;
pub mod config;
pub mod downloader;
pub mod history;
pub mod identities;
pub mod paths;
pub mod ui;
pub mod years;
