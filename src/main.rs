// Entrypoint for the CLI application.
// - Keeps `main` small: parse flags, set up logging and Ctrl-C handling,
//   then hand off to one of the two flows in `ui`.
// - A failed download is reported by the flow and still exits 0; only
//   errors raised by this program exit non-zero.

use chrono::{Datelike, Local};
use crossterm::style::{style, Stylize};
use icloud_year_selector::cli::Cli;
use icloud_year_selector::config::Settings;
use icloud_year_selector::downloader::SystemRunner;
use icloud_year_selector::ui::{auth_only_flow, main_flow, RunOptions, TerminalPrompter};
use std::io;
use std::process;
use tracing::level_filters::LevelFilter;
use tracing::{debug, info};
use tracing_subscriber::{fmt, EnvFilter};

const INTERRUPTED_MESSAGE: &str = "\nExiting due to user interruption.";

fn main() {
    let cli = Cli::parse_args();
    init_logging(&cli);

    // The child shares our process group, so it sees the same Ctrl-C and
    // stops on its own; all we do is leave quietly.
    if let Err(e) = ctrlc::set_handler(|| {
        println!("{}", INTERRUPTED_MESSAGE);
        process::exit(0);
    }) {
        debug!(error = %e, "could not install Ctrl-C handler");
    }

    if let Err(e) = run(&cli) {
        if is_interrupted(&e) {
            println!("{}", INTERRUPTED_MESSAGE);
            process::exit(0);
        }
        eprintln!("{}", style(format!("Error: {:#}", e)).red());
        process::exit(1);
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let settings = Settings::from_env();
    info!(?settings, "icloud-year-selector v{} starting", env!("CARGO_PKG_VERSION"));

    let mut prompter = TerminalPrompter;
    let mut runner = SystemRunner;

    if cli.auth_only {
        auth_only_flow(&settings, &mut prompter, &mut runner)?;
        return Ok(());
    }

    let options = RunOptions {
        skip_videos: cli.skip_videos,
    };
    main_flow(
        &settings,
        options,
        Local::now().year(),
        &mut prompter,
        &mut runner,
    )?;
    Ok(())
}

/// Prompts surface Ctrl-C as an `Interrupted` I/O error on some terminals.
fn is_interrupted(e: &anyhow::Error) -> bool {
    e.chain()
        .filter_map(|cause| cause.downcast_ref::<io::Error>())
        .any(|io_err| io_err.kind() == io::ErrorKind::Interrupted)
}

fn init_logging(cli: &Cli) {
    let directive = format!("icloud_year_selector={}", cli.log_level());
    let filter = EnvFilter::from_default_env().add_directive(
        directive
            .parse()
            .unwrap_or_else(|_| LevelFilter::WARN.into()),
    );

    fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}
