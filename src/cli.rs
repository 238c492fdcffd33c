// Command-line flags. The tool is interactive, so the surface is small: two
// switches that change what gets run, plus verbosity for diagnostics on
// stderr.

use clap::Parser;

/// Download a range of years from iCloud Photos via icloudpd
#[derive(Parser, Debug, Clone, Default)]
#[command(
    name = "icloud-year-selector",
    version,
    about = "CLI tool to download a specific year range from iCloud Photos via icloudpd"
)]
pub struct Cli {
    /// Add --skip-videos to the icloudpd command
    #[arg(long)]
    pub skip_videos: bool,

    /// Run icloudpd --auth-only and exit
    #[arg(long)]
    pub auth_only: bool,

    /// Enable debug logging on stderr
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Level applied to this crate's log target.
    pub fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else {
            "warn"
        }
    }
}
