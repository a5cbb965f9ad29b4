//! CLI argument definitions using clap derive macros.

use clap::Parser;

/// Print the locations people share with a Google account.
///
/// Signs in with the given credentials and writes one line per shared
/// location: `timestamp , id , lat , long , name , photoURL`.
#[derive(Parser, Debug)]
#[command(name = "locshare")]
#[command(author, version, about)]
pub struct Args {
    /// Account e-mail address
    pub email: String,

    /// Account password
    pub password: String,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Abort the whole run after this many seconds (1-3600, default 60)
    #[arg(short = 't', long, value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub timeout: Option<u64>,

    /// Log out of the account after reading locations
    #[arg(long)]
    pub logout: bool,

    /// Print records as JSON lines
    #[arg(long)]
    pub json: bool,

    /// Override the accounts base URL
    #[arg(long, hide = true)]
    pub accounts_url: Option<String>,

    /// Override the maps base URL
    #[arg(long, hide = true)]
    pub maps_url: Option<String>,
}

impl Args {
    /// Whether the parse error is a help/version display rather than a failure.
    #[must_use]
    pub fn is_informational(error: &clap::Error) -> bool {
        matches!(
            error.kind(),
            clap::error::ErrorKind::DisplayHelp
                | clap::error::ErrorKind::DisplayVersion
                | clap::error::ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
        )
    }
}
