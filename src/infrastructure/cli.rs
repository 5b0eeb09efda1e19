use clap::Parser;

use crate::utils::version;

/// Boot the storefront against an in-memory page and drive its router
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(author, version = version(), about)]
pub struct Cli {
    /// Paths to navigate to, in order, after the start path resolved
    #[arg(value_name = "PATH")]
    pub paths: Vec<String>,

    /// Sign in a demo user with this name before the page starts
    #[arg(short, long, value_name = "NAME")]
    pub login: Option<String>,

    /// Go back this many history entries after navigating
    #[arg(short, long, value_name = "N", default_value_t = 0)]
    pub back: usize,

    /// Override the configured start path
    #[arg(short, long, value_name = "PATH")]
    pub start: Option<String>,

    /// Include the document markup in the report
    #[arg(long)]
    pub html: bool,
}
