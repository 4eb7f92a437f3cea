use std::path::PathBuf;

use clap::Parser;

/// Export a running site to static files by crawling it from a set of routes.
#[derive(Parser, Debug, Default)]
#[command(name = "site-export", version, about)]
pub struct Cli {
    /// Host the site is served on.
    #[arg(long)]
    pub hostname: Option<String>,

    /// Port the site is served on.
    #[arg(long, short)]
    pub port: Option<u16>,

    /// Seed route; repeat for several. Defaults to `/`.
    #[arg(long = "route", short = 'r', value_name = "ROUTE")]
    pub routes: Vec<String>,

    /// File with one seed route per line, read when the crawl starts.
    #[arg(long, value_name = "FILE", conflicts_with = "routes")]
    pub routes_file: Option<PathBuf>,

    /// Directory the exported files are written to.
    #[arg(long, short, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Maximum number of routes rendered at the same time.
    #[arg(long, short = 'j')]
    pub concurrency: Option<usize>,

    /// Fail a route whose render takes longer than this many seconds.
    #[arg(long, value_name = "SECS")]
    pub item_timeout: Option<u64>,

    /// Per-request HTTP timeout in seconds.
    #[arg(long, value_name = "SECS")]
    pub request_timeout: Option<u64>,

    /// Render a route again every time a link to it is found.
    #[arg(long)]
    pub allow_recrawl: bool,

    /// RON file providing defaults for any of the options above.
    #[arg(long, short, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Also write the log to this file.
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Log debug output.
    #[arg(long, short)]
    pub verbose: bool,

    /// Print the summary as JSON.
    #[arg(long)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_routes_are_collected() {
        let cli = Cli::parse_from(["site-export", "-r", "/", "--route", "/feed.xml", "-j", "4"]);
        assert_eq!(cli.routes, vec!["/", "/feed.xml"]);
        assert_eq!(cli.concurrency, Some(4));
        assert!(!cli.allow_recrawl);
    }

    #[test]
    fn routes_and_routes_file_conflict() {
        let result =
            Cli::try_parse_from(["site-export", "-r", "/", "--routes-file", "routes.txt"]);
        assert!(result.is_err());
    }

    #[test]
    fn command_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
