//! Command-line argument parsing for the linechat client
//!
//! Uses clap for argument parsing with derive macros.

use clap::Parser;
use std::path::PathBuf;

/// linechat - terminal client for line-oriented TCP chat servers
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Server address to dial
    ///
    /// Either `host:port` or the name of an entry in the config file's
    /// `[servers]` table. Defaults to the configured address, then
    /// localhost:9090.
    #[arg(short, long, env = "LINECHAT_ADDR")]
    pub addr: Option<String>,

    /// Config file path
    ///
    /// Overrides the default `$XDG_CONFIG_HOME/linechat/config.toml`.
    /// The file must exist.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Log filter directive, e.g. `debug` or `linechat_client=trace`
    ///
    /// Overrides LINECHAT_LOG. Logs go to the linechat state directory.
    #[arg(long)]
    pub log_level: Option<String>,

    /// Screen redraw period in milliseconds
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub render_interval_ms: Option<u64>,
}

impl Args {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
