//! [`Args`] definitions.

use clap::Parser;

use crate::config;

/// Server of the user directory system.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Path to the configuration file.
    #[arg(
        short,
        long,
        env = "CONF_FILE",
        default_value = "config.toml"
    )]
    pub config: String,

    /// Log level overriding the configured one.
    #[arg(long)]
    pub log: Option<config::LogLevel>,
}

impl Args {
    /// Parses command line arguments.
    ///
    /// # Errors
    ///
    /// Errors if failed to parse command line arguments.
    pub fn parse() -> Result<Self, clap::Error> {
        <Self as Parser>::try_parse()
    }
}
