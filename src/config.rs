use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// The compiled-in sample challenges.
    Builtin,
    /// A directory of `*.json` challenge files.
    Directory(PathBuf),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub source: Source,
    pub port: u16,
    pub ledger: Option<PathBuf>,
    pub assets: Option<PathBuf>,
    pub render_delay: Duration,
    pub feedback_timeout: Duration,
    pub session_idle: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            source: Source::Builtin,
            port: 8000,
            ledger: None,
            assets: None,
            render_delay: Duration::from_millis(100),
            feedback_timeout: Duration::from_secs(5),
            session_idle: Duration::from_secs(3600),
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "geoctf")]
#[command(about = "GIS security capture-the-flag training site")]
#[command(version)]
pub struct Args {
    /// Port to listen on
    #[arg(short, long, env = "GEOCTF_PORT", default_value_t = 8000)]
    pub port: u16,

    /// Directory of challenge JSON files (defaults to the built-in set)
    #[arg(short, long, env = "GEOCTF_CATALOG", value_name = "DIR")]
    pub catalog: Option<PathBuf>,

    /// CSV file recording every flag submission
    #[arg(short, long, env = "GEOCTF_LEDGER", value_name = "FILE")]
    pub ledger: Option<PathBuf>,

    /// Directory served under /assets
    #[arg(long, value_name = "DIR")]
    pub assets: Option<PathBuf>,

    /// Delay before a challenge map is drawn
    #[arg(long, value_name = "MS", default_value_t = 100)]
    pub render_delay_ms: u64,

    /// How long flag feedback stays visible
    #[arg(long, value_name = "SECS", default_value_t = 5)]
    pub feedback_timeout_secs: u64,

    /// Idle time before a visitor's session is dropped
    #[arg(long, value_name = "SECS", default_value_t = 3600)]
    pub session_idle_secs: u64,

    /// Validate the catalog, print its summary and exit
    #[arg(long)]
    pub check: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl From<&Args> for Config {
    fn from(args: &Args) -> Self {
        Config {
            source: match &args.catalog {
                Some(dir) => Source::Directory(dir.clone()),
                None => Source::Builtin,
            },
            port: args.port,
            ledger: args.ledger.clone(),
            assets: args.assets.clone(),
            render_delay: Duration::from_millis(args.render_delay_ms),
            feedback_timeout: Duration::from_secs(args.feedback_timeout_secs),
            session_idle: Duration::from_secs(args.session_idle_secs),
        }
    }
}
