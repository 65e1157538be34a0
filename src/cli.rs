use clap::{Parser, ValueEnum};
use log::LevelFilter;

use std::path::PathBuf;

#[derive(Debug, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(Parser)]
#[command(name = "refractor")]
#[command(about = "Traces a fan of rays through a scene of unusual optical surfaces")]
pub struct Args {
    /// Settings file (JSON); built-in defaults are used without one
    pub settings: Option<PathBuf>,

    /// Set the logging level
    #[arg(long, default_value = "info")]
    pub log_level: LogLevel,

    /// Number of rays in the fan
    #[arg(short, long, default_value = "9")]
    pub rays: usize,

    /// Log the full trajectory of the ray in the middle of the fan
    #[arg(long)]
    pub report: bool,
}
