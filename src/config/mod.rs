#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::domain::model::Platform;
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "retreat-notify")]
#[command(about = "Send push notifications to retreat members' devices through FCM")]
pub struct CliConfig {
    #[arg(long, short, default_value = "retreat-notify.toml")]
    pub config: PathBuf,

    /// Device token to notify; repeat for several devices
    #[arg(long = "token")]
    pub tokens: Vec<String>,

    /// Platform of the devices given with --token
    #[arg(long, default_value = "android")]
    pub platform: Platform,

    /// JSON file with a list of {"token", "platform"} objects
    #[arg(long)]
    pub devices: Option<PathBuf>,

    #[arg(long)]
    pub title: String,

    #[arg(long)]
    pub body: String,

    /// Extra data entry as key=value; repeatable
    #[arg(long = "data", value_parser = cli::parse_key_value)]
    pub data: Vec<(String, String)>,

    #[arg(long)]
    pub category: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit JSON log lines, overriding [logging]")]
    pub json_logs: bool,
}
