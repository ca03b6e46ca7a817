pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use config::toml_config::TomlConfig;
pub use crate::core::{
    dispatcher::{NotificationDispatcher, RetryPolicy},
    fcm::FcmTransport,
    message::build_message,
};
pub use domain::model::{DeviceTarget, DispatchSummary, Platform, PushMessage};
pub use domain::policy::{ANDROID_POLICY, APNS_POLICY};
pub use utils::error::{NotifyError, Result};
