use crate::config::CliConfig;
use crate::domain::model::{DeviceTarget, PushMessage};
use crate::utils::error::{NotifyError, Result};
use crate::utils::validation::{validate_non_empty_string, Validate};

/// Parses a `key=value` pair from the command line.
pub fn parse_key_value(raw: &str) -> std::result::Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got `{}`", raw))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty key in `{}`", raw));
    }
    Ok((key.to_string(), value.to_string()))
}

impl CliConfig {
    /// Devices from `--devices` followed by the ones given with `--token`.
    pub fn targets(&self) -> Result<Vec<DeviceTarget>> {
        let mut targets = match &self.devices {
            Some(path) => {
                let content = std::fs::read_to_string(path)?;
                serde_json::from_str::<Vec<DeviceTarget>>(&content)?
            }
            None => Vec::new(),
        };

        targets.extend(
            self.tokens
                .iter()
                .map(|token| DeviceTarget::new(token.clone(), self.platform)),
        );
        Ok(targets)
    }

    pub fn message(&self) -> PushMessage {
        let mut message = PushMessage::new(self.title.clone(), self.body.clone());
        for (key, value) in &self.data {
            message = message.with_data(key.clone(), value.clone());
        }
        if let Some(category) = &self.category {
            message = message.with_category(category.clone());
        }
        message
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("title", &self.title)?;
        validate_non_empty_string("body", &self.body)?;

        if self.tokens.is_empty() && self.devices.is_none() {
            return Err(NotifyError::MissingConfigError {
                field: "--token or --devices".to_string(),
            });
        }
        if let Some(token) = self.tokens.iter().find(|t| t.trim().is_empty()) {
            return Err(NotifyError::InvalidConfigValueError {
                field: "token".to_string(),
                value: token.clone(),
                reason: "Device token cannot be empty".to_string(),
            });
        }
        Ok(())
    }
}
