use crate::core::dispatcher::RetryPolicy;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{NotifyError, Result};
use crate::utils::validation::Validate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_FCM_ENDPOINT: &str = "https://fcm.googleapis.com";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub fcm: FcmConfig,
    pub dispatch: Option<DispatchConfig>,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FcmConfig {
    pub project_id: String,
    pub endpoint: Option<String>,
    pub access_token: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DispatchConfig {
    pub concurrent_requests: Option<usize>,
    pub max_attempts: Option<u32>,
    pub base_delay_ms: Option<u64>,
    pub max_delay_ms: Option<u64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: Option<String>,
    pub format: Option<LogFormat>,
}

impl LoggingConfig {
    pub fn level(&self) -> &str {
        self.level.as_deref().unwrap_or("retreat_notify=info")
    }

    pub fn format(&self) -> LogFormat {
        self.format.unwrap_or_default()
    }
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(NotifyError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| NotifyError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${FCM_ACCESS_TOKEN})
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| NotifyError::ConfigError {
            message: format!("env substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        use crate::utils::validation::*;

        validate_project_id("fcm.project_id", &self.fcm.project_id)?;
        validate_url("fcm.endpoint", self.fcm_endpoint())?;

        let token = validate_required_field("fcm.access_token", &self.fcm.access_token)?;
        if token.contains("${") {
            return Err(NotifyError::InvalidConfigValueError {
                field: "fcm.access_token".to_string(),
                value: token.clone(),
                reason: "Environment variable is not set".to_string(),
            });
        }
        validate_non_empty_string("fcm.access_token", token)?;

        if let Some(timeout) = self.fcm.timeout_seconds {
            validate_range("fcm.timeout_seconds", timeout, 1, 300)?;
        }

        let dispatch = self.dispatch.clone().unwrap_or_default();
        if let Some(concurrent) = dispatch.concurrent_requests {
            validate_positive_number("dispatch.concurrent_requests", concurrent, 1)?;
            validate_range("dispatch.concurrent_requests", concurrent, 1, 500)?;
        }
        if let Some(attempts) = dispatch.max_attempts {
            validate_range("dispatch.max_attempts", attempts, 1, 10)?;
        }

        let retry = self.retry_policy();
        if retry.base_delay > retry.max_delay {
            return Err(NotifyError::InvalidConfigValueError {
                field: "dispatch.base_delay_ms".to_string(),
                value: retry.base_delay.as_millis().to_string(),
                reason: "Base delay cannot exceed dispatch.max_delay_ms".to_string(),
            });
        }

        Ok(())
    }

    pub fn fcm_endpoint(&self) -> &str {
        self.fcm.endpoint.as_deref().unwrap_or(DEFAULT_FCM_ENDPOINT)
    }

    pub fn concurrent_requests(&self) -> usize {
        self.dispatch
            .as_ref()
            .and_then(|d| d.concurrent_requests)
            .unwrap_or(5)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        let defaults = RetryPolicy::default();
        let Some(dispatch) = &self.dispatch else {
            return defaults;
        };

        RetryPolicy {
            max_attempts: dispatch.max_attempts.unwrap_or(defaults.max_attempts),
            base_delay: dispatch
                .base_delay_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.base_delay),
            max_delay: dispatch
                .max_delay_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.max_delay),
        }
    }

    pub fn logging(&self) -> LoggingConfig {
        self.logging.clone().unwrap_or_default()
    }
}

impl ConfigProvider for TomlConfig {
    fn fcm_endpoint(&self) -> &str {
        self.fcm_endpoint()
    }

    fn project_id(&self) -> &str {
        &self.fcm.project_id
    }

    fn access_token(&self) -> Option<&str> {
        self.fcm.access_token.as_deref()
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.fcm.timeout_seconds.unwrap_or(10))
    }

    fn concurrent_requests(&self) -> usize {
        self.concurrent_requests()
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_minimal_config_uses_defaults() {
        let toml_content = r#"
[fcm]
project_id = "retreat-app"
access_token = "ya29.test"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.fcm_endpoint(), DEFAULT_FCM_ENDPOINT);
        assert_eq!(config.concurrent_requests(), 5);
        assert_eq!(config.retry_policy(), RetryPolicy::default());
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert_eq!(config.logging().format(), LogFormat::Compact);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[fcm]
project_id = "retreat-app"
endpoint = "http://127.0.0.1:9099/"
access_token = "ya29.test"
timeout_seconds = 3

[dispatch]
concurrent_requests = 16
max_attempts = 4
base_delay_ms = 50
max_delay_ms = 400

[logging]
level = "retreat_notify=debug"
format = "json"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.concurrent_requests(), 16);
        assert_eq!(
            config.retry_policy(),
            RetryPolicy {
                max_attempts: 4,
                base_delay: Duration::from_millis(50),
                max_delay: Duration::from_millis(400),
            }
        );
        assert_eq!(config.logging().format(), LogFormat::Json);
        assert_eq!(config.logging().level(), "retreat_notify=debug");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("RETREAT_NOTIFY_TEST_TOKEN", "ya29.from-env");

        let toml_content = r#"
[fcm]
project_id = "retreat-app"
access_token = "${RETREAT_NOTIFY_TEST_TOKEN}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.fcm.access_token.as_deref(), Some("ya29.from-env"));

        std::env::remove_var("RETREAT_NOTIFY_TEST_TOKEN");
    }

    #[test]
    fn test_unset_env_var_fails_validation() {
        let toml_content = r#"
[fcm]
project_id = "retreat-app"
access_token = "${RETREAT_NOTIFY_UNSET_VARIABLE}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation() {
        let missing_token = TomlConfig::from_toml_str("[fcm]\nproject_id = \"retreat-app\"\n").unwrap();
        assert!(matches!(
            missing_token.validate(),
            Err(NotifyError::MissingConfigError { .. })
        ));

        let bad_endpoint = TomlConfig::from_toml_str(
            "[fcm]\nproject_id = \"retreat-app\"\naccess_token = \"t\"\nendpoint = \"invalid-url\"\n",
        )
        .unwrap();
        assert!(bad_endpoint.validate().is_err());

        let bad_delays = TomlConfig::from_toml_str(
            "[fcm]\nproject_id = \"retreat-app\"\naccess_token = \"t\"\n\n[dispatch]\nbase_delay_ms = 900\nmax_delay_ms = 100\n",
        )
        .unwrap();
        assert!(bad_delays.validate().is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[fcm]\nproject_id = \"file-test\"\naccess_token = \"t\"\n")
            .unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.fcm.project_id, "file-test");
    }
}
