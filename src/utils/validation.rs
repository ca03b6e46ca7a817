use crate::utils::error::{NotifyError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(NotifyError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(NotifyError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(NotifyError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(NotifyError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| NotifyError::MissingConfigError {
        field: field_name.to_string(),
    })
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(NotifyError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(NotifyError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

/// FCM project ids are lowercase letters, digits and hyphens.
pub fn validate_project_id(field_name: &str, project_id: &str) -> Result<()> {
    validate_non_empty_string(field_name, project_id)?;

    if !project_id
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(NotifyError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: project_id.to_string(),
            reason: "Project id can only contain lowercase letters, numbers and hyphens"
                .to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("fcm.endpoint", "https://fcm.googleapis.com").is_ok());
        assert!(validate_url("fcm.endpoint", "http://127.0.0.1:8080").is_ok());
        assert!(validate_url("fcm.endpoint", "").is_err());
        assert!(validate_url("fcm.endpoint", "invalid-url").is_err());
        assert!(validate_url("fcm.endpoint", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("dispatch.concurrent_requests", 5, 1).is_ok());
        assert!(validate_positive_number("dispatch.concurrent_requests", 0, 1).is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("dispatch.max_attempts", 3, 1, 10).is_ok());
        assert!(validate_range("dispatch.max_attempts", 11, 1, 10).is_err());
    }

    #[test]
    fn test_validate_project_id() {
        assert!(validate_project_id("fcm.project_id", "retreat-app-4f1c2").is_ok());
        assert!(validate_project_id("fcm.project_id", "   ").is_err());
        assert!(validate_project_id("fcm.project_id", "Retreat_App").is_err());
    }

    #[test]
    fn test_validate_required_field() {
        let token = Some("ya29.token".to_string());
        assert_eq!(validate_required_field("fcm.access_token", &token).unwrap(), "ya29.token");

        let missing: Option<String> = None;
        assert!(matches!(
            validate_required_field("fcm.access_token", &missing),
            Err(NotifyError::MissingConfigError { .. })
        ));
    }
}
