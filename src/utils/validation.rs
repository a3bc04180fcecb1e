use crate::utils::error::{RelayError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(RelayError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(RelayError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(RelayError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

/// endpoint 可以是 http(s) URL 或 `owner/name` 形式的 Space id
pub fn validate_endpoint_id(field_name: &str, endpoint: &str) -> Result<()> {
    validate_non_empty_string(field_name, endpoint)?;

    if endpoint.contains("://") {
        return validate_url(field_name, endpoint);
    }

    let valid_part = |part: &str| {
        !part.is_empty()
            && part
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
    };

    match endpoint.split_once('/') {
        Some((owner, name)) if valid_part(owner) && valid_part(name) => Ok(()),
        _ => Err(RelayError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: endpoint.to_string(),
            reason: "Expected an http(s) URL or a Space id of the form owner/name".to_string(),
        }),
    }
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(RelayError::InvalidConfigValueError {
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
        return Err(RelayError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("endpoint", "https://example.com").is_ok());
        assert!(validate_url("endpoint", "http://example.com").is_ok());
        assert!(validate_url("endpoint", "").is_err());
        assert!(validate_url("endpoint", "invalid-url").is_err());
        assert!(validate_url("endpoint", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_endpoint_id() {
        assert!(validate_endpoint_id("endpoint", "Fa0713/AetherCare").is_ok());
        assert!(validate_endpoint_id("endpoint", "some_org/vitals.v2").is_ok());
        assert!(validate_endpoint_id("endpoint", "http://127.0.0.1:7860").is_ok());
        assert!(validate_endpoint_id("endpoint", "AetherCare").is_err());
        assert!(validate_endpoint_id("endpoint", "a/b/c").is_err());
        assert!(validate_endpoint_id("endpoint", "owner/").is_err());
        assert!(validate_endpoint_id("endpoint", "ftp://example.com").is_err());
        assert!(validate_endpoint_id("endpoint", "  ").is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("timeout_seconds", 30u64, 1, 3600).is_ok());
        assert!(validate_range("timeout_seconds", 0u64, 1, 3600).is_err());
        assert!(validate_range("timeout_seconds", 7200u64, 1, 3600).is_err());
    }
}
