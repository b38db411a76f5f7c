use crate::utils::error::{AcceleratorError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(AcceleratorError::InvalidConfigValue {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(AcceleratorError::InvalidConfigValue {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(AcceleratorError::InvalidConfigValue {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_port(field_name: &str, value: &str) -> Result<u16> {
    match value.trim().parse::<u16>() {
        Ok(0) | Err(_) => Err(AcceleratorError::InvalidConfigValue {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Port must be a number between 1 and 65535".to_string(),
        }),
        Ok(port) => Ok(port),
    }
}

pub fn validate_required_field<T>(field_name: &str, value: Option<T>) -> Result<T> {
    value.ok_or_else(|| AcceleratorError::ConfigurationMissing {
        field: field_name.to_string(),
    })
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(AcceleratorError::InvalidConfigValue {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("HOSTNAMEAPI", "https://dummyjson.com/").is_ok());
        assert!(validate_url("HOSTNAMEAPI", "http://localhost:3000").is_ok());
        assert!(validate_url("HOSTNAMEAPI", "").is_err());
        assert!(validate_url("HOSTNAMEAPI", "dummyjson.com").is_err());
        assert!(validate_url("HOSTNAMEAPI", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_port() {
        assert_eq!(validate_port("DEV_DB_PORT", "5432").unwrap(), 5432);
        assert_eq!(validate_port("DEV_DB_PORT", " 3306 ").unwrap(), 3306);
        assert!(validate_port("DEV_DB_PORT", "0").is_err());
        assert!(validate_port("DEV_DB_PORT", "70000").is_err());
        assert!(validate_port("DEV_DB_PORT", "postgres").is_err());
    }

    #[test]
    fn test_validate_required_field() {
        assert_eq!(validate_required_field("ENVIRONMENT", Some("dev")).unwrap(), "dev");
        let missing = validate_required_field::<String>("ENVIRONMENT", None).unwrap_err();
        assert!(matches!(
            missing,
            AcceleratorError::ConfigurationMissing { ref field } if field == "ENVIRONMENT"
        ));
    }

    #[test]
    fn test_validate_non_empty_string() {
        assert!(validate_non_empty_string("TESTUSERNAME", "emilys").is_ok());
        assert!(validate_non_empty_string("TESTUSERNAME", "   ").is_err());
    }
}
