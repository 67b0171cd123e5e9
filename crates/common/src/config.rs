use std::env;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
        }
    }

    pub fn from_env() -> Self {
        Self::parse(&env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()))
    }

    /// Anything other than `production`/`prod` selects development.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "production" | "prod" => Environment::Production,
            _ => Environment::Development,
        }
    }
}

/// Read a string variable, falling back to `default` when unset.
pub fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Read and parse a variable, falling back to `default` when unset or unparsable.
pub fn env_parse_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_environment_parse() {
        assert_eq!(Environment::parse("production"), Environment::Production);
        assert_eq!(Environment::parse("PROD"), Environment::Production);
        assert_eq!(Environment::parse(" Production "), Environment::Production);
        assert_eq!(Environment::parse("development"), Environment::Development);
        assert_eq!(
            Environment::parse("staging"),
            Environment::Development,
            "Unknown environments should default to development"
        );
    }

    #[test]
    fn test_environment_as_str() {
        assert_eq!(Environment::Development.as_str(), "development");
        assert_eq!(Environment::Production.as_str(), "production");
    }

    #[test]
    #[serial]
    fn test_environment_from_env() {
        unsafe { env::set_var("ENVIRONMENT", "prod") };
        assert_eq!(Environment::from_env(), Environment::Production);

        unsafe { env::remove_var("ENVIRONMENT") };
        assert_eq!(Environment::from_env(), Environment::Development);
    }

    #[test]
    #[serial]
    fn test_env_parse_or_fallbacks() {
        unsafe { env::set_var("COMMON_TEST_PORT", "9090") };
        assert_eq!(env_parse_or("COMMON_TEST_PORT", 80u16), 9090);

        unsafe { env::set_var("COMMON_TEST_PORT", "not-a-port") };
        assert_eq!(
            env_parse_or("COMMON_TEST_PORT", 80u16),
            80,
            "Unparsable values should fall back to the default"
        );

        unsafe { env::remove_var("COMMON_TEST_PORT") };
        assert_eq!(env_parse_or("COMMON_TEST_PORT", 80u16), 80);
        assert_eq!(env_or("COMMON_TEST_PORT", "fallback"), "fallback");
    }
}
