//! Configuration management for the OTRS MCP server.
//!
//! This module handles loading configuration from environment variables,
//! with validation for required values and literal defaults for the rest.
//! The configuration is loaded once at startup and passed by value into
//! the client; nothing reads the environment after that.

use std::env;
use std::fmt;

use url::Url;

use crate::error::OtrsError;

/// Default queue for new tickets.
pub const DEFAULT_QUEUE: &str = "Raw";
/// Default state for new tickets.
pub const DEFAULT_STATE: &str = "new";
/// Default priority for new tickets.
pub const DEFAULT_PRIORITY: &str = "3 normal";
/// Default ticket type.
pub const DEFAULT_TYPE: &str = "Unclassified";
/// Customer user forced onto every created ticket unless disabled.
pub const DEFAULT_CUSTOMER_USER_OVERRIDE: &str = "Internal";

/// Path segment that separates the OTRS web root from the webservice path.
const GENERIC_INTERFACE_SEGMENT: &str = "/nph-genericinterface.pl";

/// Configuration for connecting to an OTRS generic interface webservice.
///
/// The password is stored but never logged; the `Debug` impl redacts it.
#[derive(Clone)]
pub struct Config {
    /// Webservice base URL, e.g.
    /// `https://otrs.example.com/otrs/nph-genericinterface.pl/Webservice/TestInterface`.
    pub base_url: String,

    /// Agent web UI root used for ticket links, e.g. `https://otrs.example.com/otrs`.
    pub web_base_url: String,

    /// Agent login sent as `UserLogin` with every request.
    pub username: String,

    /// Agent password sent as `Password` with every request.
    /// This value must never be logged or included in error messages.
    password: String,

    /// Whether TLS certificates are verified.
    pub verify_ssl: bool,

    /// Queue used when `create_ticket` gets none.
    pub default_queue: String,

    /// State used when `create_ticket` gets none.
    pub default_state: String,

    /// First priority candidate when `create_ticket` gets none.
    pub default_priority: String,

    /// Type used when `create_ticket` gets none.
    pub default_type: String,

    /// Value forced into `CustomerUser` on ticket creation.
    /// `None` means the caller's value is honoured.
    pub customer_user_override: Option<String>,
}

impl Config {
    /// Loads configuration from the process environment.
    ///
    /// # Required Environment Variables
    ///
    /// - `OTRS_BASE_URL`: webservice base URL
    /// - `OTRS_USERNAME`: agent login
    /// - `OTRS_PASSWORD`: agent password
    ///
    /// # Errors
    ///
    /// Returns `OtrsError::Config` if any required variable is missing
    /// or if values fail validation.
    pub fn from_env() -> Result<Self, OtrsError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Loads configuration through an arbitrary variable lookup.
    ///
    /// ```ignore
    /// let vars: HashMap<&str, &str> = ...;
    /// let config = Config::from_lookup(|k| vars.get(k).map(|v| v.to_string()))?;
    /// ```
    pub fn from_lookup<F>(lookup: F) -> Result<Self, OtrsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = Self::get_required(&lookup, "OTRS_BASE_URL")?;
        let username = Self::get_required(&lookup, "OTRS_USERNAME")?;
        let password = Self::get_required(&lookup, "OTRS_PASSWORD")?;

        let base_url = Self::validate_base_url(base_url, "OTRS_BASE_URL")?;
        Self::validate_password(&password)?;

        let web_base_url = match Self::get_optional(&lookup, "OTRS_WEB_BASE_URL") {
            Some(url) => Self::validate_base_url(url, "OTRS_WEB_BASE_URL")?,
            None => Self::derive_web_base_url(&base_url)?,
        };

        let verify_ssl = Self::get_optional(&lookup, "OTRS_VERIFY_SSL")
            .map(|v| Self::parse_bool(&v))
            .unwrap_or(false);

        // Present-but-empty disables the override, absent keeps the default.
        let customer_user_override = match lookup("OTRS_CUSTOMER_USER_OVERRIDE") {
            Some(v) if v.trim().is_empty() => None,
            Some(v) => Some(v.trim().to_string()),
            None => Some(DEFAULT_CUSTOMER_USER_OVERRIDE.to_string()),
        };

        Ok(Config {
            base_url,
            web_base_url,
            username,
            password,
            verify_ssl,
            default_queue: Self::get_or(&lookup, "OTRS_DEFAULT_QUEUE", DEFAULT_QUEUE),
            default_state: Self::get_or(&lookup, "OTRS_DEFAULT_STATE", DEFAULT_STATE),
            default_priority: Self::get_or(&lookup, "OTRS_DEFAULT_PRIORITY", DEFAULT_PRIORITY),
            default_type: Self::get_or(&lookup, "OTRS_DEFAULT_TYPE", DEFAULT_TYPE),
            customer_user_override,
        })
    }

    /// Builds a configuration with all optional values at their defaults.
    pub fn new(
        base_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self, OtrsError> {
        let base_url = Self::validate_base_url(base_url.into(), "OTRS_BASE_URL")?;
        let web_base_url = Self::derive_web_base_url(&base_url)?;
        Ok(Config {
            base_url,
            web_base_url,
            username: username.into(),
            password: password.into(),
            verify_ssl: false,
            default_queue: DEFAULT_QUEUE.to_string(),
            default_state: DEFAULT_STATE.to_string(),
            default_priority: DEFAULT_PRIORITY.to_string(),
            default_type: DEFAULT_TYPE.to_string(),
            customer_user_override: Some(DEFAULT_CUSTOMER_USER_OVERRIDE.to_string()),
        })
    }

    /// Returns the agent password.
    ///
    /// Only the HTTP client and error sanitization should call this.
    pub fn password(&self) -> &str {
        &self.password
    }

    /// Gets a required variable, returning an error if missing or empty.
    fn get_required<F>(lookup: &F, name: &str) -> Result<String, OtrsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::get_optional(lookup, name).ok_or_else(|| OtrsError::missing_env(name))
    }

    fn get_optional<F>(lookup: &F, name: &str) -> Option<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        lookup(name)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn get_or<F>(lookup: &F, name: &str, default: &str) -> String
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::get_optional(lookup, name).unwrap_or_else(|| default.to_string())
    }

    fn parse_bool(value: &str) -> bool {
        matches!(value.to_ascii_lowercase().as_str(), "true" | "1" | "yes")
    }

    /// Validates and normalizes a base URL.
    fn validate_base_url(url: String, var: &str) -> Result<String, OtrsError> {
        let url = url.trim().trim_end_matches('/').to_string();

        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(OtrsError::invalid_config(format!(
                "{} must start with http:// or https://",
                var
            )));
        }

        Ok(url)
    }

    /// Derives the agent web UI root from the webservice URL.
    ///
    /// `https://h/otrs/nph-genericinterface.pl/Webservice/X` becomes
    /// `https://h/otrs`; anything else falls back to `{scheme}://{host}/otrs`.
    fn derive_web_base_url(base_url: &str) -> Result<String, OtrsError> {
        if let Some(pos) = base_url.find(GENERIC_INTERFACE_SEGMENT) {
            return Ok(base_url[..pos].to_string());
        }

        let parsed = Url::parse(base_url)
            .map_err(|e| OtrsError::invalid_config(format!("invalid OTRS_BASE_URL: {}", e)))?;
        let host = parsed
            .host_str()
            .ok_or_else(|| OtrsError::invalid_config("OTRS_BASE_URL has no host"))?;

        Ok(match parsed.port() {
            Some(port) => format!("{}://{}:{}/otrs", parsed.scheme(), host, port),
            None => format!("{}://{}/otrs", parsed.scheme(), host),
        })
    }

    /// Rejects the placeholder passwords shipped in setup instructions.
    fn validate_password(password: &str) -> Result<(), OtrsError> {
        let lower = password.to_lowercase();
        let placeholder_patterns = ["your-password", "your_password", "placeholder", "changeme"];

        for pattern in placeholder_patterns {
            if lower.contains(pattern) {
                return Err(OtrsError::invalid_config(
                    "OTRS_PASSWORD appears to be a placeholder value",
                ));
            }
        }

        Ok(())
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("base_url", &self.base_url)
            .field("web_base_url", &self.web_base_url)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("verify_ssl", &self.verify_ssl)
            .field("default_queue", &self.default_queue)
            .field("default_state", &self.default_state)
            .field("default_priority", &self.default_priority)
            .field("default_type", &self.default_type)
            .field("customer_user_override", &self.customer_user_override)
            .finish()
    }
}
