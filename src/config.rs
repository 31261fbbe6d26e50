//! Server configuration from environment variables.
//!
//! HOST, PORT: bind address (default 0.0.0.0:8080 so the app is reachable via DNS on a VPS).
//! SESSION_KEY: at least 64 bytes for signing session cookies; random per process when unset.
//! SECURE_COOKIES: "true" to mark session cookies Secure (behind HTTPS).
//! DATA_FILE: JSON snapshot loaded at startup and rewritten after every change.
//! EMAIL_FUNCTION_URL: email relay endpoint for invitations; unset means they are only logged.
//! SUPER_ADMIN_EMAIL: account that becomes super admin (else the first account registered).
//! PUBLIC_URL: base for links in emails.

use std::path::PathBuf;

pub const MIN_SESSION_KEY_LEN: usize = 64;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("PORT must be a number between 1 and 65535, got {0:?}")]
    InvalidPort(String),
    #[error("SESSION_KEY must be at least {MIN_SESSION_KEY_LEN} bytes, got {0}")]
    SessionKeyTooShort(usize),
}

#[derive(Clone, Debug)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub session_key: Option<Vec<u8>>,
    pub secure_cookies: bool,
    pub data_file: Option<PathBuf>,
    pub email_function_url: Option<String>,
    pub super_admin_email: Option<String>,
    pub public_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            session_key: None,
            secure_cookies: false,
            data_file: None,
            email_function_url: None,
            super_admin_email: None,
            public_url: default_public_url(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_public_url() -> String {
    "http://localhost:8080".to_string()
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let port = match get("PORT") {
            Some(raw) => match raw.parse::<u16>() {
                Ok(p) if p > 0 => p,
                _ => return Err(ConfigError::InvalidPort(raw)),
            },
            None => default_port(),
        };
        let session_key = match get("SESSION_KEY") {
            Some(key) if key.len() < MIN_SESSION_KEY_LEN => {
                return Err(ConfigError::SessionKeyTooShort(key.len()))
            }
            Some(key) => Some(key.into_bytes()),
            None => None,
        };

        Ok(Self {
            host: get("HOST").unwrap_or_else(default_host),
            port,
            session_key,
            secure_cookies: get("SECURE_COOKIES")
                .is_some_and(|v| v.eq_ignore_ascii_case("true") || v == "1"),
            data_file: get("DATA_FILE").map(PathBuf::from),
            email_function_url: get("EMAIL_FUNCTION_URL"),
            super_admin_email: get("SUPER_ADMIN_EMAIL"),
            public_url: get("PUBLIC_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or_else(default_public_url),
        })
    }

    pub fn bind(&self) -> (&str, u16) {
        (self.host.as_str(), self.port)
    }
}
