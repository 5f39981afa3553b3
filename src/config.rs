//! Server configuration read from the environment.

use thiserror::Error;

const DEFAULT_DATABASE_URL: &str = "app.db";
const DEFAULT_ADDRESS: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DOMAIN: &str = "localhost";
const DEFAULT_UPLOAD_PRESET: &str = "naxos_menu";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} environment variable not set")]
    Missing(&'static str),
    #[error("invalid value `{value}` for {key}")]
    Invalid { key: &'static str, value: String },
}

/// Credentials for the image CDN.
#[derive(Debug, Clone, PartialEq)]
pub struct CdnConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    /// Unsigned upload preset configured on the CDN account.
    pub upload_preset: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub database_url: String,
    pub address: String,
    pub port: u16,
    /// Cookie signing key material; a random key is generated when absent.
    pub secret_key: Option<String>,
    pub domain: String,
    /// Raw comma-separated admin email allow-list.
    pub admin_emails: String,
    pub auth_url: String,
    pub auth_anon_key: String,
    pub cdn: Option<CdnConfig>,
}

impl ServerConfig {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup. Blank values
    /// count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let port = match get("PORT") {
            Some(raw) => raw.parse::<u16>().map_err(|_| ConfigError::Invalid {
                key: "PORT",
                value: raw,
            })?,
            None => DEFAULT_PORT,
        };

        let auth_url = get("AUTH_URL").ok_or(ConfigError::Missing("AUTH_URL"))?;
        let auth_anon_key = get("AUTH_ANON_KEY").ok_or(ConfigError::Missing("AUTH_ANON_KEY"))?;

        let admin_emails = get("ADMIN_EMAILS")
            .or_else(|| get("NEXT_PUBLIC_ADMIN_EMAILS"))
            .unwrap_or_default();

        let cdn = match (
            get("CDN_CLOUD_NAME"),
            get("CDN_API_KEY"),
            get("CDN_API_SECRET"),
        ) {
            (Some(cloud_name), Some(api_key), Some(api_secret)) => Some(CdnConfig {
                cloud_name,
                api_key,
                api_secret,
                upload_preset: get("CDN_UPLOAD_PRESET")
                    .unwrap_or_else(|| DEFAULT_UPLOAD_PRESET.to_string()),
            }),
            _ => None,
        };

        Ok(Self {
            database_url: get("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            address: get("ADDRESS").unwrap_or_else(|| DEFAULT_ADDRESS.to_string()),
            port,
            secret_key: get("SECRET_KEY"),
            domain: get("DOMAIN").unwrap_or_else(|| DEFAULT_DOMAIN.to_string()),
            admin_emails,
            auth_url,
            auth_anon_key,
            cdn,
        })
    }
}
