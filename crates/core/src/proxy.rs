//! Proxy Configuration Types
//!
//! Proxy settings shared by the OpenAI and Supabase clients. The HTTP client
//! factory that consumes them lives in `prospectiq-llm`.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Environment variable holding the proxy password
pub const PROXY_PASSWORD_ENV: &str = "PROSPECTIQ_PROXY_PASSWORD";

/// Proxy protocol type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProxyProtocol {
    Http,
    Https,
    Socks5,
}

impl ProxyProtocol {
    /// Return the URL scheme string for this protocol.
    pub fn scheme(&self) -> &'static str {
        match self {
            ProxyProtocol::Http => "http",
            ProxyProtocol::Https => "https",
            ProxyProtocol::Socks5 => "socks5",
        }
    }
}

/// Proxy configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProxyConfig {
    pub protocol: ProxyProtocol,
    pub host: String,
    pub port: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Read from the environment, never written to the config file.
    #[serde(skip_serializing, default)]
    pub password: Option<String>,
}

impl ProxyConfig {
    /// Build the proxy URL string (without auth).
    pub fn url(&self) -> String {
        format!("{}://{}:{}", self.protocol.scheme(), self.host, self.port)
    }

    /// Fill in the password from `PROSPECTIQ_PROXY_PASSWORD` when a username is set
    pub fn with_env_password(mut self) -> Self {
        if self.username.is_some() && self.password.is_none() {
            self.password = std::env::var(PROXY_PASSWORD_ENV).ok();
        }
        self
    }

    pub fn validate(&self) -> CoreResult<()> {
        if self.host.trim().is_empty() {
            return Err(CoreError::config("proxy host cannot be empty"));
        }
        if self.port == 0 {
            return Err(CoreError::config("proxy port cannot be 0"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn proxy(host: &str, port: u16) -> ProxyConfig {
        ProxyConfig {
            protocol: ProxyProtocol::Http,
            host: host.to_string(),
            port,
            username: None,
            password: None,
        }
    }

    #[test]
    fn test_proxy_url() {
        assert_eq!(proxy("127.0.0.1", 8080).url(), "http://127.0.0.1:8080");
    }

    #[test]
    fn test_validate() {
        assert!(proxy("127.0.0.1", 8080).validate().is_ok());
        assert!(proxy(" ", 8080).validate().is_err());
        assert!(proxy("127.0.0.1", 0).validate().is_err());
    }

    #[test]
    fn test_password_never_serialized() {
        let mut cfg = proxy("proxy.test", 1080);
        cfg.protocol = ProxyProtocol::Socks5;
        cfg.username = Some("admin".to_string());
        cfg.password = Some("secret".to_string());

        let json = serde_json::to_string(&cfg).unwrap();
        assert!(!json.contains("secret"));
        assert!(json.contains("\"protocol\":\"socks5\""));
    }
}
