//! Per-environment connection settings

use secrecy::SecretString;
use serde::Deserialize;

use crate::error::{Error, Result};

fn default_true() -> bool {
    true
}

fn default_service() -> String {
    "es".to_string()
}

/// A named connection profile.
#[derive(Debug, Deserialize)]
pub struct Environment {
    /// Filled from the map key at load time
    #[serde(skip)]
    pub name: String,
    pub host: String,
    pub port: u16,
    #[serde(default = "default_true")]
    pub use_ssl: bool,
    #[serde(default = "default_true")]
    pub verify_certs: bool,
    #[serde(default)]
    pub aws_auth: Option<AwsAuth>,
    #[serde(default)]
    pub basic_auth: Option<BasicAuth>,
    #[serde(default)]
    pub proxy: Option<ProxyConfig>,
    /// Per-request timeout in seconds
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

/// AWS SigV4 signing settings. Credentials come from the default provider chain.
#[derive(Debug, Deserialize)]
pub struct AwsAuth {
    pub region: String,
    #[serde(default = "default_service")]
    pub service: String,
}

/// HTTP basic authentication.
#[derive(Debug, Deserialize)]
pub struct BasicAuth {
    pub username: String,
    pub password: SecretString,
}

/// SOCKS5 proxy used for every request to the cluster.
#[derive(Debug, Deserialize)]
pub struct ProxyConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<SecretString>,
}

impl Environment {
    /// `scheme://host:port` of the cluster.
    pub fn base_url(&self) -> String {
        let scheme = if self.use_ssl { "https" } else { "http" };
        format!("{}://{}:{}", scheme, self.host, self.port)
    }

    pub(crate) fn validate(&self) -> Result<()> {
        let invalid = |message: &str| {
            Error::config(format!("environment '{}': {}", self.name, message))
        };

        if self.host.trim().is_empty() {
            return Err(invalid("host must not be empty"));
        }
        if self.port == 0 {
            return Err(invalid("port must be between 1 and 65535"));
        }
        if self.aws_auth.is_some() && self.basic_auth.is_some() {
            return Err(invalid("aws_auth and basic_auth are mutually exclusive"));
        }
        if let Some(aws) = &self.aws_auth
            && (aws.region.trim().is_empty() || aws.service.trim().is_empty())
        {
            return Err(invalid("aws_auth requires a region and service"));
        }
        if let Some(proxy) = &self.proxy {
            if proxy.host.trim().is_empty() || proxy.port == 0 {
                return Err(invalid("proxy requires a host and port"));
            }
            if proxy.username.is_some() != proxy.password.is_some() {
                return Err(invalid("proxy username and password must be set together"));
            }
        }
        Ok(())
    }
}
