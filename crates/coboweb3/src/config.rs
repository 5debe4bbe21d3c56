use serde::{Deserialize, Serialize};

pub const DEV_BASE_URL: &str = "https://api.dev.cobo.com/v2";
pub const SANDBOX_BASE_URL: &str = "https://api.sandbox.cobo.com/v2";
pub const PROD_BASE_URL: &str = "https://api.cobo.com/v2";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Dev,
    Sandbox,
    Prod,
}

impl Environment {
    pub const fn base_url(self) -> &'static str {
        match self {
            Self::Dev => DEV_BASE_URL,
            Self::Sandbox => SANDBOX_BASE_URL,
            Self::Prod => PROD_BASE_URL,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dev => "dev",
            Self::Sandbox => "sandbox",
            Self::Prod => "prod",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "dev" | "development" => Some(Self::Dev),
            "sandbox" => Some(Self::Sandbox),
            "prod" | "production" => Some(Self::Prod),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Whole-request timeout for platform calls (seconds).
    pub timeout_seconds: u64,
    /// TCP/TLS connect timeout (seconds).
    pub connect_timeout_seconds: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            connect_timeout_seconds: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PortalConfig {
    pub environment: Environment,
    /// Overrides the environment's base URL (e.g. a loopback proxy in tests).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    pub http: HttpConfig,
}

impl PortalConfig {
    pub fn effective_base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| self.environment.base_url())
    }
}
