/// Linking service configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkingConfig {
    /// Interface to bind (default "0.0.0.0"). Env var: `LINKING_HOST`.
    pub host: String,
    /// TCP port to listen on (default 3001). Env var: `PORT`.
    pub port: u16,
}

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3001;

impl LinkingConfig {
    pub fn from_env() -> Self {
        Self::from_vars(
            std::env::var("LINKING_HOST").ok(),
            std::env::var("PORT").ok(),
        )
    }

    /// Build from raw variable values; blanks and unparseable ports fall back
    /// to the defaults.
    pub fn from_vars(host: Option<String>, port: Option<String>) -> Self {
        Self {
            host: host
                .filter(|h| !h.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_HOST.to_owned()),
            port: port
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(DEFAULT_PORT),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
