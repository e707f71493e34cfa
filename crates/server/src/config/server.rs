use std::path::PathBuf;
use std::str::FromStr;

use serde::Deserialize;

/// Where the relay runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentMode {
    /// Long-running process. Both providers are available.
    #[default]
    Server,
    /// Stateless function invocation. Only the HTTP-API provider is used.
    Function,
}

impl DeploymentMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Server => "server",
            Self::Function => "function",
        }
    }
}

impl FromStr for DeploymentMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "server" => Ok(Self::Server),
            "function" => Ok(Self::Function),
            other => Err(format!(
                "unknown deployment mode `{other}` (expected `server` or `function`)"
            )),
        }
    }
}

/// HTTP server bind configuration.
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    /// Address to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Deployment mode.
    #[serde(default)]
    pub mode: DeploymentMode,
    /// Directory of static assets served for paths outside `/api`.
    ///
    /// Nothing is served when unset.
    pub static_dir: Option<PathBuf>,
    /// File under `static_dir` answered for `/`.
    #[serde(default = "default_index_file")]
    pub index_file: String,
    /// Maximum accepted request body in bytes.
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            mode: DeploymentMode::default(),
            static_dir: None,
            index_file: default_index_file(),
            body_limit_bytes: default_body_limit(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_owned()
}

fn default_port() -> u16 {
    3000
}

fn default_index_file() -> String {
    "web.html".to_owned()
}

fn default_body_limit() -> usize {
    64 * 1024
}
