use crate::error::{Result, SkillError};
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// ServerConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    /// How often the background pass promotes locked skills whose
    /// dependencies are mastered.
    #[serde(default = "default_reconcile_interval")]
    pub reconcile_interval_ms: u64,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_port() -> u16 {
    3141
}

fn default_reconcile_interval() -> u64 {
    1000
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            reconcile_interval_ms: default_reconcile_interval(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    /// `y` of the first node of level 1 in a fresh container.
    #[serde(default = "default_start_y")]
    pub start_y: i64,
    /// Lane every generated node is placed in.
    #[serde(default)]
    pub lane_x: i64,
    /// Upper bound on parent-skill hops when resolving who owns a sub-tree.
    #[serde(default = "default_max_subtree_depth")]
    pub max_subtree_depth: u32,
    #[serde(default)]
    pub server: ServerConfig,
}

fn default_version() -> u32 {
    1
}

fn default_start_y() -> i64 {
    100
}

fn default_max_subtree_depth() -> u32 {
    32
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            start_y: default_start_y(),
            lane_x: 0,
            max_subtree_depth: default_max_subtree_depth(),
            server: ServerConfig::default(),
        }
    }
}

impl Config {
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Err(SkillError::NotInitialized);
        }
        let data = std::fs::read_to_string(&path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.max_subtree_depth == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "max_subtree_depth is 0: nested skill trees can never be resolved"
                    .to_string(),
            });
        }

        if self.server.reconcile_interval_ms < 100 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!(
                    "server.reconcile_interval_ms={} (<100 keeps the database busy)",
                    self.server.reconcile_interval_ms
                ),
            });
        }

        if self.server.request_timeout_secs == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "server.request_timeout_secs is 0: every request would time out"
                    .to_string(),
            });
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
