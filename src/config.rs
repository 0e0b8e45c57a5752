use serde::{Deserialize, Serialize};
use url::Url;

use crate::auth::AuthMethod;
use crate::conditions::{BuildOutcome, WarningCountCondition};
use crate::error::{Error, Result};

/// Gate configuration for one job, loaded from YAML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base address of the hub, e.g. "https://hub.example.com:7340".
    pub hub_address: String,
    /// Project looked up in the hub index when the build log carries no
    /// analysis marker.
    pub project_name: String,
    #[serde(default = "default_auth")]
    pub auth: AuthMethod,
    /// Hub-defined visibility filter code applied to the active-warnings
    /// fetch. Opaque to the gate; the hub assigns the meaning.
    #[serde(default = "default_visibility_filter")]
    pub visibility_filter: String,
    pub conditions: Vec<WarningCountCondition>,
}

fn default_auth() -> AuthMethod {
    AuthMethod::Anonymous
}

fn default_visibility_filter() -> String {
    // Hub code for active warnings.
    "2".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Config {
            hub_address: "https://hub.example.com:7340".to_string(),
            project_name: "my-project".to_string(),
            auth: AuthMethod::Anonymous,
            visibility_filter: default_visibility_filter(),
            conditions: vec![
                WarningCountCondition {
                    significance: "red".to_string(),
                    warning_count_threshold: 0,
                    warranted_result: BuildOutcome::Unstable,
                },
                WarningCountCondition {
                    significance: "yellow".to_string(),
                    warning_count_threshold: 20,
                    warranted_result: BuildOutcome::Unstable,
                },
            ],
        }
    }
}

impl Config {
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    pub fn to_file(&self, path: &str) -> anyhow::Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// The hub address as a parsed URL. A relative or malformed address is a
    /// configuration error, reported before any network traffic.
    pub fn hub_url(&self) -> Result<Url> {
        Url::parse(&self.hub_address)
            .map_err(|e| Error::Config(format!("bad hub address '{}': {e}", self.hub_address)))
    }

    pub fn validate(&self) -> Result<()> {
        self.hub_url()?;
        if self.project_name.is_empty() {
            return Err(Error::Config("project_name must not be empty".to_string()));
        }
        if self.visibility_filter.is_empty() {
            return Err(Error::Config(
                "visibility_filter must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
