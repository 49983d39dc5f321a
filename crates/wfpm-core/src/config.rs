//! Project configuration (`.wfpm`) and runtime settings

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use wfpm_fs::{ConfigFormat, ConfigStore};

use crate::{Error, Result};

/// Contents of the `.wfpm` file at a project root.
///
/// ```yaml
/// project_name: demo-wfpkgs
/// repo_type: git
/// repo_server: github.com
/// repo_account: icgc-argo
/// license: MIT
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub project_name: String,
    pub repo_type: String,
    pub repo_server: String,
    pub repo_account: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
}

impl ProjectConfig {
    /// Load `.wfpm` from `path`. The repository account is lowercased.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config: Self = ConfigStore::new()
            .load_as(path, ConfigFormat::Yaml)
            .map_err(|e| match e {
                wfpm_fs::Error::ConfigParse { message, .. } => Error::InvalidProjectConfig {
                    path: path.to_path_buf(),
                    reason: message,
                },
                other => Error::Fs(other),
            })?;

        for (field, value) in [
            ("project_name", &config.project_name),
            ("repo_type", &config.repo_type),
            ("repo_server", &config.repo_server),
            ("repo_account", &config.repo_account),
        ] {
            if value.trim().is_empty() {
                return Err(Error::InvalidProjectConfig {
                    path: path.to_path_buf(),
                    reason: format!("field '{field}' must not be empty"),
                });
            }
        }

        config.repo_account = config.repo_account.to_lowercase();
        Ok(config)
    }

    /// `repo_server/repo_account/project_name`
    pub fn fullname(&self) -> String {
        format!(
            "{}/{}/{}",
            self.repo_server, self.repo_account, self.project_name
        )
    }
}

pub const DEFAULT_MAIN_BRANCH: &str = "main";
pub const DEFAULT_MODULE_DIR: &str = "wfpr_modules";
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(60);

/// Runtime settings for one invocation.
///
/// Defaults can be overridden through `WFPM_MAIN_BRANCH`, `WFPM_MODULE_DIR`
/// and `WFPM_HTTP_TIMEOUT_SECS`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub main_branch: String,
    pub module_dir: String,
    pub http_timeout: Duration,
    pub user_agent: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            main_branch: DEFAULT_MAIN_BRANCH.to_string(),
            module_dir: DEFAULT_MODULE_DIR.to_string(),
            http_timeout: DEFAULT_HTTP_TIMEOUT,
            user_agent: format!("wfpm/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl Settings {
    /// Defaults overlaid with the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overlaid with values from `lookup`. Empty or unparsable
    /// values are ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut settings = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(branch) = non_empty("WFPM_MAIN_BRANCH") {
            settings.main_branch = branch;
        }
        if let Some(dir) = non_empty("WFPM_MODULE_DIR") {
            settings.module_dir = dir;
        }
        if let Some(secs) = non_empty("WFPM_HTTP_TIMEOUT_SECS") {
            match secs.trim().parse::<u64>() {
                Ok(secs) => settings.http_timeout = Duration::from_secs(secs),
                Err(_) => tracing::warn!(value = %secs, "Ignoring invalid WFPM_HTTP_TIMEOUT_SECS"),
            }
        }

        settings
    }
}
