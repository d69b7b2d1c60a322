//! System paths and directory management for the control plane CLI.
//!
//! Follows the XDG Base Directory specification on Linux and the
//! corresponding platform conventions on macOS and Windows.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

const APP_QUALIFIER: &str = "rs";
const APP_ORGANIZATION: &str = "labiium";
const APP_NAME: &str = "ctlplane";

/// System paths for the control plane.
#[derive(Debug, Clone)]
pub struct CtlplanePaths {
    /// Root data directory (audit logs, persisted object store).
    pub data_dir: PathBuf,

    /// Configuration directory.
    pub config_dir: PathBuf,

    /// Cache directory.
    pub cache_dir: PathBuf,

    /// Logs directory.
    pub logs_dir: PathBuf,

    /// Default audit log file path.
    pub audit_log_path: PathBuf,
}

impl CtlplanePaths {
    /// Paths using platform-specific system defaults.
    pub fn new() -> Result<Self> {
        let project_dirs = ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME)
            .context("failed to determine system directories")?;

        let data_dir = project_dirs.data_dir().to_path_buf();
        let config_dir = project_dirs.config_dir().to_path_buf();
        let cache_dir = project_dirs.cache_dir().to_path_buf();
        let logs_dir = data_dir.join("logs");
        let audit_log_path = data_dir.join("audit.tlog");

        Ok(Self { data_dir, config_dir, cache_dir, logs_dir, audit_log_path })
    }

    /// Paths rooted under a custom directory. Useful for tests and
    /// single-tree installations.
    pub fn with_root<P: AsRef<Path>>(root: P) -> Self {
        let root = root.as_ref().to_path_buf();
        Self {
            data_dir: root.clone(),
            config_dir: root.join("config"),
            cache_dir: root.join("cache"),
            logs_dir: root.join("logs"),
            audit_log_path: root.join("audit.tlog"),
        }
    }

    /// Create every directory this layout needs. Safe to call repeatedly.
    pub fn ensure_directories(&self) -> Result<()> {
        for dir in [&self.data_dir, &self.config_dir, &self.cache_dir, &self.logs_dir] {
            if !dir.exists() {
                std::fs::create_dir_all(dir)
                    .with_context(|| format!("failed to create directory: {}", dir.display()))?;
            }
        }
        Ok(())
    }

    pub fn default_config_file(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    pub fn display(&self) -> String {
        format!(
            "ctlplane paths:
  Data directory:    {}
  Config directory:  {}
  Cache directory:   {}
  Logs directory:    {}
  Audit log:         {}",
            self.data_dir.display(),
            self.config_dir.display(),
            self.cache_dir.display(),
            self.logs_dir.display(),
            self.audit_log_path.display()
        )
    }
}

impl Default for CtlplanePaths {
    fn default() -> Self {
        Self::new().expect("failed to determine system directories")
    }
}

/// Path overrides layered on top of the system defaults.
#[derive(Debug, Clone, Default, serde::Deserialize, serde::Serialize)]
pub struct PathsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logs_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audit_log_path: Option<PathBuf>,
}

impl PathsConfig {
    pub fn apply_to(&self, mut paths: CtlplanePaths) -> CtlplanePaths {
        if let Some(ref v) = self.data_dir {
            paths.data_dir = v.clone();
        }
        if let Some(ref v) = self.config_dir {
            paths.config_dir = v.clone();
        }
        if let Some(ref v) = self.cache_dir {
            paths.cache_dir = v.clone();
        }
        if let Some(ref v) = self.logs_dir {
            paths.logs_dir = v.clone();
        }
        if let Some(ref v) = self.audit_log_path {
            paths.audit_log_path = v.clone();
        }
        paths
    }
}

/// Path overrides from environment variables, taking precedence over config
/// file values.
///
/// - `CTLPLANE_DATA_DIR`
/// - `CTLPLANE_CONFIG_DIR`
/// - `CTLPLANE_CACHE_DIR`
/// - `CTLPLANE_LOGS_DIR`
/// - `CTLPLANE_AUDIT_LOG`
pub fn paths_from_env() -> PathsConfig {
    PathsConfig {
        data_dir: std::env::var("CTLPLANE_DATA_DIR").ok().map(PathBuf::from),
        config_dir: std::env::var("CTLPLANE_CONFIG_DIR").ok().map(PathBuf::from),
        cache_dir: std::env::var("CTLPLANE_CACHE_DIR").ok().map(PathBuf::from),
        logs_dir: std::env::var("CTLPLANE_LOGS_DIR").ok().map(PathBuf::from),
        audit_log_path: std::env::var("CTLPLANE_AUDIT_LOG").ok().map(PathBuf::from),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn system_paths_are_non_empty() {
        let paths = CtlplanePaths::new().expect("should resolve system paths");
        assert!(!paths.data_dir.as_os_str().is_empty());
        assert!(!paths.config_dir.as_os_str().is_empty());
        assert!(!paths.cache_dir.as_os_str().is_empty());
    }

    #[test]
    fn custom_root_nests_every_subdirectory() {
        let temp_dir = TempDir::new().unwrap();
        let paths = CtlplanePaths::with_root(temp_dir.path());
        assert_eq!(paths.data_dir, temp_dir.path());
        assert_eq!(paths.config_dir, temp_dir.path().join("config"));
        assert_eq!(paths.audit_log_path, temp_dir.path().join("audit.tlog"));
    }

    #[test]
    fn ensure_directories_creates_missing_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let paths = CtlplanePaths::with_root(temp_dir.path());
        paths.ensure_directories().expect("should create directories");
        assert!(paths.data_dir.exists());
        assert!(paths.config_dir.exists());
        assert!(paths.cache_dir.exists());
        assert!(paths.logs_dir.exists());
    }

    #[test]
    fn overrides_apply_on_top_of_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let custom_audit = temp_dir.path().join("custom-audit.tlog");
        let config = PathsConfig { audit_log_path: Some(custom_audit.clone()), ..Default::default() };
        let paths = config.apply_to(CtlplanePaths::new().unwrap());
        assert_eq!(paths.audit_log_path, custom_audit);
    }

    #[test]
    fn display_includes_every_directory() {
        let temp_dir = TempDir::new().unwrap();
        let paths = CtlplanePaths::with_root(temp_dir.path());
        let display = paths.display();
        assert!(display.contains("Data directory"));
        assert!(display.contains("Audit log"));
    }
}
