//! Configuration loading.
//!
//! Settings are merged from three sources, highest precedence first:
//! explicit builder values (CLI flags), environment variables, and an
//! optional `config.yaml` in the data directory. Built-in defaults fill
//! whatever remains. The data directory itself can only come from flag,
//! environment, or default, since the file lives inside it.

use std::env;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::PortLayout;

/// File name of the optional configuration file in the data directory.
pub const CONFIG_FILE: &str = "config.yaml";

/// Directory name of the default data directory under `$HOME`.
const DATA_DIR_NAME: &str = ".skiff";

/// File name of the allocation store inside the data directory.
const STORE_FILE: &str = "ports";

/// File name of the lock file inside the data directory.
const LOCK_FILE: &str = ".lock";

const ENV_DATA_DIR: &str = "SKIFF_DATA_DIR";
const ENV_RUNTIME: &str = "SKIFF_RUNTIME";
const ENV_IMAGE: &str = "SKIFF_IMAGE";

const DEFAULT_RUNTIME: &str = "lxc";
const DEFAULT_IMAGE: &str = "ubuntu:22.04";

/// Shape of the on-disk configuration file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigDocument {
    runtime: Option<String>,
    image: Option<String>,
    ports: Option<PortsSection>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct PortsSection {
    ssh_start: Option<u16>,
    stride: Option<u16>,
    service_start: Option<u16>,
    service_count: Option<u16>,
}

/// Resolved configuration.
#[derive(Debug, Clone)]
pub struct Config {
    data_dir: PathBuf,
    runtime: String,
    image: String,
    layout: PortLayout,
}

impl Config {
    /// The per-user data directory (created on first use, not here).
    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Binary name of the container runtime CLI.
    #[must_use]
    pub fn runtime_binary(&self) -> &str {
        &self.runtime
    }

    /// Default image for `create`.
    #[must_use]
    pub fn image(&self) -> &str {
        &self.image
    }

    /// The resolved port layout.
    #[must_use]
    pub fn layout(&self) -> &PortLayout {
        &self.layout
    }

    /// Path of the allocation store file.
    #[must_use]
    pub fn store_path(&self) -> PathBuf {
        self.data_dir.join(STORE_FILE)
    }

    /// Path of the lock file.
    #[must_use]
    pub fn lock_path(&self) -> PathBuf {
        self.data_dir.join(LOCK_FILE)
    }
}

/// Builder merging configuration sources.
///
/// # Examples
///
/// ```no_run
/// use skiff::ConfigBuilder;
///
/// let config = ConfigBuilder::new().build().unwrap();
/// println!("store at {}", config.store_path().display());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    data_dir: Option<PathBuf>,
    runtime: Option<String>,
    image: Option<String>,
}

impl ConfigBuilder {
    /// Start from defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the data directory (`None` keeps the current source).
    #[must_use]
    pub fn data_dir(mut self, data_dir: Option<PathBuf>) -> Self {
        self.data_dir = data_dir;
        self
    }

    /// Override the runtime binary.
    #[must_use]
    pub fn runtime(mut self, runtime: Option<String>) -> Self {
        self.runtime = runtime;
        self
    }

    /// Override the default image.
    #[must_use]
    pub fn image(mut self, image: Option<String>) -> Self {
        self.image = image;
        self
    }

    /// Resolve the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if no data directory can be determined, the
    /// configuration file exists but cannot be read or parsed, or the
    /// configured port layout is inconsistent.
    pub fn build(self) -> Result<Config> {
        let data_dir = self
            .data_dir
            .or_else(|| env::var_os(ENV_DATA_DIR).map(PathBuf::from))
            .or_else(|| home::home_dir().map(|home| home.join(DATA_DIR_NAME)))
            .ok_or_else(|| Error::Validation {
                field: "data_dir".into(),
                message: "could not determine a home directory".into(),
            })?;

        let document = read_document(&data_dir.join(CONFIG_FILE))?;

        let runtime = self
            .runtime
            .or_else(|| env::var(ENV_RUNTIME).ok())
            .or(document.runtime)
            .unwrap_or_else(|| DEFAULT_RUNTIME.to_string());

        let image = self
            .image
            .or_else(|| env::var(ENV_IMAGE).ok())
            .or(document.image)
            .unwrap_or_else(|| DEFAULT_IMAGE.to_string());

        let ports = document.ports.unwrap_or_default();
        let layout = PortLayout::new(
            ports.ssh_start.unwrap_or(PortLayout::DEFAULT_SSH_START),
            ports.stride.unwrap_or(PortLayout::DEFAULT_STRIDE),
            ports
                .service_start
                .unwrap_or(PortLayout::DEFAULT_SERVICE_START),
            ports
                .service_count
                .unwrap_or(PortLayout::DEFAULT_SERVICE_COUNT),
        )
        .map_err(Error::from)?;

        Ok(Config {
            data_dir,
            runtime,
            image,
            layout,
        })
    }
}

fn read_document(path: &Path) -> Result<ConfigDocument> {
    match std::fs::read_to_string(path) {
        Ok(contents) => Ok(serde_yaml::from_str(&contents)?),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(ConfigDocument::default()),
        Err(err) => Err(err.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn builder_for(dir: &TempDir) -> ConfigBuilder {
        ConfigBuilder::new().data_dir(Some(dir.path().to_path_buf()))
    }

    #[test]
    fn test_defaults_without_config_file() {
        let dir = TempDir::new().unwrap();
        let config = builder_for(&dir).build().unwrap();

        assert_eq!(config.runtime_binary(), "lxc");
        assert_eq!(config.image(), "ubuntu:22.04");
        assert_eq!(config.layout().ssh_start(), 2200);
        assert_eq!(config.store_path(), dir.path().join("ports"));
        assert_eq!(config.lock_path(), dir.path().join(".lock"));
    }

    #[test]
    fn test_config_file_is_honored() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            "runtime: incus\nimage: images:alpine/3.20\nports:\n  ssh_start: 3300\n  stride: 20\n",
        )
        .unwrap();

        let config = builder_for(&dir).build().unwrap();
        assert_eq!(config.runtime_binary(), "incus");
        assert_eq!(config.image(), "images:alpine/3.20");
        assert_eq!(config.layout().ssh_start(), 3300);
        assert_eq!(config.layout().stride(), 20);
        // Unset fields keep their defaults.
        assert_eq!(config.layout().service_count(), 10);
    }

    #[test]
    fn test_builder_overrides_beat_the_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "runtime: incus\n").unwrap();

        let config = builder_for(&dir)
            .runtime(Some("lxc-dev".to_string()))
            .build()
            .unwrap();
        assert_eq!(config.runtime_binary(), "lxc-dev");
    }

    #[test]
    fn test_environment_overrides_the_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "runtime: incus\n").unwrap();

        let saved = env::var(ENV_RUNTIME).ok();
        env::set_var(ENV_RUNTIME, "lxc-env");

        let result = builder_for(&dir).build();

        match saved {
            Some(value) => env::set_var(ENV_RUNTIME, value),
            None => env::remove_var(ENV_RUNTIME),
        }

        assert_eq!(result.unwrap().runtime_binary(), "lxc-env");
    }

    #[test]
    fn test_inconsistent_layout_is_rejected() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            "ports:\n  stride: 2\n  service_count: 10\n",
        )
        .unwrap();

        let err = builder_for(&dir).build().unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
    }

    #[test]
    fn test_malformed_yaml_is_a_config_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "runtime: [unterminated\n").unwrap();

        let err = builder_for(&dir).build().unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "runtmie: lxc\n").unwrap();

        assert!(builder_for(&dir).build().is_err());
    }
}
