//! Production runtime implementation shelling out to the LXD-style CLI.
//!
//! Every trait method maps to one invocation of the runtime binary. A
//! non-zero exit surfaces as [`Error::Runtime`] carrying the operation
//! name and trimmed stderr; there are no retries and no timeouts (a hung
//! runtime hangs the command, which is acceptable for an interactive
//! CLI).

use std::process::Command;

use log::warn;

use crate::container::{ContainerInfo, ContainerName, ContainerStatus};
use crate::error::{Error, Result};
use crate::runtime::ContainerRuntime;
use crate::Port;

/// Default binary name of the container runtime CLI.
pub const DEFAULT_BINARY: &str = "lxc";

/// [`ContainerRuntime`] implementation driving the runtime's CLI.
#[derive(Debug, Clone)]
pub struct LxdRuntime {
    binary: String,
}

impl LxdRuntime {
    /// Create a runtime client invoking the given binary.
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// The binary this client invokes.
    #[must_use]
    pub fn binary(&self) -> &str {
        &self.binary
    }

    fn run(&self, operation: &str, args: &[&str]) -> Result<String> {
        let output = Command::new(&self.binary)
            .args(args)
            .output()
            .map_err(|err| Error::runtime(operation, format!("{}: {err}", self.binary)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let detail = match stderr.trim() {
                "" => format!("exit status {}", output.status.code().unwrap_or(-1)),
                trimmed => trimmed.to_string(),
            };
            return Err(Error::runtime(operation, detail));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl Default for LxdRuntime {
    fn default() -> Self {
        Self::new(DEFAULT_BINARY)
    }
}

impl ContainerRuntime for LxdRuntime {
    fn list(&self) -> Result<Vec<ContainerInfo>> {
        let stdout = self.run("list", &["list", "-c", "ns", "-f", "csv"])?;
        parse_listing(&stdout)
    }

    fn launch(&self, image: &str, name: &ContainerName) -> Result<()> {
        self.run("launch", &["launch", image, name.as_str()])?;
        Ok(())
    }

    fn copy(&self, source: &str, name: &ContainerName) -> Result<()> {
        self.run("copy", &["copy", source, name.as_str()])?;
        Ok(())
    }

    fn start(&self, name: &ContainerName) -> Result<()> {
        self.run("start", &["start", name.as_str()])?;
        Ok(())
    }

    fn stop(&self, name: &ContainerName, force: bool) -> Result<()> {
        let mut args = vec!["stop", name.as_str()];
        if force {
            args.push("--force");
        }
        self.run("stop", &args)?;
        Ok(())
    }

    fn delete(&self, name: &ContainerName, force: bool) -> Result<()> {
        let mut args = vec!["delete", name.as_str()];
        if force {
            args.push("--force");
        }
        self.run("delete", &args)?;
        Ok(())
    }

    fn list_devices(&self, name: &ContainerName) -> Result<Vec<String>> {
        let stdout = self.run("device list", &["config", "device", "list", name.as_str()])?;
        Ok(stdout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }

    fn device_connect(&self, name: &ContainerName, device: &str) -> Result<String> {
        let stdout = self.run(
            "device get",
            &["config", "device", "get", name.as_str(), device, "connect"],
        )?;
        Ok(stdout.trim().to_string())
    }

    fn add_proxy(
        &self,
        name: &ContainerName,
        device: &str,
        host_port: Port,
        container_port: Port,
    ) -> Result<()> {
        let listen = format!("listen=tcp:0.0.0.0:{host_port}");
        let connect = format!("connect=tcp:127.0.0.1:{container_port}");
        self.run(
            "device add",
            &[
                "config",
                "device",
                "add",
                name.as_str(),
                device,
                "proxy",
                &listen,
                &connect,
            ],
        )?;
        Ok(())
    }

    fn remove_device(&self, name: &ContainerName, device: &str) -> Result<()> {
        self.run(
            "device remove",
            &["config", "device", "remove", name.as_str(), device],
        )?;
        Ok(())
    }
}

/// Parse the `name,status` CSV listing.
///
/// Rows that cannot be parsed, and rows whose name does not satisfy this
/// tool's validation rules, are skipped with a warning; the listing is
/// best-effort rather than all-or-nothing.
fn parse_listing(stdout: &str) -> Result<Vec<ContainerInfo>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(stdout.as_bytes());

    let mut containers = Vec::new();
    for record in reader.records() {
        let record = match record {
            Ok(record) => record,
            Err(err) => {
                warn!("skipping unparseable container listing row: {err}");
                continue;
            }
        };
        let (Some(name), Some(status)) = (record.get(0), record.get(1)) else {
            warn!("skipping short container listing row: {record:?}");
            continue;
        };
        match ContainerName::new(name) {
            Ok(name) => containers.push(ContainerInfo {
                name,
                status: ContainerStatus::parse(status),
            }),
            Err(err) => warn!("skipping unmanaged container in listing: {err}"),
        }
    }
    Ok(containers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_listing() {
        let infos = parse_listing("web,RUNNING\ndb,STOPPED\n").unwrap();
        assert_eq!(infos.len(), 2);
        assert_eq!(infos[0].name.as_str(), "web");
        assert_eq!(infos[0].status, ContainerStatus::Running);
        assert_eq!(infos[1].status, ContainerStatus::Stopped);
    }

    #[test]
    fn test_parse_listing_skips_invalid_names() {
        let infos = parse_listing("web,RUNNING\n9bad,RUNNING\n").unwrap();
        assert_eq!(infos.len(), 1);
        assert_eq!(infos[0].name.as_str(), "web");
    }

    #[test]
    fn test_parse_listing_skips_short_rows() {
        let infos = parse_listing("web,RUNNING\nlonely\n").unwrap();
        assert_eq!(infos.len(), 1);
    }

    #[test]
    fn test_parse_empty_listing() {
        assert!(parse_listing("").unwrap().is_empty());
    }

    #[test]
    fn test_missing_binary_surfaces_operation_name() {
        let runtime = LxdRuntime::new("skiff-test-no-such-binary");
        let err = runtime.list().unwrap_err();
        match err {
            Error::Runtime { operation, .. } => assert_eq!(operation, "list"),
            other => panic!("expected runtime error, got {other}"),
        }
    }
}
