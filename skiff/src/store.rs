//! The persistent allocation store.
//!
//! A flat text file maps container names to their allocated SSH ports,
//! one `name:port` record per line. Saving appends; removal rewrites the
//! file without the removed records. The format carries no escaping:
//! name validation forbids `:`, so the first colon always splits name
//! from port.
//!
//! Read paths are tolerant by design: a malformed line is skipped with a
//! warning rather than failing the whole operation, so one corrupted
//! record can never wedge the allocation subsystem.

use std::collections::HashSet;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use log::warn;

use crate::container::ContainerName;
use crate::error::Result;
use crate::Port;

/// Flat-file store of `name -> ssh port` allocation records.
///
/// All mutating methods must be called while holding the exclusive lock;
/// the store itself performs no locking.
#[derive(Debug, Clone)]
pub struct AllocationStore {
    path: PathBuf,
}

impl AllocationStore {
    /// Create a handle for the store file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append an allocation record.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the parent directory cannot be created or
    /// the file cannot be opened for append.
    pub fn save(&self, name: &ContainerName, port: Port) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)?;
        writeln!(file, "{name}:{port}")?;
        Ok(())
    }

    /// Remove every record for `name`, preserving all other lines in
    /// their original order.
    ///
    /// Removing an absent name is a no-op. When the last record goes, the
    /// file is truncated to empty rather than deleted.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be read or rewritten.
    pub fn remove(&self, name: &ContainerName) -> Result<()> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(err) => return Err(err.into()),
        };

        let prefix = format!("{name}:");
        let mut kept = String::with_capacity(contents.len());
        for line in contents.lines() {
            if line.starts_with(&prefix) {
                continue;
            }
            kept.push_str(line);
            kept.push('\n');
        }

        std::fs::write(&self.path, kept)?;
        Ok(())
    }

    /// Look up the port recorded for `name`; first match wins.
    ///
    /// Malformed lines are treated as "no match", never as errors.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file exists but cannot be read.
    pub fn get(&self, name: &ContainerName) -> Result<Option<Port>> {
        for (record_name, port) in self.read_records()? {
            if record_name == name.as_str() {
                return Ok(Some(port));
            }
        }
        Ok(None)
    }

    /// All allocated SSH ports, for the allocator's free-slot scan.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file exists but cannot be read.
    pub fn allocated_ports(&self) -> Result<HashSet<u16>> {
        Ok(self
            .read_records()?
            .into_iter()
            .map(|(_, port)| port.value())
            .collect())
    }

    /// All well-formed records in file order.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file exists but cannot be read.
    pub fn entries(&self) -> Result<Vec<(String, Port)>> {
        self.read_records()
    }

    fn read_records(&self) -> Result<Vec<(String, Port)>> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        let mut records = Vec::new();
        for line in contents.lines() {
            if line.is_empty() {
                continue;
            }
            match parse_record(line) {
                Some((name, port)) => records.push((name.to_string(), port)),
                None => warn!("skipping malformed allocation record: {line:?}"),
            }
        }
        Ok(records)
    }
}

fn parse_record(line: &str) -> Option<(&str, Port)> {
    let (name, port) = line.split_once(':')?;
    if name.is_empty() {
        return None;
    }
    let port: u16 = port.trim().parse().ok()?;
    Port::try_from(port).ok().map(|port| (name, port))
}
