//! The config module contains the structures and methods needed to create properly formatted
//! systemd-networkd configuration files, and to write them below a root directory.
mod link;
mod network;

use super::{error, Result};
use crate::interface_id::InterfaceId;
use lazy_static::lazy_static;
pub(crate) use link::{LinkBuilder, LinkConfig};
pub(crate) use network::{NetworkBuilder, NetworkConfig};
use regex::Regex;
use snafu::{OptionExt, ResultExt};
use std::collections::HashSet;
use std::fmt::Display;
use std::fs::{self, Permissions};
use std::io::Write;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use systemd_derive::SystemdUnitSection;
use tempfile::NamedTempFile;

/// Where networkd looks for runtime configuration, relative to the root directory
pub(crate) const NETWORKD_CONFIG_DIR: &str = "run/systemd/network";
const CONFIG_FILE_MODE: u32 = 0o644;

lazy_static! {
    // Names of the files we generate.  Only these are ever removed from the config directory.
    static ref UNIT_FILE_NAME: Regex = Regex::new(r"^id[0-9]+\.(network|link)$").unwrap();
}

/// A single `Key=Value` line of a unit file
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Directive {
    key: &'static str,
    value: String,
}

impl Directive {
    pub(crate) fn new<S>(key: &'static str, value: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            key,
            value: value.into(),
        }
    }
}

impl Display for Directive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

/// The `[Match]` section shared by .network and .link files.  An empty section matches every
/// device.
#[derive(Debug, Default, SystemdUnitSection)]
#[systemd(section = "Match")]
pub(crate) struct MatchSection {
    entries: Vec<Directive>,
}

impl MatchSection {
    pub(crate) fn new(entries: Vec<Directive>) -> Self {
        Self { entries }
    }
}

#[derive(Debug)]
pub(crate) enum NetworkDConfigFile {
    Network(InterfaceId, NetworkConfig),
    Link(InterfaceId, LinkConfig),
}

impl NetworkDConfigFile {
    /// The file's name, e.g. `id0.network`
    pub(crate) fn file_name(&self) -> String {
        match self {
            NetworkDConfigFile::Network(id, _) => format!("{}.{}", id, NetworkConfig::FILE_EXT),
            NetworkDConfigFile::Link(id, _) => format!("{}.{}", id, LinkConfig::FILE_EXT),
        }
    }

    /// Serialize the file into its path relative to the root directory and its exact contents
    pub(crate) fn render(&self) -> RenderedUnit {
        RenderedUnit {
            path: Path::new(NETWORKD_CONFIG_DIR).join(self.file_name()),
            content: self.to_string(),
        }
    }
}

impl Display for NetworkDConfigFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NetworkDConfigFile::Network(_, nw) => write!(f, "{}", nw),
            NetworkDConfigFile::Link(_, link) => write!(f, "{}", link),
        }
    }
}

/// A finished unit file: where it goes, relative to the root directory, and what it contains
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RenderedUnit {
    pub(crate) path: PathBuf,
    pub(crate) content: String,
}

/// Write the rendered units below `root`, then remove any previously generated unit files that
/// were not part of this run.  Nothing is created when there are no units.
pub(crate) fn write_config_files<P>(units: &[RenderedUnit], root: P) -> Result<()>
where
    P: AsRef<Path>,
{
    let root = root.as_ref();

    let mut written = HashSet::new();
    for unit in units {
        let path = root.join(&unit.path);
        write_unit(&path, &unit.content)?;
        written.insert(path);
    }

    remove_stale_files(&root.join(NETWORKD_CONFIG_DIR), &written)
}

/// Atomically write a single file: the content goes to a temporary file next to the target, which
/// then replaces the target
fn write_unit(path: &Path, content: &str) -> Result<()> {
    let dir = path.parent().context(error::MissingParentSnafu { path })?;
    fs::create_dir_all(dir).context(error::CreateDirSnafu { path: dir })?;

    let mut temp_file =
        NamedTempFile::new_in(dir).context(error::CreateTempfileSnafu { path: dir })?;
    temp_file
        .write_all(content.as_bytes())
        .context(error::NetworkDConfigWriteSnafu { path })?;
    temp_file
        .as_file()
        .set_permissions(Permissions::from_mode(CONFIG_FILE_MODE))
        .context(error::SetPermissionsSnafu { path })?;

    debug!("Writing '{}'", path.display());
    temp_file
        .persist(path)
        .context(error::PersistConfigFileSnafu { path })?;
    info!("Wrote '{}'", path.display());
    Ok(())
}

/// Remove generated unit files in `dir` that are not in `keep`.  Files with any other name are left
/// alone, and a missing directory has nothing to clean.
fn remove_stale_files(dir: &Path, keep: &HashSet<PathBuf>) -> Result<()> {
    if !dir.is_dir() {
        return Ok(());
    }

    for entry in fs::read_dir(dir).context(error::ReadDirSnafu { path: dir })? {
        let entry = entry.context(error::ReadDirSnafu { path: dir })?;
        let path = entry.path();

        let generated = entry
            .file_name()
            .to_str()
            .map(|name| UNIT_FILE_NAME.is_match(name))
            .unwrap_or(false);
        if !generated || keep.contains(&path) || !path.is_file() {
            continue;
        }

        fs::remove_file(&path).context(error::RemoveStaleSnafu { path: &path })?;
        info!("Removed stale '{}'", path.display());
    }

    Ok(())
}
