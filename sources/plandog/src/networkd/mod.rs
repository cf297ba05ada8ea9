//! The networkd module turns interface definitions into systemd-networkd unit files.  Every
//! definition gets a .network file; definitions that rename the device or set other per-link
//! options also get a .link file.
pub(crate) mod config;
mod policy;

use self::config::{LinkBuilder, NetworkBuilder, NetworkDConfigFile};
use self::policy::RenderPlan;
use crate::net_config::InterfaceDef;

pub(crate) struct NetworkDConfig {
    interfaces: Vec<InterfaceDef>,
}

impl NetworkDConfig {
    pub(crate) fn new(interfaces: Vec<InterfaceDef>) -> Self {
        Self { interfaces }
    }

    /// Generate systemd-networkd configuration files for all interfaces, in document order
    pub(crate) fn create_files(&self) -> Vec<NetworkDConfigFile> {
        self.interfaces
            .iter()
            .flat_map(|interface| {
                let plan = policy::decide(interface);
                debug!(
                    "Planned {} ({}): {} match entries, link file: {}",
                    interface.id,
                    interface.device_type,
                    plan.match_section.len(),
                    plan.needs_link_unit
                );
                render(interface, &plan)
            })
            .collect()
    }
}

/// Build the files for one interface: its .network file, followed by its .link file if the plan
/// calls for one
fn render(interface: &InterfaceDef, plan: &RenderPlan) -> Vec<NetworkDConfigFile> {
    let mut network = NetworkBuilder::new();
    network.with_match(plan.match_section.clone());
    let mut files = vec![NetworkDConfigFile::Network(interface.id, network.build())];

    if plan.needs_link_unit {
        let mut link = LinkBuilder::new();
        link.with_match(plan.match_section.clone());
        link.with_link(plan.link_directives.clone());
        files.push(NetworkDConfigFile::Link(interface.id, link.build()));
    }

    files
}

mod error {
    use snafu::Snafu;
    use std::io;
    use std::path::PathBuf;

    #[derive(Debug, Snafu)]
    #[snafu(visibility(pub(crate)))]
    pub(crate) enum Error {
        #[snafu(display("Unable to create directory '{}': {}", path.display(), source))]
        CreateDir { path: PathBuf, source: io::Error },

        #[snafu(display("Unable to create temporary file in '{}': {}", path.display(), source))]
        CreateTempfile { path: PathBuf, source: io::Error },

        #[snafu(display("Config file path '{}' has no parent directory", path.display()))]
        MissingParent { path: PathBuf },

        #[snafu(display("Unable to write config to {}: {}", path.display(), source))]
        NetworkDConfigWrite { path: PathBuf, source: io::Error },

        #[snafu(display("Unable to move config into place at {}: {}", path.display(), source))]
        PersistConfigFile {
            path: PathBuf,
            source: tempfile::PersistError,
        },

        #[snafu(display("Unable to list config directory '{}': {}", path.display(), source))]
        ReadDir { path: PathBuf, source: io::Error },

        #[snafu(display("Unable to remove stale config file {}: {}", path.display(), source))]
        RemoveStale { path: PathBuf, source: io::Error },

        #[snafu(display("Unable to set permissions on {}: {}", path.display(), source))]
        SetPermissions { path: PathBuf, source: io::Error },
    }
}
pub(crate) use error::Error;
pub(crate) type Result<T> = std::result::Result<T, error::Error>;
