use super::{Directive, MatchSection};
use systemd_derive::{SystemdUnit, SystemdUnitSection};

/// A .network file.  Both sections are always written, so the smallest file is
/// `[Match]\n\n[Network]\n`.
#[derive(Debug, Default, SystemdUnit)]
pub(crate) struct NetworkConfig {
    r#match: Option<MatchSection>,
    network: Option<NetworkSection>,
}

// IP-level directives (addresses, DHCP, routes) would be added here
#[derive(Debug, Default, SystemdUnitSection)]
#[systemd(section = "Network")]
struct NetworkSection {}

impl NetworkConfig {
    pub(crate) const FILE_EXT: &'static str = "network";

    fn match_mut(&mut self) -> &mut MatchSection {
        self.r#match.get_or_insert_with(MatchSection::default)
    }
}

/// The builder for `NetworkConfig`
#[derive(Debug)]
pub(crate) struct NetworkBuilder {
    network: NetworkConfig,
}

impl NetworkBuilder {
    pub(crate) fn new() -> Self {
        Self {
            network: NetworkConfig {
                r#match: Some(MatchSection::default()),
                network: Some(NetworkSection::default()),
            },
        }
    }

    /// Set the `[Match]` entries, in the order given
    pub(crate) fn with_match(&mut self, entries: Vec<Directive>) {
        *self.network.match_mut() = MatchSection::new(entries);
    }

    pub(crate) fn build(self) -> NetworkConfig {
        self.network
    }
}
