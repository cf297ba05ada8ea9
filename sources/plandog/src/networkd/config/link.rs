use super::{Directive, MatchSection};
use systemd_derive::{SystemdUnit, SystemdUnitSection};

/// A .link file, read by udev when a device appears.  Device renames and other per-link settings
/// live here rather than in the .network file.
#[derive(Debug, Default, SystemdUnit)]
pub(crate) struct LinkConfig {
    r#match: Option<MatchSection>,
    link: Option<LinkSection>,
}

#[derive(Debug, Default, SystemdUnitSection)]
#[systemd(section = "Link")]
struct LinkSection {
    entries: Vec<Directive>,
}

impl LinkConfig {
    pub(crate) const FILE_EXT: &'static str = "link";

    fn match_mut(&mut self) -> &mut MatchSection {
        self.r#match.get_or_insert_with(MatchSection::default)
    }

    fn link_mut(&mut self) -> &mut LinkSection {
        self.link.get_or_insert_with(LinkSection::default)
    }
}

/// The builder for `LinkConfig`
#[derive(Debug)]
pub(crate) struct LinkBuilder {
    link: LinkConfig,
}

impl LinkBuilder {
    pub(crate) fn new() -> Self {
        Self {
            link: LinkConfig {
                r#match: Some(MatchSection::default()),
                link: Some(LinkSection::default()),
            },
        }
    }

    /// Set the `[Match]` entries, in the order given
    pub(crate) fn with_match(&mut self, entries: Vec<Directive>) {
        *self.link.match_mut() = MatchSection::new(entries);
    }

    /// Set the `[Link]` entries, in the order given
    pub(crate) fn with_link(&mut self, entries: Vec<Directive>) {
        self.link.link_mut().entries = entries;
    }

    pub(crate) fn build(self) -> LinkConfig {
        self.link
    }
}
