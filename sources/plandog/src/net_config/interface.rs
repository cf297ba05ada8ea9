//! The interface module holds the in-memory model of a validated configuration: the document as a
//! whole, the raw interface entries the validator produces, and the `InterfaceDef` records the
//! renderer consumes.
use crate::interface_id::{InterfaceId, InterfaceName};
use indexmap::IndexMap;
use std::fmt::Display;
use std::str::FromStr;

/// The kind of device an interface entry describes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DeviceType {
    Ethernet,
    Wifi,
    Bridge,
}

impl FromStr for DeviceType {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "ethernet" => Ok(DeviceType::Ethernet),
            "wifi" => Ok(DeviceType::Wifi),
            "bridge" => Ok(DeviceType::Bridge),
            _ => Err(()),
        }
    }
}

impl Display for DeviceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DeviceType::Ethernet => "ethernet",
            DeviceType::Wifi => "wifi",
            DeviceType::Bridge => "bridge",
        };
        write!(f, "{}", s)
    }
}

/// A predicate key allowed under `match`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum MatchKey {
    Driver,
    MacAddress,
    Name,
}

impl MatchKey {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            MatchKey::Driver => "driver",
            MatchKey::MacAddress => "macaddress",
            MatchKey::Name => "name",
        }
    }
}

impl FromStr for MatchKey {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "driver" => Ok(MatchKey::Driver),
            "macaddress" => Ok(MatchKey::MacAddress),
            "name" => Ok(MatchKey::Name),
            _ => Err(()),
        }
    }
}

impl Display for MatchKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Match predicates in the order the document gave them
pub(crate) type Matches = IndexMap<MatchKey, String>;

/// A validated configuration document
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ConfigDocument {
    pub(crate) version: u8,
    pub(crate) interfaces: Vec<InterfaceConfig>,
}

/// One validated entry of the `config` sequence, before it has been given an id
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct InterfaceConfig {
    pub(crate) device_type: DeviceType,
    pub(crate) matches: Option<Matches>,
    pub(crate) set_name: Option<InterfaceName>,
    pub(crate) wakeonlan: Option<bool>,
}

/// An interface definition as the renderer sees it.  Never modified once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct InterfaceDef {
    pub(crate) id: InterfaceId,
    pub(crate) device_type: DeviceType,
    pub(crate) matches: Matches,
    pub(crate) set_name: Option<InterfaceName>,
    pub(crate) wakeonlan: Option<bool>,
}

impl InterfaceDef {
    fn new(id: InterfaceId, config: InterfaceConfig) -> Self {
        let InterfaceConfig {
            device_type,
            matches,
            set_name,
            wakeonlan,
        } = config;

        Self {
            id,
            device_type,
            // No `match` key means an empty predicate set, not a missing one
            matches: matches.unwrap_or_default(),
            set_name,
            wakeonlan,
        }
    }
}

/// Turn a validated document into interface definitions, numbering them in document order
pub(crate) fn build(document: ConfigDocument) -> Vec<InterfaceDef> {
    document
        .interfaces
        .into_iter()
        .enumerate()
        .map(|(index, config)| InterfaceDef::new(InterfaceId::new(index), config))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ethernet() -> InterfaceConfig {
        InterfaceConfig {
            device_type: DeviceType::Ethernet,
            matches: None,
            set_name: None,
            wakeonlan: None,
        }
    }

    #[test]
    fn ids_follow_document_order() {
        let mut wifi = ethernet();
        wifi.device_type = DeviceType::Wifi;
        let mut renamed = ethernet();
        renamed.set_name = Some(InterfaceName::try_from("lom1").unwrap());

        let document = ConfigDocument {
            version: 2,
            interfaces: vec![wifi, ethernet(), renamed],
        };
        let defs = build(document);

        let ids: Vec<String> = defs.iter().map(|d| d.id.to_string()).collect();
        assert_eq!(ids, vec!["id0", "id1", "id2"]);
        assert_eq!(defs[0].device_type, DeviceType::Wifi);
        assert_eq!(defs[2].set_name.as_deref(), Some("lom1"));
    }

    #[test]
    fn missing_match_is_empty() {
        let defs = build(ConfigDocument {
            version: 2,
            interfaces: vec![ethernet()],
        });
        assert!(defs[0].matches.is_empty());
        assert_eq!(defs[0].wakeonlan, None);
        assert_eq!(defs[0].set_name, None);
    }

    #[test]
    fn matches_copied_verbatim() {
        let mut config = ethernet();
        let mut matches = Matches::new();
        matches.insert(MatchKey::Name, "en*".to_string());
        matches.insert(MatchKey::Driver, "ixgbe".to_string());
        config.matches = Some(matches.clone());

        let defs = build(ConfigDocument {
            version: 2,
            interfaces: vec![config],
        });
        assert_eq!(defs[0].matches, matches);
    }

    #[test]
    fn empty_document() {
        let defs = build(ConfigDocument {
            version: 2,
            interfaces: vec![],
        });
        assert!(defs.is_empty());
    }

    #[test]
    fn match_keys() {
        for key in [MatchKey::Driver, MatchKey::MacAddress, MatchKey::Name] {
            assert_eq!(MatchKey::from_str(key.as_str()), Ok(key));
        }
        assert!(MatchKey::from_str("path").is_err());
    }

    #[test]
    fn device_types() {
        for ty in [DeviceType::Ethernet, DeviceType::Wifi, DeviceType::Bridge] {
            assert_eq!(DeviceType::from_str(&ty.to_string()), Ok(ty));
        }
        assert!(DeviceType::from_str("bond").is_err());
    }
}
