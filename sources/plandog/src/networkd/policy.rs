//! The policy module decides what each interface definition turns into: which `[Match]` entries
//! select the device, and which per-link directives (if any) call for a .link file.
//!
//! Both decisions are driven by ordered rule tables.  The table order is the order entries appear
//! in the generated files, whatever order the configuration listed them in.
use super::config::Directive;
use crate::net_config::{InterfaceDef, MatchKey};

/// What to render for a single interface definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RenderPlan {
    pub(crate) match_section: Vec<Directive>,
    pub(crate) needs_link_unit: bool,
    pub(crate) link_directives: Vec<Directive>,
}

/// Maps a `match` predicate to its `[Match]` entry
struct MatchRule {
    predicate: MatchKey,
    entry: &'static str,
}

static MATCH_RULES: &[MatchRule] = &[
    MatchRule {
        predicate: MatchKey::Driver,
        entry: "Driver",
    },
    MatchRule {
        predicate: MatchKey::MacAddress,
        entry: "MACAddress",
    },
    MatchRule {
        predicate: MatchKey::Name,
        entry: "OriginalName",
    },
];

/// Maps an interface property to a `[Link]` entry.  `value` returns `None` when the property
/// produces no line.
struct LinkRule {
    entry: &'static str,
    value: fn(&InterfaceDef) -> Option<String>,
}

static LINK_RULES: &[LinkRule] = &[
    LinkRule {
        entry: "Name",
        value: link_name,
    },
    LinkRule {
        entry: "WakeOnLan",
        value: wake_on_lan,
    },
];

fn link_name(interface: &InterfaceDef) -> Option<String> {
    interface.set_name.as_ref().map(|name| name.to_string())
}

// Only magic packets are supported; `false` leaves the kernel default alone
fn wake_on_lan(interface: &InterfaceDef) -> Option<String> {
    match interface.wakeonlan {
        Some(true) => Some("magic".to_string()),
        Some(false) | None => None,
    }
}

/// Build the render plan for an interface definition
pub(crate) fn decide(interface: &InterfaceDef) -> RenderPlan {
    let match_section = MATCH_RULES
        .iter()
        .filter_map(|rule| {
            interface
                .matches
                .get(&rule.predicate)
                .map(|value| Directive::new(rule.entry, value))
        })
        .collect();

    let link_directives: Vec<Directive> = LINK_RULES
        .iter()
        .filter_map(|rule| (rule.value)(interface).map(|value| Directive::new(rule.entry, value)))
        .collect();

    // A .link file with an empty [Link] section would do nothing
    let needs_link_unit = !link_directives.is_empty();

    RenderPlan {
        match_section,
        needs_link_unit,
        link_directives,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interface_id::{InterfaceId, InterfaceName};
    use crate::net_config::{DeviceType, Matches};

    fn interface() -> InterfaceDef {
        InterfaceDef {
            id: InterfaceId::new(0),
            device_type: DeviceType::Ethernet,
            matches: Matches::new(),
            set_name: None,
            wakeonlan: None,
        }
    }

    fn lines(directives: &[Directive]) -> Vec<String> {
        directives.iter().map(|d| d.to_string()).collect()
    }

    #[test]
    fn no_match_no_link() {
        let plan = decide(&interface());
        assert!(plan.match_section.is_empty());
        assert!(!plan.needs_link_unit);
        assert!(plan.link_directives.is_empty());
    }

    #[test]
    fn match_entries_in_canonical_order() {
        let mut i = interface();
        i.matches.insert(MatchKey::Name, "eno1".to_string());
        i.matches
            .insert(MatchKey::MacAddress, "52:54:00:79:99:c6".to_string());
        i.matches.insert(MatchKey::Driver, "ixgbe".to_string());

        let plan = decide(&i);
        assert_eq!(
            lines(&plan.match_section),
            vec![
                "Driver=ixgbe",
                "MACAddress=52:54:00:79:99:c6",
                "OriginalName=eno1"
            ]
        );
    }

    #[test]
    fn rename_and_wake_on_lan() {
        let mut i = interface();
        i.matches.insert(MatchKey::Driver, "ixgbe".to_string());
        i.wakeonlan = Some(true);
        i.set_name = Some(InterfaceName::try_from("lom1").unwrap());

        let plan = decide(&i);
        assert!(plan.needs_link_unit);
        assert_eq!(
            lines(&plan.link_directives),
            vec!["Name=lom1", "WakeOnLan=magic"]
        );
    }

    #[test]
    fn rename_only() {
        let mut i = interface();
        i.set_name = Some(InterfaceName::try_from("lom1").unwrap());

        let plan = decide(&i);
        assert!(plan.needs_link_unit);
        assert_eq!(lines(&plan.link_directives), vec!["Name=lom1"]);
    }

    #[test]
    fn wake_on_lan_only() {
        let mut i = interface();
        i.wakeonlan = Some(true);

        let plan = decide(&i);
        assert!(plan.needs_link_unit);
        assert_eq!(lines(&plan.link_directives), vec!["WakeOnLan=magic"]);
    }

    #[test]
    fn wake_on_lan_false_needs_no_link() {
        let mut i = interface();
        i.wakeonlan = Some(false);

        let plan = decide(&i);
        assert!(!plan.needs_link_unit);
        assert!(plan.link_directives.is_empty());
    }
}
