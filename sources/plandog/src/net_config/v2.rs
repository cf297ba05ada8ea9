//! The `v2` module validates a generic document tree against version 2 of the network
//! configuration schema:
//!
//! ```yaml
//! network:
//!   version: 2
//!   config:
//!     - type: ethernet
//!       match:
//!         driver: ixgbe
//!       set-name: lom1
//!       wakeonlan: true
//! ```
//!
//! Validation stops at the first problem.  Errors point at the node that is actually wrong: the
//! value for a bad value, the key for an unknown key, and the enclosing mapping for a missing key.
use super::document::Node;
use super::error::{self, DocumentError};
use super::interface::{ConfigDocument, DeviceType, InterfaceConfig, MatchKey, Matches};
use crate::interface_id::{InterfaceName, MacAddress};
use snafu::{ensure, OptionExt};
use std::str::FromStr;

type Result<T> = std::result::Result<T, DocumentError>;

const SUPPORTED_VERSION: u8 = 2;
const SUPPORTED_VERSION_TEXT: &str = "2";

/// Validate the whole document, returning the configuration it describes
pub(crate) fn validate(root: &Node) -> Result<ConfigDocument> {
    let top = Fields::new(root, &["network"])?;
    let network = Fields::new(top.require("network")?, &["version", "config"])?;

    let version = validate_version(network.require("version")?)?;

    let interfaces = match network.get("config") {
        Some(config) if !is_null(config) => expect_sequence(config)?
            .iter()
            .map(validate_interface)
            .collect::<Result<Vec<_>>>()?,
        _ => Vec::new(),
    };

    Ok(ConfigDocument {
        version,
        interfaces,
    })
}

fn validate_version(node: &Node) -> Result<u8> {
    let version = expect_scalar(node)?;
    ensure!(
        version == SUPPORTED_VERSION_TEXT,
        error::SchemaSnafu {
            position: node.position,
            message: format!("Only version {} is supported", SUPPORTED_VERSION),
        }
    );
    Ok(SUPPORTED_VERSION)
}

// =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=

/// An interface entry being filled in key by key
#[derive(Debug, Default)]
struct PartialInterface {
    device_type: Option<DeviceType>,
    matches: Option<Matches>,
    set_name: Option<InterfaceName>,
    wakeonlan: Option<bool>,
}

/// A key allowed in an interface entry and the function that validates its value.  Unless
/// `allows_null` is set, an empty value is an error rather than being passed to `apply`.
struct KeyRule {
    key: &'static str,
    allows_null: bool,
    apply: fn(&Node, &mut PartialInterface) -> Result<()>,
}

// New interface properties are added here
static INTERFACE_KEYS: &[KeyRule] = &[
    KeyRule {
        key: "type",
        allows_null: false,
        apply: apply_type,
    },
    KeyRule {
        key: "match",
        allows_null: true,
        apply: apply_match,
    },
    KeyRule {
        key: "set-name",
        allows_null: false,
        apply: apply_set_name,
    },
    KeyRule {
        key: "wakeonlan",
        allows_null: false,
        apply: apply_wakeonlan,
    },
];

fn validate_interface(node: &Node) -> Result<InterfaceConfig> {
    let mut partial = PartialInterface::default();
    for (key, value) in expect_mapping(node)? {
        let name = expect_scalar(key)?;
        let rule = INTERFACE_KEYS
            .iter()
            .find(|rule| rule.key == name)
            .context(error::SchemaSnafu {
                position: key.position,
                message: format!("unknown key '{}'", name),
            })?;
        ensure!(
            rule.allows_null || !is_null(value),
            error::SchemaSnafu {
                position: key.position,
                message: format!("expected value for '{}'", name),
            }
        );
        (rule.apply)(value, &mut partial)?;
    }

    let device_type = partial.device_type.context(error::SchemaSnafu {
        position: node.position,
        message: "missing required key 'type'",
    })?;

    Ok(InterfaceConfig {
        device_type,
        matches: partial.matches,
        set_name: partial.set_name,
        wakeonlan: partial.wakeonlan,
    })
}

fn apply_type(node: &Node, partial: &mut PartialInterface) -> Result<()> {
    let value = expect_scalar(node)?;
    let device_type = DeviceType::from_str(value).map_err(|()| {
        error::SchemaSnafu {
            position: node.position,
            message: format!("unknown interface type '{}'", value),
        }
        .build()
    })?;
    partial.device_type = Some(device_type);
    Ok(())
}

fn apply_match(node: &Node, partial: &mut PartialInterface) -> Result<()> {
    let mut matches = Matches::new();
    if is_null(node) {
        partial.matches = Some(matches);
        return Ok(());
    }

    for (key, value) in expect_mapping(node)? {
        let name = expect_scalar(key)?;
        let match_key = MatchKey::from_str(name).map_err(|()| {
            error::SchemaSnafu {
                position: key.position,
                message: format!("unknown key '{}'", name),
            }
            .build()
        })?;

        ensure!(
            !is_null(value),
            error::SchemaSnafu {
                position: key.position,
                message: format!("expected value for '{}'", name),
            }
        );
        let predicate = expect_scalar(value)?;
        if match_key == MatchKey::MacAddress {
            MacAddress::try_from(predicate).map_err(|e| {
                error::SchemaSnafu {
                    position: value.position,
                    message: e.to_string(),
                }
                .build()
            })?;
        }

        matches.insert(match_key, predicate.to_string());
    }

    partial.matches = Some(matches);
    Ok(())
}

fn apply_set_name(node: &Node, partial: &mut PartialInterface) -> Result<()> {
    let value = expect_scalar(node)?;
    let name = InterfaceName::try_from(value).map_err(|e| {
        error::SchemaSnafu {
            position: node.position,
            message: e.to_string(),
        }
        .build()
    })?;
    partial.set_name = Some(name);
    Ok(())
}

fn apply_wakeonlan(node: &Node, partial: &mut PartialInterface) -> Result<()> {
    let value = expect_scalar(node)?;
    let wakeonlan = parse_bool(value).context(error::SchemaSnafu {
        position: node.position,
        message: format!("invalid boolean value '{}'", value),
    })?;
    partial.wakeonlan = Some(wakeonlan);
    Ok(())
}

// YAML 1.1 boolean spellings
fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "y" => Some(true),
        "false" | "no" | "off" | "n" => Some(false),
        _ => None,
    }
}

// =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=

/// The entries of a mapping node whose keys have been checked against an allowed set
struct Fields<'a> {
    node: &'a Node,
    pairs: &'a [(Node, Node)],
}

impl<'a> Fields<'a> {
    fn new(node: &'a Node, allowed: &[&str]) -> Result<Self> {
        let pairs = expect_mapping(node)?;
        for (key, _) in pairs {
            let name = expect_scalar(key)?;
            ensure!(
                allowed.contains(&name),
                error::SchemaSnafu {
                    position: key.position,
                    message: format!("unknown key '{}'", name),
                }
            );
        }
        Ok(Self { node, pairs })
    }

    fn get(&self, key: &str) -> Option<&'a Node> {
        self.pairs
            .iter()
            .find(|(k, _)| k.as_scalar() == Some(key))
            .map(|(_, v)| v)
    }

    fn require(&self, key: &str) -> Result<&'a Node> {
        self.get(key).context(error::SchemaSnafu {
            position: self.node.position,
            message: format!("missing required key '{}'", key),
        })
    }
}

fn expect_mapping(node: &Node) -> Result<&[(Node, Node)]> {
    node.as_mapping().context(error::SchemaSnafu {
        position: node.position,
        message: "expected mapping",
    })
}

fn expect_sequence(node: &Node) -> Result<&[Node]> {
    node.as_sequence().context(error::SchemaSnafu {
        position: node.position,
        message: "expected sequence",
    })
}

fn expect_scalar(node: &Node) -> Result<&str> {
    node.as_scalar().context(error::SchemaSnafu {
        position: node.position,
        message: "expected scalar",
    })
}

// An empty value, as in `config:` with nothing after it, or one spelled as a YAML null
fn is_null(node: &Node) -> bool {
    matches!(node.as_scalar(), Some("" | "~" | "null" | "Null" | "NULL"))
}
