//! The document module turns the raw bytes of a configuration file into a generic tree of
//! mappings, sequences and scalars.  Every node keeps the position it started at in the source
//! text, so later stages can point at the exact offending construct.  Nothing here knows about the
//! configuration schema.
use super::error::{self, DocumentError};
use marked_yaml::types::{MarkedMappingNode, MarkedSequenceNode};
use marked_yaml::{LoadError, Marker};
use std::fmt::Display;

type Result<T> = std::result::Result<T, DocumentError>;

/// A location in the source text.  Both numbers count from zero, the way libyaml marks do, so the
/// second character of the second line is `line 1 column 1`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct Position {
    pub(crate) line: usize,
    pub(crate) column: usize,
}

impl Position {
    pub(crate) fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

// `marked_yaml` markers count from one
impl From<&Marker> for Position {
    fn from(marker: &Marker) -> Self {
        Self {
            line: marker.line().saturating_sub(1),
            column: marker.column().saturating_sub(1),
        }
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {} column {}", self.line, self.column)
    }
}

/// A node of the generic tree: a value plus the position it started at
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Node {
    pub(crate) position: Position,
    pub(crate) value: Value,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Value {
    Scalar(String),
    Sequence(Vec<Node>),
    // Key/value pairs in document order; the order matters for id assignment downstream
    Mapping(Vec<(Node, Node)>),
}

impl Node {
    /// The scalar text, if this node is a scalar
    pub(crate) fn as_scalar(&self) -> Option<&str> {
        match &self.value {
            Value::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub(crate) fn as_sequence(&self) -> Option<&[Node]> {
        match &self.value {
            Value::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub(crate) fn as_mapping(&self) -> Option<&[(Node, Node)]> {
        match &self.value {
            Value::Mapping(pairs) => Some(pairs),
            _ => None,
        }
    }
}

/// Parse the bytes of a configuration document into a generic tree
pub(crate) fn parse(bytes: &[u8]) -> Result<Node> {
    let text = std::str::from_utf8(bytes).map_err(|e| DocumentError::Syntax {
        position: position_at(&bytes[..e.valid_up_to()]),
        message: "invalid UTF-8 in configuration".to_string(),
    })?;

    let root = marked_yaml::parse_yaml(0, text).map_err(load_error)?;
    Ok(convert(&root, Position::default()))
}

/// Find the position just past `prefix`, which must be valid UTF-8
fn position_at(prefix: &[u8]) -> Position {
    let prefix = String::from_utf8_lossy(prefix);
    let line = prefix.matches('\n').count();
    let column = match prefix.rfind('\n') {
        Some(i) => prefix[i + 1..].chars().count(),
        None => prefix.chars().count(),
    };
    Position::new(line, column)
}

// Start markers are optional in `marked_yaml`; a node without one inherits its parent's position.
// A block mapping is marked at the `:` after its first key, so the first key's start is used when
// it comes earlier.  Flow mappings are marked at their `{`, and empty ones have no keys.
fn node_position(node: &marked_yaml::Node, parent: Position) -> Position {
    let start = node.span().start().map(Position::from);
    let first_key = match node {
        marked_yaml::Node::Mapping(map) => map
            .iter()
            .next()
            .and_then(|(key, _)| key.span().start())
            .map(Position::from),
        _ => None,
    };
    match (start, first_key) {
        (Some(start), Some(key)) => start.min(key),
        (start, key) => start.or(key).unwrap_or(parent),
    }
}

fn convert(node: &marked_yaml::Node, parent: Position) -> Node {
    let position = node_position(node, parent);
    let value = match node {
        marked_yaml::Node::Scalar(s) => Value::Scalar(s.as_str().to_string()),
        marked_yaml::Node::Sequence(seq) => Value::Sequence(convert_sequence(seq, position)),
        marked_yaml::Node::Mapping(map) => Value::Mapping(convert_mapping(map, position)),
    };
    Node { position, value }
}

fn convert_sequence(seq: &MarkedSequenceNode, position: Position) -> Vec<Node> {
    seq.iter().map(|item| convert(item, position)).collect()
}

fn convert_mapping(map: &MarkedMappingNode, position: Position) -> Vec<(Node, Node)> {
    map.iter()
        .map(|(key, value)| {
            let key_position = key
                .span()
                .start()
                .map(Position::from)
                .unwrap_or(position);
            let key_node = Node {
                position: key_position,
                value: Value::Scalar(key.as_str().to_string()),
            };
            (key_node, convert(value, key_position))
        })
        .collect()
}

// The scanner's own message ends with " at line L column C", counted differently from ours; the
// position is reported separately, so drop that suffix
fn scanner_message<E: Display>(e: &E) -> String {
    let msg = e.to_string();
    match msg.find(" at line ") {
        Some(i) => msg[..i].to_string(),
        None => msg,
    }
}

fn load_error(e: LoadError) -> DocumentError {
    match e {
        LoadError::TopLevelMustBeMapping(marker) => error::SchemaSnafu {
            position: Position::from(&marker),
            message: "expected mapping",
        }
        .build(),
        LoadError::ScanError(marker, scan) => error::SyntaxSnafu {
            position: Position::from(&marker),
            message: scanner_message(&scan),
        }
        .build(),
        LoadError::UnexpectedAnchor(marker) => error::SyntaxSnafu {
            position: Position::from(&marker),
            message: "anchors are not supported",
        }
        .build(),
        LoadError::MappingKeyMustBeScalar(marker) => error::SyntaxSnafu {
            position: Position::from(&marker),
            message: "mapping keys must be scalars",
        }
        .build(),
        LoadError::UnexpectedTag(marker) => error::SyntaxSnafu {
            position: Position::from(&marker),
            message: "tags are not supported",
        }
        .build(),
        #[allow(unreachable_patterns)]
        other => error::SyntaxSnafu {
            position: Position::default(),
            message: scanner_message(&other),
        }
        .build(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scalar(node: &Node) -> &str {
        node.as_scalar().unwrap()
    }

    #[test]
    fn positions_are_zero_based() {
        let root = parse(b"network:\n  version: 2\n").unwrap();
        assert_eq!(root.position, Position::new(0, 0));

        let pairs = root.as_mapping().unwrap();
        let (key, network) = &pairs[0];
        assert_eq!(scalar(key), "network");
        assert_eq!(key.position, Position::new(0, 0));

        let (key, version) = &network.as_mapping().unwrap()[0];
        assert_eq!(scalar(key), "version");
        assert_eq!(key.position, Position::new(1, 2));
        assert_eq!(scalar(version), "2");
        assert_eq!(version.position, Position::new(1, 11));
    }

    #[test]
    fn block_mapping_starts_at_first_key() {
        let root = parse(b"network:\n  config: []\n  version: 2\n").unwrap();
        let (_, network) = &root.as_mapping().unwrap()[0];
        assert_eq!(network.position, Position::new(1, 2));

        let root = parse(b"config:\n  - match: {}\n    type: wifi\n").unwrap();
        let (_, config) = &root.as_mapping().unwrap()[0];
        assert_eq!(config.as_sequence().unwrap()[0].position, Position::new(1, 4));
    }

    #[test]
    fn flow_mapping_starts_at_brace() {
        let root = parse(b"network: {version: 2}\n").unwrap();
        let (_, network) = &root.as_mapping().unwrap()[0];
        assert!(network.position <= Position::new(0, 10), "{:?}", network.position);
        assert_eq!(network.position.line, 0);
    }

    #[test]
    fn mapping_order_preserved() {
        let root = parse(b"c: 1\na: 2\nb: 3\n").unwrap();
        let keys: Vec<&str> = root
            .as_mapping()
            .unwrap()
            .iter()
            .map(|(k, _)| scalar(k))
            .collect();
        assert_eq!(keys, vec!["c", "a", "b"]);
    }

    #[test]
    fn sequence_order_preserved() {
        let root = parse(b"config:\n  - type: wifi\n  - type: ethernet\n").unwrap();
        let (_, config) = &root.as_mapping().unwrap()[0];
        let items = config.as_sequence().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].position.line, 1);
        assert_eq!(items[1].position.line, 2);
    }

    #[test]
    fn dangling_key_is_a_scalar() {
        let root = parse(b"network:\n  version").unwrap();
        let (_, network) = &root.as_mapping().unwrap()[0];
        assert_eq!(scalar(network), "version");
        assert_eq!(network.position, Position::new(1, 2));
    }

    #[test]
    fn syntax_error() {
        let err = parse(b"network:\n  version: [2\n").unwrap_err();
        assert!(matches!(err, DocumentError::Syntax { .. }), "{:?}", err);
        assert!(!err.to_string().contains(" at line "), "{}", err);
    }

    #[test]
    fn invalid_utf8() {
        let err = parse(b"network:\n  ver\xffsion: 2\n").unwrap_err();
        assert_eq!(
            err.to_string(),
            "line 1 column 5: invalid UTF-8 in configuration"
        );
    }

    #[test]
    fn position_display() {
        assert_eq!(Position::new(1, 11).to_string(), "line 1 column 11");
    }
}
