//! The net_config module reads a network configuration document and turns it into the ordered
//! list of interface definitions the renderer works from.
//!
//! Reading happens in three steps: the raw bytes are parsed into a generic tree that remembers
//! where every node came from (`document`), the tree is validated against the schema for its
//! version (`v2`), and the validated entries are numbered into `InterfaceDef`s (`interface`).
mod document;
mod error;
mod interface;
mod v2;

pub(crate) use error::{DocumentError, Error, Result};
pub(crate) use interface::{InterfaceDef, MatchKey};
#[cfg(test)]
pub(crate) use interface::{DeviceType, Matches};
use snafu::ResultExt;
use std::fs;
use std::path::Path;

/// Read the network config from file and build its interface definitions
pub(crate) fn from_path<P>(path: P) -> Result<Vec<InterfaceDef>>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let bytes = fs::read(path).context(error::NetConfigReadFailedSnafu { path })?;
    from_bytes(&bytes).context(error::NetConfigInvalidSnafu { path })
}

/// Parse, validate and build interface definitions from the contents of a config file
pub(crate) fn from_bytes(bytes: &[u8]) -> std::result::Result<Vec<InterfaceDef>, DocumentError> {
    let root = document::parse(bytes)?;
    let config = v2::validate(&root)?;
    debug!(
        "Network config version {} has {} interface(s)",
        config.version,
        config.interfaces.len()
    );
    Ok(interface::build(config))
}
