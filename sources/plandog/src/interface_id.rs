//! The interface_id module contains the identifiers used for interface definitions: the synthetic
//! `id<N>` identifier assigned to each definition, and validated newtypes for a network interface
//! name and a MAC address.
//!
//! A valid network interface name is defined by the criteria in the linux kernel:
//! https://elixir.bootlin.com/linux/v5.10.102/source/net/core/dev.c#L1138
use snafu::ensure;
use std::fmt::Display;
use std::ops::Deref;

/// The identifier of an interface definition, derived only from its position in the `config`
/// sequence.  It names the generated unit files, e.g. `id0.network`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub(crate) struct InterfaceId {
    index: usize,
}

impl InterfaceId {
    pub(crate) fn new(index: usize) -> Self {
        Self { index }
    }
}

impl Display for InterfaceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "id{}", self.index)
    }
}

/// MacAddress can only be created from a string of six two-digit hex octets separated by `:` or
/// `-`.  The original spelling is kept, since networkd accepts both separators and either case.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub(crate) struct MacAddress {
    inner: String,
}

impl TryFrom<&str> for MacAddress {
    type Error = error::Error;

    fn try_from(input: &str) -> Result<Self> {
        let mut octets = 0;

        for octet in input.split(|b| b == '-' || b == ':') {
            // If we've gotten to 6 and are still iterating, the MAC is too long
            ensure!(
                octets != 6 && octet.len() == 2,
                error::InvalidMacAddressSnafu {
                    input,
                    msg: "must have 6 octets of 2 chars/digits"
                }
            );

            ensure!(
                octet.chars().all(|c| c.is_ascii_hexdigit()),
                error::InvalidMacAddressSnafu {
                    input,
                    msg: "invalid character/digit"
                }
            );

            octets += 1;
        }

        ensure!(
            octets == 6,
            error::InvalidMacAddressSnafu {
                input,
                msg: "must have 6 octets"
            }
        );

        Ok(MacAddress {
            inner: input.to_string(),
        })
    }
}

impl Deref for MacAddress {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl Display for MacAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

/// InterfaceName can only be created from a string that contains a valid network interface name.
/// Validation is handled in the `TryFrom` implementation below.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub(crate) struct InterfaceName {
    inner: String,
}

impl TryFrom<&str> for InterfaceName {
    type Error = error::Error;

    fn try_from(input: &str) -> Result<Self> {
        // Rust does not treat all Unicode line terminators as starting a new line, so we check for
        // specific characters here, rather than just counting from lines().
        // https://en.wikipedia.org/wiki/Newline#Unicode
        let line_terminators = [
            '\n',       // newline (0A)
            '\r',       // carriage return (0D)
            '\u{000B}', // vertical tab
            '\u{000C}', // form feed
            '\u{0085}', // next line
            '\u{2028}', // line separator
            '\u{2029}', // paragraph separator
        ];

        ensure!(
            !input.contains(&line_terminators[..]),
            error::InvalidNetworkDeviceNameSnafu {
                input,
                msg: "contains line terminators"
            }
        );

        // A name must be 1-15 bytes; IFNAMSIZ (16) counts the trailing NUL.
        // https://elixir.bootlin.com/linux/v5.10.102/source/include/uapi/linux/if.h#L33
        ensure!(
            !input.is_empty() && input.len() <= 15,
            error::InvalidNetworkDeviceNameSnafu {
                input,
                msg: "invalid length, must be 1 to 15 characters long"
            }
        );

        ensure!(
            input != "." && input != "..",
            error::InvalidNetworkDeviceNameSnafu {
                input,
                msg: "reserved name"
            }
        );

        ensure!(
            !input.contains(['/', ':']) && !input.contains(char::is_whitespace),
            error::InvalidNetworkDeviceNameSnafu {
                input,
                msg: "contains invalid characters"
            }
        );

        Ok(Self {
            inner: input.to_string(),
        })
    }
}

impl Deref for InterfaceName {
    type Target = str;
    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl Display for InterfaceName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

mod error {
    use snafu::Snafu;

    #[derive(Debug, Snafu)]
    #[snafu(visibility(pub(crate)))]
    #[allow(clippy::enum_variant_names)]
    pub(crate) enum Error {
        #[snafu(display("invalid interface name '{}': {}", input, msg))]
        InvalidNetworkDeviceName { input: String, msg: String },

        #[snafu(display("invalid MAC address '{}': {}", input, msg))]
        InvalidMacAddress { input: String, msg: String },
    }
}

type Result<T> = std::result::Result<T, error::Error>;
