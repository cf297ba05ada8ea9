use super::document::Position;
use snafu::Snafu;
use std::io;
use std::path::PathBuf;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub(crate) enum Error {
    #[snafu(display("Failed to read network config from '{}': {}", path.display(), source))]
    NetConfigReadFailed { path: PathBuf, source: io::Error },

    // The path is printed bare so the message reads `<path> line L column C: <message>`
    #[snafu(display("{} {}", path.display(), source))]
    NetConfigInvalid {
        path: PathBuf,
        source: DocumentError,
    },
}

/// A problem with the configuration document itself, located at a position in its source text.
/// Syntax and schema errors display identically; only the message text tells them apart.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub(crate) enum DocumentError {
    #[snafu(display("{}: {}", position, message))]
    Syntax { position: Position, message: String },

    #[snafu(display("{}: {}", position, message))]
    Schema { position: Position, message: String },
}

pub(crate) type Result<T> = std::result::Result<T, Error>;
