/*!
# Introduction

plandog renders a declarative network configuration into the unit files read by systemd-networkd
and udev.  It takes the path of a YAML configuration document and a root directory:

```text
plandog [--log-level <level>] <config-path> <root-dir>
```

The document looks like this:

```yaml
network:
  version: 2
  config:
    - type: ethernet
      match:
        driver: ixgbe
      set-name: lom1
      wakeonlan: true
```

Each entry under `config` is numbered by its position, starting at zero, and produces
`<root-dir>/run/systemd/network/id<N>.network`.  Entries that rename the device or turn on
wake-on-LAN also produce `id<N>.link`.  Generated files left over from an earlier run that are no
longer produced are removed; other files in the directory are left alone.

An invalid document produces no files.  The error is printed to standard error as
`<config-path> line L column C: <message>`, with lines and columns counted from zero, and plandog
exits non-zero.  Standard output is never written.
*/

#![deny(rust_2018_idioms)]

#[macro_use]
extern crate log;

mod interface_id;
mod net_config;
mod networkd;

use argh::FromArgs;
use networkd::config::{self as networkd_config, RenderedUnit};
use networkd::NetworkDConfig;
use simplelog::{Config as LogConfig, LevelFilter, WriteLogger};
use snafu::ResultExt;
use std::path::PathBuf;
use std::process;

/// Render a network configuration into systemd-networkd unit files
#[derive(FromArgs, PartialEq, Debug)]
struct Args {
    /// log-level trace|debug|info|warn|error
    #[argh(option)]
    log_level: Option<LevelFilter>,

    /// path to the network configuration document
    #[argh(positional)]
    config_path: PathBuf,

    /// directory the unit files are written below
    #[argh(positional)]
    root_dir: PathBuf,
}

// Standard output must stay empty, so all logging goes to standard error
fn setup_logger(args: &Args) -> Result<()> {
    let log_level = args.log_level.unwrap_or(LevelFilter::Warn);
    WriteLogger::init(log_level, LogConfig::default(), std::io::stderr())
        .context(error::LoggerSnafu)
}

fn run() -> Result<()> {
    let args: Args = argh::from_env();
    setup_logger(&args)?;

    let interfaces = net_config::from_path(&args.config_path).context(error::NetConfigSnafu)?;
    if interfaces.is_empty() {
        info!(
            "No interfaces in '{}', nothing to generate",
            args.config_path.display()
        );
    }

    // Render everything before writing anything, so a failure leaves no partial output
    let units: Vec<RenderedUnit> = NetworkDConfig::new(interfaces)
        .create_files()
        .iter()
        .map(|file| file.render())
        .collect();

    networkd_config::write_config_files(&units, &args.root_dir)
        .context(error::WriteConfigSnafu)?;
    Ok(())
}

// Returning a Result from main makes it print a Debug representation of the error, but with Snafu
// we have nice Display representations of the error, so we wrap "main" (run) and print any error.
// https://github.com/shepmaster/snafu/issues/110
fn main() {
    if let Err(e) = run() {
        eprintln!("{}", e);
        process::exit(1);
    }
}

/// Potential errors during plandog execution
mod error {
    use crate::{net_config, networkd};
    use snafu::Snafu;

    #[derive(Debug, Snafu)]
    #[snafu(visibility(pub(super)))]
    pub(super) enum Error {
        #[snafu(display("Failed to setup logger: {}", source))]
        Logger { source: log::SetLoggerError },

        // Already in the form `<path> line L column C: <message>`
        #[snafu(display("{}", source))]
        NetConfig { source: net_config::Error },

        #[snafu(display("Failed to write network configuration: {}", source))]
        WriteConfig { source: networkd::Error },
    }
}

type Result<T> = std::result::Result<T, error::Error>;
