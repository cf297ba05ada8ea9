//! Run the plandog binary against small configuration documents and check what it leaves behind.
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

const NETWORKD_DIR: &str = "run/systemd/network";

struct Workdir {
    dir: TempDir,
}

impl Workdir {
    fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    fn root(&self) -> &Path {
        self.dir.path()
    }

    fn config(&self) -> PathBuf {
        self.root().join("config")
    }

    fn networkd_dir(&self) -> PathBuf {
        self.root().join(NETWORKD_DIR)
    }

    /// Run plandog with `yaml` as its configuration, returning its standard error.  Standard
    /// output must always be empty.
    fn generate(&self, yaml: &str, expect_fail: bool) -> String {
        fs::write(self.config(), yaml).unwrap();
        let Output {
            status,
            stdout,
            stderr,
        } = Command::new(env!("CARGO_BIN_EXE_plandog"))
            .arg(self.config())
            .arg(self.root())
            .output()
            .unwrap();

        let stderr = String::from_utf8(stderr).unwrap();
        if expect_fail {
            assert!(!status.success(), "plandog unexpectedly succeeded");
        } else {
            assert!(status.success(), "plandog failed: {}", stderr);
        }
        assert_eq!(String::from_utf8(stdout).unwrap(), "");
        stderr
    }

    fn listing(&self, dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    /// The root holds only the config and `run`, and the networkd directory holds exactly `files`
    fn assert_networkd(&self, files: &[(&str, &str)]) {
        assert_eq!(self.listing(self.root()), vec!["config", "run"]);

        let mut expected: Vec<&str> = files.iter().map(|(name, _)| *name).collect();
        expected.sort();
        assert_eq!(self.listing(&self.networkd_dir()), expected);

        for (name, contents) in files {
            let path = self.networkd_dir().join(name);
            assert_eq!(
                fs::read_to_string(&path).unwrap(),
                *contents,
                "{}",
                path.display()
            );
        }
    }
}

#[test]
fn no_configs() {
    let w = Workdir::new();
    w.generate("network:\n  version: 2", false);
    // Nothing is written, not even the directory
    assert_eq!(w.listing(w.root()), vec!["config"]);
}

#[test]
fn no_matches() {
    let w = Workdir::new();
    w.generate(
        "network:
  version: 2
  config:
    - type: ethernet",
        false,
    );
    w.assert_networkd(&[("id0.network", "[Match]\n\n[Network]\n")]);
}

#[test]
fn eth_match_by_driver_rename() {
    let w = Workdir::new();
    w.generate(
        "network:
  version: 2
  config:
    - type: ethernet
      set-name: lom1
      match:
        driver: ixgbe
      wakeonlan: true",
        false,
    );
    w.assert_networkd(&[
        (
            "id0.link",
            "[Match]\nDriver=ixgbe\n\n[Link]\nName=lom1\nWakeOnLan=magic\n",
        ),
        ("id0.network", "[Match]\nDriver=ixgbe\n\n[Network]\n"),
    ]);
}

#[test]
fn multiple_interfaces() {
    let w = Workdir::new();
    w.generate(
        "network:
  version: 2
  config:
    - type: wifi
      match:
        name: wlp2s0
    - type: ethernet
      match:
        macaddress: 52:54:00:79:99:c6
      set-name: eth-mgmt
    - type: bridge
      wakeonlan: false",
        false,
    );
    w.assert_networkd(&[
        ("id0.network", "[Match]\nOriginalName=wlp2s0\n\n[Network]\n"),
        (
            "id1.network",
            "[Match]\nMACAddress=52:54:00:79:99:c6\n\n[Network]\n",
        ),
        (
            "id1.link",
            "[Match]\nMACAddress=52:54:00:79:99:c6\n\n[Link]\nName=eth-mgmt\n",
        ),
        ("id2.network", "[Match]\n\n[Network]\n"),
    ]);
}

#[test]
fn malformed_yaml() {
    let w = Workdir::new();
    let err = w.generate("network:\n  version", true);
    assert!(
        err.contains("/config line 1 column 2: expected mapping"),
        "{}",
        err
    );
    assert_eq!(w.listing(w.root()), vec!["config"]);
}

#[test]
fn invalid_version() {
    let w = Workdir::new();
    let err = w.generate("network:\n  version: 1", true);
    assert!(
        err.contains("/config line 1 column 11: Only version 2 is supported"),
        "{}",
        err
    );
}

#[test]
fn error_is_single_line() {
    let w = Workdir::new();
    let err = w.generate(
        "network:\n  version: 2\n  config:\n    - type: token-ring",
        true,
    );
    assert_eq!(
        err,
        format!(
            "{} line 3 column 12: unknown interface type 'token-ring'\n",
            w.config().display()
        )
    );
}

#[test]
fn null_set_name_is_rejected() {
    let w = Workdir::new();
    let err = w.generate(
        "network:\n  version: 2\n  config:\n    - type: ethernet\n      set-name: ~",
        true,
    );
    assert_eq!(
        err,
        format!(
            "{} line 4 column 6: expected value for 'set-name'\n",
            w.config().display()
        )
    );
    assert_eq!(w.listing(w.root()), vec!["config"]);
}

#[test]
fn invalid_document_leaves_previous_output() {
    let w = Workdir::new();
    w.generate("network:\n  version: 2\n  config:\n    - type: ethernet", false);
    w.generate("network:\n  version: 2\n  config:\n    - type: ethernet\n      mtu: 1", true);
    w.assert_networkd(&[("id0.network", "[Match]\n\n[Network]\n")]);
}

#[test]
fn rerun_is_idempotent() {
    let w = Workdir::new();
    let yaml = "network:
  version: 2
  config:
    - type: ethernet
      set-name: lom1
      match:
        driver: ixgbe";
    w.generate(yaml, false);
    let first: Vec<(String, String)> = w
        .listing(&w.networkd_dir())
        .into_iter()
        .map(|name| {
            let contents = fs::read_to_string(w.networkd_dir().join(&name)).unwrap();
            (name, contents)
        })
        .collect();

    w.generate(yaml, false);
    let files: Vec<(&str, &str)> = first
        .iter()
        .map(|(name, contents)| (name.as_str(), contents.as_str()))
        .collect();
    w.assert_networkd(&files);
}

#[test]
fn rerun_removes_stale_units() {
    let w = Workdir::new();
    w.generate(
        "network:
  version: 2
  config:
    - type: ethernet
    - type: ethernet
      set-name: lom1",
        false,
    );
    // A file plandog did not generate survives regeneration
    fs::write(w.networkd_dir().join("99-local.network"), "[Match]\n").unwrap();

    w.generate("network:\n  version: 2\n  config:\n    - type: wifi", false);
    w.assert_networkd(&[
        ("99-local.network", "[Match]\n"),
        ("id0.network", "[Match]\n\n[Network]\n"),
    ]);

    w.generate("network:\n  version: 2", false);
    w.assert_networkd(&[("99-local.network", "[Match]\n")]);
}

#[test]
fn missing_config_file() {
    let w = Workdir::new();
    let output = Command::new(env!("CARGO_BIN_EXE_plandog"))
        .arg(w.root().join("nope"))
        .arg(w.root())
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to read network config"));
}
