//! Shared fixtures for the pipeline tests
//!
//! The fake toolchain is a pair of shell scripts:
//!
//! - `calc` reads one arithmetic expression on stdin and emits `WRITE <value>`; a few magic inputs make it hang
//!   (directly, behind a child `sleep`, or by leaving a background process on its stdout), print nothing, or exit
//!   non-zero.
//! - `vm` prints the operand of every `WRITE` line of the assembly file it is given, and hangs on `HANG`.
//!
//! Scripts are written once, before any test spawns a child, so no forked child can still hold a write handle to
//! an executable we are about to run (ETXTBSY).

#![allow(dead_code)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

use goldrun::harness::{FixtureOutcome, FixturePair, Reporter, RunSummary, Verdict};
use goldrun::HarnessConfig;
use tempfile::TempDir;

const CALC: &str = r#"#!/bin/sh
read expr
case "$expr" in
  hang) exec sleep 30 ;;
  nested) sleep 30; echo "WRITE 0"; exit 0 ;;
  linger) sleep 30 & echo "WRITE 1"; exit 0 ;;
  spin) echo "HANG"; exit 0 ;;
  silent) exit 0 ;;
  fail) echo "WRITE 0"; echo "syntax error" >&2; exit 2 ;;
esac
echo "WRITE $(($expr))"
"#;

const VM: &str = r#"#!/bin/sh
if grep -q '^HANG' "$1"; then exec sleep 30; fi
sed -n 's/^WRITE //p' "$1"
"#;

/// Same as `VM` but without the trailing newline
const VM_EXACT: &str = r#"#!/bin/sh
printf '%s' "$(sed -n 's/^WRITE //p' "$1")"
"#;

pub struct Toolchain {
    _dir: TempDir,
    pub calc: PathBuf,
    pub vm: PathBuf,
    pub vm_exact: PathBuf,
    /// Present but not executable
    pub vm_locked: PathBuf,
}

fn write_script(dir: &Path, name: &str, body: &str, mode: u32) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, body).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(mode)).unwrap();
    path
}

pub fn toolchain() -> &'static Toolchain {
    static TOOLCHAIN: OnceLock<Toolchain> = OnceLock::new();
    TOOLCHAIN.get_or_init(|| {
        let dir = tempfile::tempdir().unwrap();
        let calc = write_script(dir.path(), "calc", CALC, 0o755);
        let vm = write_script(dir.path(), "vm", VM, 0o755);
        let vm_exact = write_script(dir.path(), "vm_exact", VM_EXACT, 0o755);
        let vm_locked = write_script(dir.path(), "vm_locked", VM, 0o644);
        Toolchain {
            _dir: dir,
            calc,
            vm,
            vm_exact,
            vm_locked,
        }
    })
}

/// A fixture tree plus a private scratch dir for assembly files
pub struct Suite {
    pub root: TempDir,
    pub config: HarnessConfig,
}

impl Suite {
    pub fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        let tests = root.path().join("test_all");
        let expected = root.path().join("expected_out");
        let scratch = root.path().join("scratch");
        for dir in [&tests, &expected, &scratch] {
            fs::create_dir(dir).unwrap();
        }

        let tools = toolchain();
        let config = HarnessConfig::new()
            .with_compiler(&tools.calc)
            .with_interpreter(&tools.vm)
            .with_dirs(&tests, &expected)
            .with_timeout(Duration::from_millis(750))
            .with_scratch_dir(&scratch);
        Self { root, config }
    }

    pub fn fixture(&self, name: &str, source: &str) -> &Self {
        fs::write(self.config.fixture_dir.join(format!("{name}.swift")), source).unwrap();
        self
    }

    pub fn golden(&self, name: &str, expected: &str) -> &Self {
        fs::write(self.config.expected_dir.join(format!("{name}.out")), expected).unwrap();
        self
    }

    pub fn case(&self, name: &str, source: &str, expected: &str) -> &Self {
        self.fixture(name, source).golden(name, expected)
    }

    /// Entries left in the scratch dir
    pub fn leftovers(&self) -> Vec<PathBuf> {
        let scratch = self.config.scratch_dir().unwrap();
        fs::read_dir(scratch).unwrap().map(|e| e.unwrap().path()).collect()
    }
}

/// Reporter that keeps everything it is told
#[derive(Default)]
pub struct Collector {
    pub collected: Option<(usize, usize)>,
    pub verdicts: Vec<(String, Verdict)>,
    pub summary: Option<RunSummary>,
}

impl Collector {
    pub fn names(&self) -> Vec<&str> {
        self.verdicts.iter().map(|(n, _)| n.as_str()).collect()
    }

    pub fn verdict(&self, name: &str) -> &Verdict {
        &self
            .verdicts
            .iter()
            .find(|(n, _)| n == name)
            .unwrap_or_else(|| panic!("no verdict for {name}"))
            .1
    }
}

impl Reporter for Collector {
    fn on_collection_complete(&mut self, collected: usize, unpaired: usize) {
        self.collected = Some((collected, unpaired));
    }

    fn on_fixture_complete(&mut self, pair: &FixturePair, outcome: &FixtureOutcome) {
        self.verdicts.push((pair.fixture.name.clone(), outcome.verdict.clone()));
    }

    fn on_run_complete(&mut self, summary: &RunSummary) {
        self.summary = Some(summary.clone());
    }
}
