//! Fixture discovery and pairing
//!
//! A fixture is a file in the fixture directory ending in `.<source_extension>`; its base name is the file name with
//! that extension stripped. A fixture takes part in the run only when the golden directory holds a file with the same
//! base name and `.<expected_extension>`. Unpaired fixtures are skipped without an error or a report line; they are
//! only counted.
//!
//! Fixtures are ordered with [`natural_cmp`](super::natural::natural_cmp), so run order is deterministic and matches
//! what a human expects from numbered file names.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::config::HarnessConfig;
use super::error::HarnessError;
use super::natural::natural_cmp;

/// One test case's source input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fixture {
    /// File name without the fixture extension
    pub name: String,
    pub path: PathBuf,
}

/// A fixture with its source and golden output read in full
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixturePair {
    pub fixture: Fixture,
    pub source: String,
    pub expected: String,
}

/// Base name -> golden output path
pub type ExpectedIndex = HashMap<String, PathBuf>;

/// Paired fixtures (paths only) in run order
#[derive(Debug, Clone, Default)]
pub struct Located {
    pub pairs: Vec<(Fixture, PathBuf)>,
    pub unpaired: Vec<Fixture>,
}

/// Result of discovery: everything the run loop needs
#[derive(Debug, Clone, Default)]
pub struct Discovery {
    pub pairs: Vec<FixturePair>,
    pub unpaired: Vec<Fixture>,
}

/// Files in `dir` ending in `.<extension>`, unsorted, named by their base name.
fn list_with_extension(dir: &Path, extension: &str, kind: &'static str) -> Result<Vec<Fixture>, HarnessError> {
    let read_dir_err = |source| HarnessError::ReadDir {
        kind,
        path: dir.to_path_buf(),
        source,
    };
    let suffix = format!(".{}", extension);

    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(read_dir_err)? {
        let entry = entry.map_err(read_dir_err)?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            tracing::debug!(path = %path.display(), "skipping non UTF-8 file name");
            continue;
        };
        match file_name.strip_suffix(&suffix) {
            Some(name) if !name.is_empty() => {
                let name = name.to_string();
                files.push(Fixture { name, path });
            }
            _ => {}
        }
    }
    Ok(files)
}

/// List fixtures in natural order of their file names
pub fn list_fixtures(config: &HarnessConfig) -> Result<Vec<Fixture>, HarnessError> {
    let mut fixtures = list_with_extension(&config.fixture_dir, &config.source_extension, "fixture")?;
    fixtures.sort_by(|a, b| natural_cmp(file_name_of(&a.path), file_name_of(&b.path)));
    Ok(fixtures)
}

/// Build the golden output index
pub fn expected_index(config: &HarnessConfig) -> Result<ExpectedIndex, HarnessError> {
    let golden = list_with_extension(&config.expected_dir, &config.expected_extension, "expected-output")?;
    Ok(golden.into_iter().map(|f| (f.name, f.path)).collect())
}

fn file_name_of(path: &Path) -> &str {
    path.file_name().and_then(|n| n.to_str()).unwrap_or("")
}

/// Pair fixtures with golden outputs without reading either
pub fn locate(config: &HarnessConfig) -> Result<Located, HarnessError> {
    let fixtures = list_fixtures(config)?;
    let mut index = expected_index(config)?;

    let mut located = Located::default();
    for fixture in fixtures {
        match index.remove(&fixture.name) {
            Some(expected_path) => located.pairs.push((fixture, expected_path)),
            None => {
                tracing::debug!(fixture = %fixture.name, "no golden output, skipping");
                located.unpaired.push(fixture);
            }
        }
    }
    Ok(located)
}

fn read_text(path: &Path) -> Result<String, HarnessError> {
    fs::read_to_string(path).map_err(|source| HarnessError::ReadFile {
        path: path.to_path_buf(),
        source,
    })
}

/// Discover fixture pairs and read their source and golden text.
///
/// ## Errors
///
/// Fails when either directory cannot be listed, or when a listed file cannot be read back. Missing golden outputs
/// are not errors.
#[tracing::instrument(skip_all, fields(fixtures = %config.fixture_dir.display()))]
pub fn discover(config: &HarnessConfig) -> Result<Discovery, HarnessError> {
    let located = locate(config)?;

    let mut pairs = Vec::with_capacity(located.pairs.len());
    for (fixture, expected_path) in located.pairs {
        let source = read_text(&fixture.path)?;
        let expected = read_text(&expected_path)?;
        pairs.push(FixturePair {
            fixture,
            source,
            expected,
        });
    }

    tracing::debug!(paired = pairs.len(), unpaired = located.unpaired.len(), "discovery complete");
    Ok(Discovery {
        pairs,
        unpaired: located.unpaired,
    })
}
