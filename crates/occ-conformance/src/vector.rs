//! Test-vector discovery.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::harness::HarnessError;

/// Default test-vector directory.
pub const DEFAULT_VECTOR_DIR: &str = "loopback";

/// Default file suffix marking loopback test vectors.
pub const VECTOR_SUFFIX: &str = ".vlt";

/// File-name marker for raw-mode vectors.
pub const RAW_MARKER: &str = "raw";

/// How the loopback tool should treat a vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VectorKind {
    /// Regular vector, replayed as-is.
    Ordinary,
    /// Raw-mode vector; the loopback tool is invoked with an extra `-r`.
    Raw,
}

/// One test-vector file, discovered once per run and immutable thereafter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestVector {
    /// File name within the vector directory.
    pub name: String,
    /// Full path handed to the loopback tool.
    pub path: PathBuf,
    /// Ordinary or raw-mode, inferred from the file name.
    pub kind: VectorKind,
}

impl TestVector {
    /// Build a vector from a directory entry name, filtering on `suffix`.
    ///
    /// Returns `None` for entries that are not test vectors; those files
    /// are ignored entirely and never reach the loopback tool.
    #[must_use]
    pub fn from_dir_entry(dir: &Path, name: &str, suffix: &str) -> Option<Self> {
        if !name.ends_with(suffix) {
            return None;
        }
        let kind = if name.contains(RAW_MARKER) {
            VectorKind::Raw
        } else {
            VectorKind::Ordinary
        };
        Some(Self {
            name: name.to_string(),
            path: dir.join(name),
            kind,
        })
    }
}

/// Enumerate the test vectors in `dir`.
///
/// Ordering is filesystem-enumeration order, not sorted; callers must not
/// rely on it.
///
/// # Errors
///
/// Returns [`HarnessError::Discover`] when the directory cannot be read.
pub fn discover(dir: &Path, suffix: &str) -> Result<Vec<TestVector>, HarnessError> {
    let entries = fs::read_dir(dir).map_err(|source| HarnessError::Discover {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut vectors = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| HarnessError::Discover {
            path: dir.to_path_buf(),
            source,
        })?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if let Some(vector) = TestVector::from_dir_entry(dir, &name, suffix) {
            vectors.push(vector);
        }
    }
    Ok(vectors)
}
