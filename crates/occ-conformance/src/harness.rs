//! Run orchestration: discover, invoke, classify, report.

use std::io::{self, Write};
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::report::{Reporter, RunSummary};
use crate::runner::{CommandRunner, Outcome};
use crate::vector::{DEFAULT_VECTOR_DIR, VECTOR_SUFFIX, VectorKind, discover};

/// Fatal harness failures.
///
/// Per-vector invocation failures are never fatal; they only show up in the
/// report and the summary counters.
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("cannot read vector directory {path}: {source}")]
    Discover {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot write report: {0}")]
    Report(#[from] io::Error),
}

/// Parameters for one harness run.
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    /// Directory holding the test vectors.
    pub vector_dir: PathBuf,
    /// Vector file suffix.
    pub suffix: String,
    /// Invocations per vector.
    pub repeat: u32,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            vector_dir: PathBuf::from(DEFAULT_VECTOR_DIR),
            suffix: VECTOR_SUFFIX.to_string(),
            repeat: 1,
        }
    }
}

/// Everything one vector contributed to a run.
#[derive(Debug, Clone, Serialize)]
pub struct VectorRecord {
    pub name: String,
    pub kind: VectorKind,
    /// One outcome per repeat iteration.
    pub outcomes: Vec<Outcome>,
}

/// Aggregate result of one harness run.
#[derive(Debug, Clone, Serialize)]
pub struct HarnessReport {
    pub vectors: Vec<VectorRecord>,
    pub summary: RunSummary,
}

/// Drive every vector in `config.vector_dir` through `runner`, writing the
/// human report to `reporter` as results arrive.
///
/// Vectors run strictly sequentially, `config.repeat` invocations each,
/// one child process at a time; output ordering and counters are therefore
/// stable. A failing invocation never aborts the run.
///
/// # Errors
///
/// Only discovery and report-writing failures are fatal.
pub fn run_vectors<R: CommandRunner, W: Write>(
    config: &HarnessConfig,
    runner: &mut R,
    reporter: &mut Reporter<W>,
) -> Result<HarnessReport, HarnessError> {
    let vectors = discover(&config.vector_dir, &config.suffix)?;
    debug!(
        count = vectors.len(),
        dir = %config.vector_dir.display(),
        "vectors discovered"
    );

    let mut summary = RunSummary::default();
    let mut records = Vec::with_capacity(vectors.len());
    for vector in &vectors {
        let mut outcomes = Vec::with_capacity(config.repeat as usize);
        for _ in 0..config.repeat {
            let record = runner.run(vector);
            summary.record(record.outcome);
            reporter.record(&vector.name, &record)?;
            outcomes.push(record.outcome);
        }
        records.push(VectorRecord {
            name: vector.name.clone(),
            kind: vector.kind,
            outcomes,
        });
    }

    reporter.summary(&summary)?;
    Ok(HarnessReport {
        vectors: records,
        summary,
    })
}
