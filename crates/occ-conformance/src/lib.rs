//! OCC loopback conformance harness: test-vector discovery, external
//! loopback invocation, and pass/fail reporting.
//!
//! The harness treats a directory of test-vector files as the authoritative
//! test plan. Each vector is fed to the external loopback tool (which sends
//! it to the device and checks the echoed response); the harness classifies
//! every invocation by exit status, renders a per-vector report, and returns
//! the aggregate as a value.
//!
//! Process execution is injected through the [`CommandRunner`] trait so the
//! core is testable without spawning real processes.

#![forbid(unsafe_code)]

mod harness;
mod report;
mod runner;
mod vector;

pub use harness::*;
pub use report::*;
pub use runner::*;
pub use vector::*;
