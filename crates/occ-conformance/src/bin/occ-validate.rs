//! OCC loopback conformance driver CLI.
//!
//! Feeds every test vector in a directory to the external loopback tool and
//! reports pass/fail per vector.
//!
//! # Usage
//!
//! ```bash
//! # Run the vector pack in ./loopback against the default device
//! occ-validate
//!
//! # Three repeats per vector on a different device, verbose
//! occ-validate -d /dev/snsocc1 -r 3 -v
//!
//! # Machine-readable report
//! occ-validate --dir vectors --exe ./occ_loopback --json
//! ```

#![forbid(unsafe_code)]

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use chrono::Utc;
use clap::Parser;
use occ_conformance::{
    DEFAULT_DEVICE, DEFAULT_VECTOR_DIR, HarnessConfig, HarnessError, HarnessReport,
    LoopbackRunner, Reporter, VECTOR_SUFFIX, run_vectors,
};
use serde_json::json;

/// OCC loopback conformance driver.
///
/// Treats a directory of test-vector files as the test plan, executes each
/// against the loopback tool, and reports pass/fail.
#[derive(Parser, Debug)]
#[command(name = "occ-validate")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Also render the tool's stdout for passing vectors.
    #[arg(short, long, default_value_t = false)]
    verbose: bool,

    /// Target device path.
    #[arg(short, long, default_value = DEFAULT_DEVICE)]
    device: String,

    /// Invocations per vector.
    #[arg(short, long, default_value_t = 1)]
    repeat: u32,

    /// Test-vector directory.
    #[arg(long, default_value = DEFAULT_VECTOR_DIR)]
    dir: PathBuf,

    /// Vector file suffix.
    #[arg(long, default_value = VECTOR_SUFFIX)]
    suffix: String,

    /// Loopback executable to invoke.
    #[arg(long, default_value = "occ_loopback")]
    exe: PathBuf,

    /// Kill an invocation after this many seconds.
    #[arg(long)]
    timeout: Option<u64>,

    /// Print the vector pack's README and exit.
    #[arg(long, default_value_t = false)]
    readme: bool,

    /// Emit the report as JSON on stdout instead of the human report.
    #[arg(long, default_value_t = false)]
    json: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();

    if args.readme {
        let path = args.dir.join("README");
        return match std::fs::read_to_string(&path) {
            Ok(text) => {
                print!("{text}");
                ExitCode::SUCCESS
            }
            Err(err) => {
                eprintln!("cannot read {}: {err}", path.display());
                ExitCode::from(2)
            }
        };
    }

    let config = HarnessConfig {
        vector_dir: args.dir.clone(),
        suffix: args.suffix.clone(),
        repeat: args.repeat,
    };
    let mut runner = LoopbackRunner::new(args.exe.clone(), args.device.clone())
        .with_timeout(args.timeout.map(Duration::from_secs));

    // In JSON mode stdout carries only the JSON document.
    let result = if args.json {
        run_vectors(&config, &mut runner, &mut Reporter::new(io::sink(), args.verbose))
    } else {
        run_vectors(
            &config,
            &mut runner,
            &mut Reporter::new(io::stdout().lock(), args.verbose),
        )
    };

    let report = match result {
        Ok(report) => report,
        Err(err @ HarnessError::Discover { .. }) => {
            eprintln!("{err}");
            return ExitCode::from(2);
        }
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };

    if args.json {
        return print_json(&args, &report);
    }

    ExitCode::SUCCESS
}

fn print_json(args: &Args, report: &HarnessReport) -> ExitCode {
    let output = json!({
        "timestamp": Utc::now().to_rfc3339(),
        "vector_dir": args.dir.display().to_string(),
        "device": args.device,
        "repeat": args.repeat,
        "report": report,
    });
    match serde_json::to_string_pretty(&output) {
        Ok(text) => {
            println!("{text}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("cannot encode report: {err}");
            ExitCode::FAILURE
        }
    }
}
