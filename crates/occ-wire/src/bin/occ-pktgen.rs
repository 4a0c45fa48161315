//! Synthetic OCC packet stream generator CLI.
//!
//! Writes a stream of well-formed packets to a file for feeding into the
//! device under test.
//!
//! # Usage
//!
//! ```bash
//! # 100 event data packets with 2048-byte payloads (the defaults)
//! occ-pktgen das events.bin
//!
//! # 10 command packets addressed to node 3, register 0x200
//! occ-pktgen mps commands.bin -c 10 -d 3 -a 512
//! ```

#![forbid(unsafe_code)]

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use occ_wire::{GeneratorConfig, MAX_MPS_PAYLOAD_LEN, PacketType, generate};
use tracing::{info, warn};

/// OCC packet stream generator.
#[derive(Parser, Debug)]
#[command(name = "occ-pktgen")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Packet type.
    #[arg(value_enum, ignore_case = true)]
    kind: PacketArg,

    /// Output file.
    outfile: PathBuf,

    /// Number of packets to generate.
    #[arg(short, long, default_value_t = 100)]
    count: u32,

    /// Packet payload size in bytes, aligned up to a multiple of 4.
    #[arg(short, long, default_value_t = 2048, value_parser = parse_size)]
    size: u32,

    /// Destination node, MPS packets only.
    #[arg(short, long, default_value_t = 0)]
    dest: u16,

    /// Device address, MPS packets only.
    #[arg(short, long, default_value_t = 0)]
    address: u32,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PacketArg {
    /// Event data packets.
    Das,
    /// Command data packets.
    Mps,
}

impl From<PacketArg> for PacketType {
    fn from(kind: PacketArg) -> Self {
        match kind {
            PacketArg::Das => Self::EventData,
            PacketArg::Mps => Self::CommandData,
        }
    }
}

fn parse_size(raw: &str) -> Result<u32, String> {
    let size: u32 = raw.parse().map_err(|err| format!("invalid size: {err}"))?;
    Ok(size.saturating_add(3) / 4 * 4)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();
    let packet_type = PacketType::from(args.kind);

    // The library rejects oversized command payloads; the CLI keeps the old
    // tolerant surface by clamping.
    let mut size = args.size;
    if packet_type == PacketType::CommandData && size as usize > MAX_MPS_PAYLOAD_LEN {
        warn!(
            requested = size,
            max = MAX_MPS_PAYLOAD_LEN,
            "clamping command payload size"
        );
        size = MAX_MPS_PAYLOAD_LEN as u32;
    }

    let file = File::create(&args.outfile)
        .with_context(|| format!("cannot create {}", args.outfile.display()))?;
    let mut out = BufWriter::new(file);

    let config = GeneratorConfig {
        packet_type,
        count: args.count,
        size,
        dest: args.dest,
        address: args.address,
    };
    let stats = generate(&mut out, &config, &mut rand::thread_rng())
        .with_context(|| format!("cannot write {}", args.outfile.display()))?;
    out.flush()
        .with_context(|| format!("cannot flush {}", args.outfile.display()))?;

    info!(
        packets = stats.packets,
        bytes = stats.bytes,
        outfile = %args.outfile.display(),
        "stream written"
    );
    Ok(())
}
