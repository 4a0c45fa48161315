//! Synthetic packet stream generation.

use std::io::Write;

use rand::RngCore;
use thiserror::Error;

use crate::das::EventDataPacket;
use crate::mps::CommandDataPacket;
use crate::packet::{PacketType, WireError};

/// Stream generation failure.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("write failed: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Wire(#[from] WireError),
}

/// Parameters for one generated stream.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Packet type to emit.
    pub packet_type: PacketType,
    /// Number of packets.
    pub count: u32,
    /// Requested payload size in bytes; must already be 4-byte aligned.
    /// For command packets 0 means no payload.
    pub size: u32,
    /// Destination node, command packets only.
    pub dest: u16,
    /// Device address, command packets only.
    pub address: u32,
}

/// Totals for a generated stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerateStats {
    /// Packets written.
    pub packets: u32,
    /// Bytes written, headers included.
    pub bytes: u64,
}

/// Emit `config.count` packets to `out` with consecutive sequence numbers.
///
/// Sequence numbers start at 0 and wrap modulo 256 in the header. Command
/// packets are sent from source node 0.
///
/// # Errors
///
/// Returns [`GenerateError::Wire`] when `config.size` violates a payload
/// constraint and [`GenerateError::Io`] on write failure; the stream is
/// truncated at the failing packet.
pub fn generate<W: Write, R: RngCore>(
    out: &mut W,
    config: &GeneratorConfig,
    rng: &mut R,
) -> Result<GenerateStats, GenerateError> {
    let mut bytes: u64 = 0;
    for sequence in 0..config.count {
        let written = match config.packet_type {
            PacketType::EventData => {
                EventDataPacket::new(sequence, config.size).write_to(out, rng)?
            }
            PacketType::CommandData => {
                let payload = if config.size > 0 {
                    let mut data = vec![0u8; config.size as usize];
                    rng.fill_bytes(&mut data);
                    Some(data)
                } else {
                    None
                };
                CommandDataPacket::new(sequence, 0, config.dest, config.address, payload)?
                    .write_to(out)?
            }
        };
        bytes += written as u64;
    }
    Ok(GenerateStats {
        packets: config.count,
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::packet::HEADER_LEN;

    #[test]
    fn command_stream_byte_count() {
        let config = GeneratorConfig {
            packet_type: PacketType::CommandData,
            count: 3,
            size: 16,
            dest: 1,
            address: 0x100,
        };
        let mut buf = Vec::new();
        let stats = generate(&mut buf, &config, &mut StdRng::seed_from_u64(1)).unwrap();
        assert_eq!(stats.packets, 3);
        assert_eq!(stats.bytes, 3 * (HEADER_LEN as u64 + 16));
        assert_eq!(buf.len() as u64, stats.bytes);
    }

    #[test]
    fn oversized_command_payload_propagates() {
        let config = GeneratorConfig {
            packet_type: PacketType::CommandData,
            count: 1,
            size: 4096,
            dest: 0,
            address: 0,
        };
        let mut buf = Vec::new();
        let err = generate(&mut buf, &config, &mut StdRng::seed_from_u64(1)).unwrap_err();
        assert!(matches!(err, GenerateError::Wire(WireError::PayloadTooLarge { .. })));
    }
}
