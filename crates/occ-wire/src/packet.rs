//! OCC packet header encoding and decoding.
//!
//! Every packet exchanged with the OCC starts with five 32-bit
//! little-endian words:
//!
//! ```text
//! OCC PACKET FORMAT
//!
//!   Bytes 0-3:   Word 0 (u32 LE): class tag | (sequence & 0xFF)
//!   Bytes 4-7:   Word 1 (u32 LE): total packet length in bytes
//!   Bytes 8-11:  Word 2 (u32 LE): routing, or event flags | event count
//!   Bytes 12-15: Word 3 (u32 LE): command tag | word count, or timestamp sec
//!   Bytes 16-19: Word 4 (u32 LE): device address, or timestamp nsec
//!   Bytes 20+:   Payload (length = word 1 - 20)
//!
//!   Fixed header: 20 bytes
//! ```
//!
//! There is no checksum and no delimiter; readers advance through a stream
//! by summing the word 1 length fields. Word 1 is always at least 20 and a
//! multiple of 4. The packet type discriminant lives in the high bits of
//! word 0; the low 8 bits carry a wrapping sequence counter.

use thiserror::Error;

/// Fixed header length in bytes (five 32-bit words).
pub const HEADER_LEN: usize = 20;

/// Word 0 class tag for event data ("DAS") packets.
pub const DAS_CLASS_TAG: u32 = 0x1070_0000;

/// Word 0 class tag for command data ("MPS") packets.
pub const MPS_CLASS_TAG: u32 = 0x1180_0000;

/// Word 3 tag for a command carrying data, OR'd with the payload word count.
pub const DATA_COMMAND_TAG: u32 = 0x2200_0000;

/// Word 3 tag for a command with no payload.
pub const NO_DATA_COMMAND_TAG: u32 = 0x0200_0000;

/// Word 2 flags for event data packets, OR'd with the event count.
pub const EVENT_FLAGS: u32 = 0x0002_0000;

/// Size of one event record in an event data payload.
pub const EVENT_RECORD_LEN: usize = 8;

/// Maximum events in a single packet (the count field is 16 bits).
pub const MAX_EVENTS: u32 = 65_535;

/// Maximum command payload length in bytes.
pub const MAX_MPS_PAYLOAD_LEN: usize = 4092;

/// Mask covering the sequence counter in word 0.
pub const SEQUENCE_MASK: u32 = 0xFF;

/// Wire format encoding and decoding errors.
#[derive(Debug, Error)]
pub enum WireError {
    #[error("payload too large (len {len}, max {max})")]
    PayloadTooLarge { len: usize, max: usize },

    #[error("payload length {len} is not a multiple of 4")]
    PayloadUnaligned { len: usize },

    #[error("header too short (len {len}, min {min})")]
    TruncatedHeader { len: usize, min: usize },

    #[error("unknown class tag in word 0 ({word0:#010x})")]
    UnknownClassTag { word0: u32 },

    #[error("bad packet length {len} (must be >= 20 and a multiple of 4)")]
    BadLength { len: u32 },
}

/// Packet type, carried in the high bits of word 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketType {
    /// Batch of fixed-size event records plus a timestamp ("DAS").
    EventData,
    /// Addressed command, optionally carrying a data payload ("MPS").
    CommandData,
}

impl PacketType {
    /// The word 0 class tag for this type.
    #[must_use]
    pub const fn class_tag(self) -> u32 {
        match self {
            Self::EventData => DAS_CLASS_TAG,
            Self::CommandData => MPS_CLASS_TAG,
        }
    }

    /// Recover the type from word 0 by masking off the sequence byte.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::UnknownClassTag`] for unrecognized tags.
    pub fn from_word0(word0: u32) -> Result<Self, WireError> {
        match word0 & !SEQUENCE_MASK {
            DAS_CLASS_TAG => Ok(Self::EventData),
            MPS_CLASS_TAG => Ok(Self::CommandData),
            _ => Err(WireError::UnknownClassTag { word0 }),
        }
    }
}

/// The five raw header words of one packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketHeader {
    /// Class tag | sequence.
    pub word0: u32,
    /// Total packet length in bytes, header included.
    pub length: u32,
    /// Type-specific: routing, or event flags | count.
    pub word2: u32,
    /// Type-specific: command tag | word count, or timestamp seconds.
    pub word3: u32,
    /// Type-specific: device address, or timestamp nanoseconds.
    pub word4: u32,
}

impl PacketHeader {
    /// Encode the header to bytes (little endian).
    #[must_use]
    pub fn encode(&self) -> [u8; HEADER_LEN] {
        let mut buf = [0u8; HEADER_LEN];
        buf[0..4].copy_from_slice(&self.word0.to_le_bytes());
        buf[4..8].copy_from_slice(&self.length.to_le_bytes());
        buf[8..12].copy_from_slice(&self.word2.to_le_bytes());
        buf[12..16].copy_from_slice(&self.word3.to_le_bytes());
        buf[16..20].copy_from_slice(&self.word4.to_le_bytes());
        buf
    }

    /// Decode a header from the start of `bytes`.
    ///
    /// # Errors
    ///
    /// Returns `WireError` when the buffer is shorter than a header, the
    /// class tag is unknown, or the length field violates the format
    /// invariants.
    pub fn decode(bytes: &[u8]) -> Result<Self, WireError> {
        if bytes.len() < HEADER_LEN {
            return Err(WireError::TruncatedHeader {
                len: bytes.len(),
                min: HEADER_LEN,
            });
        }

        let word = |i: usize| u32::from_le_bytes([bytes[i], bytes[i + 1], bytes[i + 2], bytes[i + 3]]);
        let header = Self {
            word0: word(0),
            length: word(4),
            word2: word(8),
            word3: word(12),
            word4: word(16),
        };

        PacketType::from_word0(header.word0)?;
        if header.length < HEADER_LEN as u32 || header.length % 4 != 0 {
            return Err(WireError::BadLength { len: header.length });
        }

        Ok(header)
    }

    /// Packet type recovered from the word 0 class tag.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::UnknownClassTag`] for unrecognized tags.
    pub fn packet_type(&self) -> Result<PacketType, WireError> {
        PacketType::from_word0(self.word0)
    }

    /// Sequence counter from the low byte of word 0.
    #[must_use]
    pub fn sequence(&self) -> u8 {
        (self.word0 & SEQUENCE_MASK) as u8
    }

    /// Total packet length in bytes, header included.
    #[must_use]
    pub fn total_len(&self) -> usize {
        self.length as usize
    }

    /// Payload length in bytes.
    #[must_use]
    pub fn payload_len(&self) -> usize {
        self.total_len().saturating_sub(HEADER_LEN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_encode_decode_roundtrip() {
        let original = PacketHeader {
            word0: DAS_CLASS_TAG | 0x2A,
            length: 36,
            word2: EVENT_FLAGS | 2,
            word3: 1_700_000_000,
            word4: 987_654_321,
        };
        let decoded = PacketHeader::decode(&original.encode()).unwrap();
        assert_eq!(original, decoded);
        assert_eq!(decoded.sequence(), 0x2A);
        assert_eq!(decoded.payload_len(), 16);
    }

    #[test]
    fn decode_too_short_buffer() {
        let buf = [0u8; HEADER_LEN - 1];
        assert!(matches!(
            PacketHeader::decode(&buf),
            Err(WireError::TruncatedHeader { len: 19, min: HEADER_LEN })
        ));
    }

    #[test]
    fn decode_rejects_unknown_class_tag() {
        let header = PacketHeader {
            word0: 0x5500_0001,
            length: 20,
            word2: 0,
            word3: 0,
            word4: 0,
        };
        assert!(matches!(
            PacketHeader::decode(&header.encode()),
            Err(WireError::UnknownClassTag { word0: 0x5500_0001 })
        ));
    }

    #[test]
    fn decode_rejects_bad_lengths() {
        for bad in [0u32, 19, 21, 22] {
            let header = PacketHeader {
                word0: MPS_CLASS_TAG,
                length: bad,
                word2: 0,
                word3: NO_DATA_COMMAND_TAG,
                word4: 0,
            };
            assert!(
                matches!(PacketHeader::decode(&header.encode()), Err(WireError::BadLength { .. })),
                "length {bad} accepted"
            );
        }
    }

    #[test]
    fn packet_type_from_word0_ignores_sequence() {
        for seq in [0u32, 1, 0x7F, 0xFF] {
            assert_eq!(
                PacketType::from_word0(DAS_CLASS_TAG | seq).unwrap(),
                PacketType::EventData
            );
            assert_eq!(
                PacketType::from_word0(MPS_CLASS_TAG | seq).unwrap(),
                PacketType::CommandData
            );
        }
    }
}
