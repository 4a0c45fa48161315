//! Command data ("MPS") packet encoding.

use std::io::{self, Write};

use crate::packet::{
    DATA_COMMAND_TAG, HEADER_LEN, MAX_MPS_PAYLOAD_LEN, MPS_CLASS_TAG, NO_DATA_COMMAND_TAG,
    PacketHeader, SEQUENCE_MASK, WireError,
};

/// One addressed command packet, optionally carrying a data payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandDataPacket {
    sequence: u8,
    source: u16,
    dest: u16,
    address: u32,
    payload: Option<Vec<u8>>,
}

impl CommandDataPacket {
    /// Build a command packet.
    ///
    /// An empty payload is encoded as a no-data command. Sequence values
    /// above 255 are masked, not rejected.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::PayloadTooLarge`] for payloads over 4092 bytes
    /// and [`WireError::PayloadUnaligned`] when the payload length is not a
    /// multiple of 4; the word-count field in the header must be exact and
    /// the encoder does not pad.
    pub fn new(
        sequence: u32,
        source: u16,
        dest: u16,
        address: u32,
        payload: Option<Vec<u8>>,
    ) -> Result<Self, WireError> {
        if let Some(data) = &payload {
            if data.len() > MAX_MPS_PAYLOAD_LEN {
                return Err(WireError::PayloadTooLarge {
                    len: data.len(),
                    max: MAX_MPS_PAYLOAD_LEN,
                });
            }
            if data.len() % 4 != 0 {
                return Err(WireError::PayloadUnaligned { len: data.len() });
            }
        }
        Ok(Self {
            sequence: (sequence & SEQUENCE_MASK) as u8,
            source,
            dest,
            address,
            payload: payload.filter(|data| !data.is_empty()),
        })
    }

    /// Payload length in bytes.
    #[must_use]
    pub fn payload_len(&self) -> usize {
        self.payload.as_ref().map_or(0, Vec::len)
    }

    /// Total packet length in bytes, header included.
    #[must_use]
    pub fn total_len(&self) -> usize {
        HEADER_LEN + self.payload_len()
    }

    /// The encoded header words: routing in word 2 (destination high,
    /// source low), command tag and payload word count in word 3, the
    /// device address verbatim in word 4.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn header(&self) -> PacketHeader {
        let word3 = match &self.payload {
            Some(data) => DATA_COMMAND_TAG | (data.len() as u32 / 4),
            None => NO_DATA_COMMAND_TAG,
        };
        PacketHeader {
            word0: MPS_CLASS_TAG | u32::from(self.sequence),
            length: self.total_len() as u32,
            word2: u32::from(self.dest) << 16 | u32::from(self.source),
            word3,
            word4: self.address,
        }
    }

    /// Write the header and payload bytes to `out`.
    ///
    /// Returns the number of bytes written.
    ///
    /// # Errors
    ///
    /// Propagates any write failure.
    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<usize> {
        out.write_all(&self.header().encode())?;
        if let Some(data) = &self.payload {
            out.write_all(data)?;
        }
        Ok(self.total_len())
    }
}
