//! Event data ("DAS") packet encoding.

use std::io::{self, Write};
use std::time::{SystemTime, UNIX_EPOCH};

use rand::RngCore;

use crate::packet::{
    DAS_CLASS_TAG, EVENT_FLAGS, EVENT_RECORD_LEN, HEADER_LEN, MAX_EVENTS, PacketHeader,
    SEQUENCE_MASK,
};

/// One synthetic event data packet.
///
/// The payload is `nevents` fixed-size records of random filler standing in
/// for real detector events; the header carries the wall-clock time the
/// packet was built at, split into whole seconds and the nanosecond
/// remainder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventDataPacket {
    sequence: u8,
    nevents: u16,
    timestamp_sec: u32,
    timestamp_nsec: u32,
}

impl EventDataPacket {
    /// Build a packet sized for `requested_size` payload bytes, stamped with
    /// the current system clock.
    ///
    /// The event count is `requested_size / 8`, capped at 65535, so the
    /// payload is always a multiple of 8 bytes and never exceeds 524,280.
    /// Sequence values above 255 are masked, not rejected.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn new(sequence: u32, requested_size: u32) -> Self {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        Self::with_timestamp(
            sequence,
            requested_size,
            now.as_secs() as u32,
            now.subsec_nanos(),
        )
    }

    /// Like [`EventDataPacket::new`] with an explicit timestamp.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn with_timestamp(
        sequence: u32,
        requested_size: u32,
        timestamp_sec: u32,
        timestamp_nsec: u32,
    ) -> Self {
        let nevents = (requested_size / EVENT_RECORD_LEN as u32).min(MAX_EVENTS) as u16;
        Self {
            sequence: (sequence & SEQUENCE_MASK) as u8,
            nevents,
            timestamp_sec,
            timestamp_nsec,
        }
    }

    /// Number of event records in the payload.
    #[must_use]
    pub fn nevents(&self) -> u16 {
        self.nevents
    }

    /// Payload length in bytes.
    #[must_use]
    pub fn payload_len(&self) -> usize {
        usize::from(self.nevents) * EVENT_RECORD_LEN
    }

    /// Total packet length in bytes, header included.
    #[must_use]
    pub fn total_len(&self) -> usize {
        HEADER_LEN + self.payload_len()
    }

    /// The encoded header words.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn header(&self) -> PacketHeader {
        PacketHeader {
            word0: DAS_CLASS_TAG | u32::from(self.sequence),
            length: self.total_len() as u32,
            word2: EVENT_FLAGS | u32::from(self.nevents),
            word3: self.timestamp_sec,
            word4: self.timestamp_nsec,
        }
    }

    /// Write the header plus `nevents * 8` random filler bytes to `out`.
    ///
    /// Returns the number of bytes written.
    ///
    /// # Errors
    ///
    /// Propagates any write failure.
    pub fn write_to<W: Write, R: RngCore>(&self, out: &mut W, rng: &mut R) -> io::Result<usize> {
        out.write_all(&self.header().encode())?;
        let mut payload = vec![0u8; self.payload_len()];
        rng.fill_bytes(&mut payload);
        out.write_all(&payload)?;
        Ok(self.total_len())
    }
}
