// SPDX-FileCopyrightText: The usbmidi authors
// SPDX-License-Identifier: MPL-2.0

//! USB -> MIDI
//!
//! Decoding is stateless: Each packet maps to 0 to 3 raw MIDI bytes.

use std::ops::Deref;

use crate::{EventPacket, MAX_PAYLOAD_LEN};

/// Raw MIDI bytes decoded from a single packet.
///
/// Stored inline without allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MidiBytes {
    buf: [u8; MAX_PAYLOAD_LEN],
    len: u8,
}

impl MidiBytes {
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.buf[..usize::from(self.len)]
    }
}

impl Deref for MidiBytes {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        self.as_slice()
    }
}

impl AsRef<[u8]> for MidiBytes {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}

/// Decode a single packet.
///
/// The number of bytes is determined by the packet's code index number.
/// Packets with a reserved code index number decode to nothing.
#[must_use]
pub fn decode(packet: EventPacket) -> MidiBytes {
    let len = packet.payload_len();
    let mut buf = [0; MAX_PAYLOAD_LEN];
    buf[..len].copy_from_slice(&packet.data[..len]);
    #[allow(clippy::cast_possible_truncation)] // len <= MAX_PAYLOAD_LEN
    let len = len as u8;
    MidiBytes { buf, len }
}
