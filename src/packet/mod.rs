// SPDX-FileCopyrightText: The usbmidi authors
// SPDX-License-Identifier: MPL-2.0

//! USB-MIDI event packets
//!
//! The atomic unit of the USB MIDI class transport is a 4-byte packet.
//! The first byte carries the cable number in the high nibble and the
//! Code Index Number (CIN) in the low nibble. The remaining 3 bytes
//! carry the MIDI payload, zero-padded when unused.
//!
//! <https://www.usb.org/sites/default/files/midi10.pdf>, section 4

use derive_more::{Display, Into};
use strum::{EnumCount, EnumIter, FromRepr};
use thiserror::Error;

/// Size of an encoded packet in bytes.
pub const PACKET_SIZE: usize = 4;

/// Maximum number of MIDI bytes carried by a single packet.
pub const MAX_PAYLOAD_LEN: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid cable number {0} (expected 0..=15)")]
pub struct InvalidCableNumber(pub u8);

/// Virtual MIDI port
///
/// Up to 16 virtual ports are multiplexed over a single USB interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Display, Into)]
pub struct CableNumber(u8);

impl CableNumber {
    pub const MIN: Self = Self(0);
    pub const MAX: Self = Self(0x0f);

    #[must_use]
    pub const fn new(value: u8) -> Option<Self> {
        if value > Self::MAX.0 {
            return None;
        }
        Some(Self(value))
    }

    /// Keep only the low nibble of `value`.
    #[must_use]
    pub const fn from_masked(value: u8) -> Self {
        Self(value & 0x0f)
    }

    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for CableNumber {
    type Error = InvalidCableNumber;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(InvalidCableNumber(value))
    }
}

/// Code Index Number
///
/// Classifies the payload of a packet and thereby determines
/// how many of the 3 payload bytes are meaningful.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromRepr, EnumIter, EnumCount)]
#[repr(u8)]
pub enum CodeIndexNumber {
    /// Reserved for future extensions
    Miscellaneous = 0x0,
    /// Reserved for future extensions
    CableEvent = 0x1,
    /// Two-byte System Common message, e.g. MTC quarter frame
    SystemCommon2 = 0x2,
    /// Three-byte System Common message, e.g. song position pointer
    SystemCommon3 = 0x3,
    /// SysEx starts or continues
    SysExStart = 0x4,
    /// Single-byte System Common message or SysEx ends with 1 byte
    SingleByte = 0x5,
    /// SysEx ends with 2 bytes
    SysExEnd2 = 0x6,
    /// SysEx ends with 3 bytes
    SysExEnd3 = 0x7,
    NoteOff = 0x8,
    NoteOn = 0x9,
    PolyKeyPressure = 0xa,
    ControlChange = 0xb,
    ProgramChange = 0xc,
    ChannelPressure = 0xd,
    PitchBendChange = 0xe,
    /// Single byte, e.g. a real-time message
    Byte = 0xf,
}

impl CodeIndexNumber {
    /// Total conversion from the low nibble of `value`.
    #[must_use]
    pub const fn from_nibble(value: u8) -> Self {
        match value & 0x0f {
            0x0 => Self::Miscellaneous,
            0x1 => Self::CableEvent,
            0x2 => Self::SystemCommon2,
            0x3 => Self::SystemCommon3,
            0x4 => Self::SysExStart,
            0x5 => Self::SingleByte,
            0x6 => Self::SysExEnd2,
            0x7 => Self::SysExEnd3,
            0x8 => Self::NoteOff,
            0x9 => Self::NoteOn,
            0xa => Self::PolyKeyPressure,
            0xb => Self::ControlChange,
            0xc => Self::ProgramChange,
            0xd => Self::ChannelPressure,
            0xe => Self::PitchBendChange,
            _ => Self::Byte,
        }
    }

    #[must_use]
    pub const fn value(self) -> u8 {
        self as u8
    }

    /// Number of valid payload bytes.
    ///
    /// Reserved codes yield 0 and packets carrying them must be dropped.
    #[must_use]
    pub const fn payload_len(self) -> usize {
        match self {
            Self::SingleByte | Self::Byte => 1,
            Self::SystemCommon2
            | Self::SysExEnd2
            | Self::ProgramChange
            | Self::ChannelPressure => 2,
            Self::SystemCommon3
            | Self::SysExStart
            | Self::SysExEnd3
            | Self::NoteOff
            | Self::NoteOn
            | Self::PolyKeyPressure
            | Self::ControlChange
            | Self::PitchBendChange => 3,
            Self::Miscellaneous | Self::CableEvent => 0,
        }
    }

    /// Code for a terminal SysEx chunk with `len` bytes, including `0xF7`.
    #[must_use]
    pub(crate) const fn sysex_end(len: u8) -> Self {
        Self::from_nibble(Self::SysExStart.value() + len)
    }
}

/// Number of valid payload bytes for a raw 4-bit code.
///
/// Only the low nibble of `cin` is considered. Unrecognized codes
/// yield 0.
#[must_use]
pub const fn payload_len(cin: u8) -> usize {
    CodeIndexNumber::from_nibble(cin).payload_len()
}

/// USB-MIDI event packet
///
/// Payload bytes beyond [`EventPacket::payload_len()`] are not
/// meaningful and must be ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct EventPacket {
    /// Cable number (high nibble) and code index number (low nibble)
    pub header: u8,
    pub data: [u8; MAX_PAYLOAD_LEN],
}

impl EventPacket {
    #[must_use]
    pub const fn new(
        cable: CableNumber,
        cin: CodeIndexNumber,
        data: [u8; MAX_PAYLOAD_LEN],
    ) -> Self {
        Self {
            header: (cable.value() << 4) | cin.value(),
            data,
        }
    }

    #[must_use]
    pub const fn cable(&self) -> CableNumber {
        CableNumber::from_masked(self.header >> 4)
    }

    #[must_use]
    pub const fn cin(&self) -> CodeIndexNumber {
        CodeIndexNumber::from_nibble(self.header)
    }

    #[must_use]
    pub const fn payload_len(&self) -> usize {
        self.cin().payload_len()
    }

    /// The meaningful prefix of the payload.
    #[must_use]
    pub fn payload(&self) -> &[u8] {
        &self.data[..self.payload_len()]
    }

    #[must_use]
    pub const fn from_bytes(bytes: [u8; PACKET_SIZE]) -> Self {
        let [header, data0, data1, data2] = bytes;
        Self {
            header,
            data: [data0, data1, data2],
        }
    }

    #[must_use]
    pub const fn to_bytes(self) -> [u8; PACKET_SIZE] {
        let Self {
            header,
            data: [data0, data1, data2],
        } = self;
        [header, data0, data1, data2]
    }
}

impl From<[u8; PACKET_SIZE]> for EventPacket {
    fn from(from: [u8; PACKET_SIZE]) -> Self {
        Self::from_bytes(from)
    }
}

impl From<EventPacket> for [u8; PACKET_SIZE] {
    fn from(from: EventPacket) -> Self {
        from.to_bytes()
    }
}
