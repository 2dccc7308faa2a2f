// SPDX-FileCopyrightText: The usbmidi authors
// SPDX-License-Identifier: MPL-2.0

//! Classification of raw MIDI bytes.

pub const SYSEX_START: u8 = 0xf0;

pub const SYSEX_END: u8 = 0xf7;

pub const TIMING_CLOCK: u8 = 0xf8;

#[must_use]
pub const fn is_status(byte: u8) -> bool {
    byte & 0x80 != 0
}

/// Clock, start, continue, stop, active sensing and reset.
///
/// The undefined bytes 0xF9 and 0xFD are excluded.
#[must_use]
pub const fn is_real_time(byte: u8) -> bool {
    byte == TIMING_CLOCK || (byte >= 0xfa && byte != 0xfd)
}

/// Tune request and the undefined bytes 0xF4/0xF5.
#[must_use]
pub const fn is_single_byte_system_common(byte: u8) -> bool {
    byte >= 0xf4 && byte <= 0xf6
}

#[must_use]
pub const fn is_sysex_start(byte: u8) -> bool {
    byte == SYSEX_START
}

#[must_use]
pub const fn is_sysex_end(byte: u8) -> bool {
    byte == SYSEX_END
}

/// Framing class of a single byte in a serial MIDI stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteKind {
    RealTime,
    SystemCommonSingle,
    SysExStart,
    SysExEnd,
    /// Any other status byte, including undefined ones
    Status,
    Data,
}

impl ByteKind {
    /// Classify a byte, the first matching class wins.
    #[must_use]
    pub const fn of(byte: u8) -> Self {
        if !is_status(byte) {
            Self::Data
        } else if is_real_time(byte) {
            Self::RealTime
        } else if is_single_byte_system_common(byte) {
            Self::SystemCommonSingle
        } else if is_sysex_start(byte) {
            Self::SysExStart
        } else if is_sysex_end(byte) {
            Self::SysExEnd
        } else {
            Self::Status
        }
    }
}
