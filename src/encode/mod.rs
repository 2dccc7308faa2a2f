// SPDX-FileCopyrightText: The usbmidi authors
// SPDX-License-Identifier: MPL-2.0

//! MIDI -> USB
//!
//! Serial MIDI is consumed byte by byte. A message is only complete
//! after its last data byte has arrived, so the encoder accumulates
//! partial messages and emits a packet whenever one is complete.
//!
//! Real-time bytes may be interleaved at any position and are emitted
//! immediately without disturbing the message that is currently being
//! accumulated. System Exclusive blocks of arbitrary length are split
//! into chunks of 3 bytes.

use enum_as_inner::EnumAsInner;

use crate::{message::ByteKind, CableNumber, CodeIndexNumber, EventPacket, MAX_PAYLOAD_LEN};

/// Framing state of the encoder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumAsInner)]
pub enum EncoderState {
    /// No status byte has been received yet
    ///
    /// Data bytes are discarded.
    #[default]
    NoStatus,

    /// The last status byte applies to subsequent data bytes
    RunningStatus(u8),

    /// Data bytes belong to a System Exclusive block
    ///
    /// The running status that was active before is restored when
    /// the block ends.
    SysExOpen { running_status: Option<u8> },
}

impl EncoderState {
    #[must_use]
    pub const fn running_status(self) -> Option<u8> {
        match self {
            Self::NoStatus => None,
            Self::RunningStatus(status) => Some(status),
            Self::SysExOpen { running_status } => running_status,
        }
    }

    const fn with_running_status(self, status: u8) -> Self {
        match self {
            Self::NoStatus | Self::RunningStatus(_) => Self::RunningStatus(status),
            Self::SysExOpen { .. } => Self::SysExOpen {
                running_status: Some(status),
            },
        }
    }

    const fn open_sysex(self) -> Self {
        Self::SysExOpen {
            running_status: self.running_status(),
        }
    }

    const fn close_sysex(self) -> Self {
        match self.running_status() {
            Some(status) => Self::RunningStatus(status),
            None => Self::NoStatus,
        }
    }
}

/// Code index number and number of data bytes of a message.
///
/// Returns `None` for status bytes without a defined message layout.
const fn message_layout(status: u8) -> Option<(CodeIndexNumber, u8)> {
    match status & 0xf0 {
        0x80 | 0x90 | 0xa0 | 0xb0 | 0xe0 => Some((CodeIndexNumber::from_nibble(status >> 4), 2)),
        0xc0 | 0xd0 => Some((CodeIndexNumber::from_nibble(status >> 4), 1)),
        0xf0 => match status & 0x0f {
            // MTC quarter frame, song select
            0x1 | 0x3 => Some((CodeIndexNumber::SystemCommon2, 1)),
            // Song position pointer
            0x2 => Some((CodeIndexNumber::SystemCommon3, 2)),
            _ => None,
        },
        _ => None,
    }
}

/// Stateful MIDI -> USB encoder for a single cable
///
/// Never fails. Malformed input is absorbed by discarding bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Encoder {
    cable: CableNumber,
    state: EncoderState,
    data: [u8; MAX_PAYLOAD_LEN],
    len: u8,
}

impl Encoder {
    #[must_use]
    pub const fn new(cable: CableNumber) -> Self {
        Self {
            cable,
            state: EncoderState::NoStatus,
            data: [0; MAX_PAYLOAD_LEN],
            len: 0,
        }
    }

    #[must_use]
    pub const fn cable(&self) -> CableNumber {
        self.cable
    }

    pub fn set_cable(&mut self, cable: CableNumber) {
        self.cable = cable;
    }

    #[must_use]
    pub const fn state(&self) -> EncoderState {
        self.state
    }

    /// Bytes of the current message or SysEx chunk received so far.
    #[must_use]
    pub fn pending(&self) -> &[u8] {
        &self.data[..usize::from(self.len)]
    }

    /// Forget any running status and partial message.
    ///
    /// The cable number is kept.
    pub fn reset(&mut self) {
        self.state = EncoderState::NoStatus;
        self.len = 0;
    }

    /// Pure transition function.
    ///
    /// Returns the successor of `self` after receiving `byte` together
    /// with the packet that has been completed by it, if any.
    #[must_use]
    pub fn transition(mut self, byte: u8) -> (Self, Option<EventPacket>) {
        let packet = self.process(byte);
        (self, packet)
    }

    /// Feed the next byte of the serial MIDI stream.
    pub fn process(&mut self, byte: u8) -> Option<EventPacket> {
        match ByteKind::of(byte) {
            ByteKind::RealTime => Some(self.packet(CodeIndexNumber::Byte, [byte, 0, 0])),
            ByteKind::SystemCommonSingle => {
                self.len = 0;
                Some(self.packet(CodeIndexNumber::SingleByte, [byte, 0, 0]))
            }
            ByteKind::SysExStart => {
                self.state = self.state.open_sysex();
                self.data[0] = byte;
                self.len = 1;
                None
            }
            ByteKind::SysExEnd => {
                if !self.push_data(byte) {
                    // Only reachable after data bytes of an undefined message
                    log::debug!(
                        "Discarding pending bytes {pending:02x?} before SysEx end",
                        pending = self.pending()
                    );
                    self.len = 0;
                    self.push_data(byte);
                }
                let (len, data) = self.take_chunk();
                self.state = self.state.close_sysex();
                Some(self.packet(CodeIndexNumber::sysex_end(len), data))
            }
            ByteKind::Status => {
                self.state = self.state.with_running_status(byte);
                self.len = 0;
                None
            }
            ByteKind::Data => self.process_data(byte),
        }
    }

    fn process_data(&mut self, byte: u8) -> Option<EventPacket> {
        match self.state {
            EncoderState::NoStatus => {
                log::debug!("Discarding data byte {byte:#04x} without status");
                self.len = 0;
                None
            }
            EncoderState::SysExOpen { .. } => {
                self.push_data(byte);
                if usize::from(self.len) < MAX_PAYLOAD_LEN {
                    return None;
                }
                let (_, data) = self.take_chunk();
                Some(self.packet(CodeIndexNumber::SysExStart, data))
            }
            EncoderState::RunningStatus(status) => {
                let Some((cin, message_len)) = message_layout(status) else {
                    if !self.push_data(byte) {
                        log::debug!(
                            "Discarding data byte {byte:#04x} of undefined message {status:#04x}"
                        );
                    }
                    return None;
                };
                self.push_data(byte);
                if self.len < message_len {
                    return None;
                }
                let (len, [data0, data1, _]) = self.take_chunk();
                let data1 = if len > 1 { data1 } else { 0 };
                Some(self.packet(cin, [status, data0, data1]))
            }
        }
    }

    /// Append a byte to the accumulator unless it is full.
    fn push_data(&mut self, byte: u8) -> bool {
        let Some(slot) = self.data.get_mut(usize::from(self.len)) else {
            return false;
        };
        *slot = byte;
        self.len += 1;
        true
    }

    /// Empty the accumulator, returning its contents zero-padded.
    fn take_chunk(&mut self) -> (u8, [u8; MAX_PAYLOAD_LEN]) {
        let len = usize::from(self.len);
        let mut data = [0; MAX_PAYLOAD_LEN];
        data[..len].copy_from_slice(&self.data[..len]);
        let len = self.len;
        self.len = 0;
        (len, data)
    }

    const fn packet(&self, cin: CodeIndexNumber, data: [u8; MAX_PAYLOAD_LEN]) -> EventPacket {
        EventPacket::new(self.cable, cin, data)
    }
}
