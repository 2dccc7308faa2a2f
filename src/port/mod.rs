// SPDX-FileCopyrightText: The usbmidi authors
// SPDX-License-Identifier: MPL-2.0

//! Serial MIDI byte stream on top of a packet [`Transport`]
//!
//! Inbound packets are decoded and staged in a bounded byte buffer
//! until they are read. Multi-byte messages are either enqueued
//! completely or dropped, a reader never observes a truncated message.
//!
//! Outbound bytes are encoded and the resulting packets are queued
//! until the transport is ready to send them.

use std::io;

use crate::{
    decode, fifo::RingBuffer, CableNumber, Encoder, EventPacket, Transport, TransportResult,
};

/// Default capacity of the inbound byte buffer.
pub const DEFAULT_INBOUND_CAPACITY: usize = 64;

/// Default capacity of the outbound packet queue.
pub const DEFAULT_OUTBOUND_CAPACITY: usize = 16;

/// USB-MIDI port for a single cable
///
/// The capacities `IN` (bytes) and `OUT` (packets) include the unused
/// slot of the ring buffers and must not exceed 256.
#[derive(Debug)]
pub struct UsbMidiPort<T, const IN: usize = 64, const OUT: usize = 16> {
    transport: T,
    encoder: Encoder,
    inbound: RingBuffer<u8, u8, IN>,
    outbound: RingBuffer<EventPacket, u8, OUT>,
}

impl<T, const IN: usize, const OUT: usize> UsbMidiPort<T, IN, OUT>
where
    T: Transport,
{
    #[must_use]
    pub fn new(transport: T, cable: CableNumber) -> Self {
        Self {
            transport,
            encoder: Encoder::new(cable),
            inbound: RingBuffer::new(),
            outbound: RingBuffer::new(),
        }
    }

    #[must_use]
    pub const fn cable(&self) -> CableNumber {
        self.encoder.cable()
    }

    pub fn set_cable(&mut self, cable: CableNumber) {
        self.encoder.set_cable(cable);
    }

    #[must_use]
    pub const fn encoder(&self) -> &Encoder {
        &self.encoder
    }

    /// Discard a partially written message and the running status.
    pub fn reset(&mut self) {
        if self.encoder.state().is_sys_ex_open() {
            log::debug!("Aborting unterminated SysEx output");
        }
        self.encoder.reset();
    }

    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    #[must_use]
    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Number of packets waiting to be sent.
    #[must_use]
    pub fn pending_output(&self) -> usize {
        usize::from(self.outbound.len())
    }

    /// Service the transport.
    ///
    /// Receives all pending packets and sends queued packets while the
    /// transport is ready. Should be invoked regularly from the driving
    /// loop.
    ///
    /// Returns the number of packets received.
    pub fn poll(&mut self) -> usize {
        self.transport.poll();
        let received = self.receive();
        self.try_send_pending();
        received
    }

    /// Number of bytes that could be read without polling again.
    pub fn available(&mut self) -> usize {
        self.poll();
        usize::from(self.inbound.len())
    }

    /// Read the next byte.
    pub fn read(&mut self) -> Option<u8> {
        self.poll();
        self.inbound.pop()
    }

    /// Read the next byte without consuming it.
    pub fn peek(&mut self) -> Option<u8> {
        self.poll();
        self.inbound.peek()
    }

    /// Write the next byte.
    ///
    /// Returns `false` if the byte completed a packet that has been
    /// dropped because the outbound queue is full.
    pub fn write(&mut self, byte: u8) -> bool {
        let Some(packet) = self.encoder.process(byte) else {
            return true;
        };
        if self.outbound.is_full() {
            self.try_send_pending();
        }
        if !self.outbound.push(packet) {
            log::debug!(
                "Dropping MIDI output {bytes:02x?}: outbound queue full",
                bytes = packet.to_bytes()
            );
            return false;
        }
        self.try_send_pending();
        true
    }

    /// Block until all queued packets have been sent.
    ///
    /// Keeps servicing the transport while waiting.
    pub fn flush(&mut self) -> TransportResult<()> {
        loop {
            self.send_pending()?;
            if self.outbound.is_empty() {
                return Ok(());
            }
            self.transport.poll();
            self.receive();
        }
    }

    fn receive(&mut self) -> usize {
        let mut received = 0;
        while let Some(packet) = self.transport.receive_packet() {
            received += 1;
            log::trace!(
                "Received USB-MIDI packet {bytes:02x?}",
                bytes = packet.to_bytes()
            );
            let bytes = decode(packet);
            if bytes.is_empty() {
                log::debug!(
                    "Dropping USB-MIDI packet with reserved code index number {cin:?}",
                    cin = packet.cin()
                );
                continue;
            }
            if !self.inbound.push_all(&bytes) {
                log::debug!(
                    "Dropping MIDI input {bytes:02x?}: inbound buffer full",
                    bytes = bytes.as_slice()
                );
            }
        }
        received
    }

    fn send_pending(&mut self) -> TransportResult<()> {
        while self.transport.output_ready() {
            let Some(packet) = self.outbound.peek() else {
                break;
            };
            self.transport.send_packet(packet)?;
            log::trace!("Sent USB-MIDI packet {bytes:02x?}", bytes = packet.to_bytes());
            self.outbound.advance();
        }
        Ok(())
    }

    fn try_send_pending(&mut self) {
        if let Err(err) = self.send_pending() {
            log::warn!("Failed to send MIDI output: {err}");
        }
    }
}

impl<T, const IN: usize, const OUT: usize> io::Write for UsbMidiPort<T, IN, OUT>
where
    T: Transport,
{
    /// Accepts all bytes. Completed packets that do not fit into the
    /// outbound queue are dropped.
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        for &byte in buf {
            UsbMidiPort::write(self, byte);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        UsbMidiPort::flush(self).map_err(Into::into)
    }
}

#[cfg(test)]
mod tests;
