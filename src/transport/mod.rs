// SPDX-FileCopyrightText: The usbmidi authors
// SPDX-License-Identifier: MPL-2.0

//! Packet transport
//!
//! The USB device stack itself (descriptors, enumeration, endpoints)
//! is provided externally. It only needs to deliver and accept opaque
//! [`EventPacket`]s in order.

use std::{
    borrow::Cow,
    collections::VecDeque,
    io,
    ops::{Deref, DerefMut},
};

use thiserror::Error;

use crate::EventPacket;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("disconnected")]
    Disconnected,
    #[error("Send: {msg}")]
    Send { msg: Cow<'static, str> },
}

pub type TransportResult<T> = std::result::Result<T, TransportError>;

impl From<TransportError> for io::Error {
    fn from(err: TransportError) -> Self {
        let kind = match err {
            TransportError::Disconnected => io::ErrorKind::NotConnected,
            TransportError::Send { .. } => io::ErrorKind::Other,
        };
        io::Error::new(kind, err)
    }
}

pub trait Transport {
    /// Fetch the next packet received from the host.
    ///
    /// Must not block. Returns `None` if no packet is pending.
    fn receive_packet(&mut self) -> Option<EventPacket>;

    /// Send a packet to the host.
    fn send_packet(&mut self, packet: EventPacket) -> TransportResult<()>;

    /// Checks if the outbound channel accepts a packet.
    #[must_use]
    fn output_ready(&self) -> bool;

    /// Service the underlying device stack.
    ///
    /// Invoked repeatedly from the driving loop, also while waiting
    /// for the outbound channel to become ready. The default
    /// implementation does nothing.
    fn poll(&mut self) {}
}

impl<D> Transport for D
where
    D: DerefMut,
    <D as Deref>::Target: Transport,
{
    fn receive_packet(&mut self) -> Option<EventPacket> {
        self.deref_mut().receive_packet()
    }

    fn send_packet(&mut self, packet: EventPacket) -> TransportResult<()> {
        self.deref_mut().send_packet(packet)
    }

    fn output_ready(&self) -> bool {
        self.deref().output_ready()
    }

    fn poll(&mut self) {
        self.deref_mut().poll();
    }
}

/// In-memory host simulation
///
/// Packets queued with [`MemoryTransport::host_send()`] are received
/// by the device in order. Packets sent by the device are recorded
/// and can be collected with [`MemoryTransport::take_sent()`].
///
/// The outbound channel can be stalled for a number of poll cycles
/// to simulate a busy endpoint.
#[derive(Debug, Default)]
pub struct MemoryTransport {
    inbound: VecDeque<EventPacket>,
    sent: Vec<EventPacket>,
    stalled_polls: usize,
    poll_count: usize,
    disconnected: bool,
}

impl MemoryTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a packet as if it was sent by the host.
    pub fn host_send(&mut self, packet: EventPacket) {
        self.inbound.push_back(packet);
    }

    /// Queue multiple packets as if they were sent by the host.
    pub fn host_send_all(&mut self, packets: impl IntoIterator<Item = EventPacket>) {
        self.inbound.extend(packets);
    }

    /// Packets that have been sent by the device.
    #[must_use]
    pub fn sent(&self) -> &[EventPacket] {
        &self.sent
    }

    /// Collect and clear the packets sent by the device.
    pub fn take_sent(&mut self) -> Vec<EventPacket> {
        std::mem::take(&mut self.sent)
    }

    /// Number of queued packets that have not been received yet.
    #[must_use]
    pub fn pending_inbound(&self) -> usize {
        self.inbound.len()
    }

    /// Keep the outbound channel busy for the next `polls` poll cycles.
    pub fn stall_output(&mut self, polls: usize) {
        self.stalled_polls = polls;
    }

    /// Number of poll cycles serviced so far.
    #[must_use]
    pub const fn poll_count(&self) -> usize {
        self.poll_count
    }

    /// Let all subsequent sends fail.
    pub fn disconnect(&mut self) {
        self.disconnected = true;
    }
}

impl Transport for MemoryTransport {
    fn receive_packet(&mut self) -> Option<EventPacket> {
        self.inbound.pop_front()
    }

    fn send_packet(&mut self, packet: EventPacket) -> TransportResult<()> {
        if self.disconnected {
            return Err(TransportError::Disconnected);
        }
        if !self.output_ready() {
            return Err(TransportError::Send {
                msg: "endpoint busy".into(),
            });
        }
        self.sent.push(packet);
        Ok(())
    }

    fn output_ready(&self) -> bool {
        // Sends fail immediately once disconnected
        self.disconnected || self.stalled_polls == 0
    }

    fn poll(&mut self) {
        self.poll_count += 1;
        self.stalled_polls = self.stalled_polls.saturating_sub(1);
    }
}
