// SPDX-FileCopyrightText: The usbmidi authors
// SPDX-License-Identifier: MPL-2.0

use std::io::Write as _;

use super::*;
use crate::{MemoryTransport, TransportError};

fn cable(value: u8) -> CableNumber {
    CableNumber::new(value).unwrap()
}

fn take_sent<const IN: usize, const OUT: usize>(
    port: &mut UsbMidiPort<MemoryTransport, IN, OUT>,
) -> Vec<[u8; 4]> {
    port.transport_mut()
        .take_sent()
        .into_iter()
        .map(EventPacket::to_bytes)
        .collect()
}

fn read_all<const IN: usize, const OUT: usize>(
    port: &mut UsbMidiPort<MemoryTransport, IN, OUT>,
) -> Vec<u8> {
    std::iter::from_fn(|| port.read()).collect()
}

#[test]
fn write_sends_completed_packets() {
    let mut port: UsbMidiPort<_> = UsbMidiPort::new(MemoryTransport::new(), cable(2));
    assert!(port.write(0x90));
    assert!(port.write(0x40));
    assert!(take_sent(&mut port).is_empty());
    assert!(port.write(0x7f));
    assert_eq!(vec![[0x29, 0x90, 0x40, 0x7f]], take_sent(&mut port));
    assert_eq!(0, port.pending_output());
}

#[test]
fn write_real_time_inside_message() {
    let mut port: UsbMidiPort<_> = UsbMidiPort::new(MemoryTransport::new(), cable(0));
    for byte in [0x90, 0xf8, 0x40, 0x7f] {
        assert!(port.write(byte));
    }
    assert_eq!(
        vec![[0x0f, 0xf8, 0x00, 0x00], [0x09, 0x90, 0x40, 0x7f]],
        take_sent(&mut port)
    );
}

#[test]
fn read_decoded_bytes() {
    let mut port: UsbMidiPort<_> = UsbMidiPort::new(MemoryTransport::new(), cable(0));
    assert_eq!(0, port.available());
    assert_eq!(None, port.peek());
    port.transport_mut()
        .host_send(EventPacket::from_bytes([0x09, 0x90, 0x40, 0x7f]));
    assert_eq!(3, port.available());
    assert_eq!(Some(0x90), port.peek());
    assert_eq!(Some(0x90), port.read());
    assert_eq!(Some(0x40), port.read());
    assert_eq!(Some(0x7f), port.read());
    assert_eq!(None, port.read());
    assert_eq!(0, port.transport().pending_inbound());
}

#[test]
fn reserved_packets_are_dropped() {
    let mut port: UsbMidiPort<_> = UsbMidiPort::new(MemoryTransport::new(), cable(0));
    port.transport_mut().host_send_all([
        EventPacket::from_bytes([0x00, 0x90, 0x40, 0x7f]),
        EventPacket::from_bytes([0x01, 0x90, 0x40, 0x7f]),
        EventPacket::from_bytes([0x0f, 0xf8, 0x00, 0x00]),
    ]);
    assert_eq!(3, port.poll());
    assert_eq!(vec![0xf8], read_all(&mut port));
}

#[test]
fn inbound_messages_are_never_truncated() {
    let mut port: UsbMidiPort<_, 8, 4> = UsbMidiPort::new(MemoryTransport::new(), cable(0));
    port.transport_mut().host_send_all([
        EventPacket::from_bytes([0x09, 0x90, 0x40, 0x7f]),
        EventPacket::from_bytes([0x08, 0x80, 0x40, 0x00]),
        // Only 1 slot left
        EventPacket::from_bytes([0x0b, 0xb0, 0x07, 0x64]),
        EventPacket::from_bytes([0x0f, 0xf8, 0x00, 0x00]),
    ]);
    assert_eq!(7, port.available());
    assert_eq!(
        vec![0x90, 0x40, 0x7f, 0x80, 0x40, 0x00, 0xf8],
        read_all(&mut port)
    );
}

#[test]
fn flush_waits_for_stalled_output() {
    let mut port: UsbMidiPort<_> = UsbMidiPort::new(MemoryTransport::new(), cable(1));
    port.transport_mut().stall_output(3);
    for byte in [0xc0, 0x05] {
        assert!(port.write(byte));
    }
    assert_eq!(1, port.pending_output());
    assert!(port.transport().sent().is_empty());
    port.flush().unwrap();
    assert_eq!(0, port.pending_output());
    assert_eq!(3, port.transport().poll_count());
    assert_eq!(vec![[0x1c, 0xc0, 0x05, 0x00]], take_sent(&mut port));
}

#[test]
fn flush_keeps_receiving() {
    let mut port: UsbMidiPort<_> = UsbMidiPort::new(MemoryTransport::new(), cable(0));
    port.transport_mut().stall_output(2);
    port.transport_mut()
        .host_send(EventPacket::from_bytes([0x0f, 0xfa, 0x00, 0x00]));
    assert!(port.write(0xfc));
    port.flush().unwrap();
    assert_eq!(vec![[0x0f, 0xfc, 0x00, 0x00]], take_sent(&mut port));
    assert_eq!(vec![0xfa], read_all(&mut port));
}

#[test]
fn outbound_overflow_drops_packets() {
    let mut port: UsbMidiPort<_, 64, 4> = UsbMidiPort::new(MemoryTransport::new(), cable(0));
    port.transport_mut().stall_output(10);
    assert!(port.write(0xf8));
    assert!(port.write(0xfa));
    assert!(port.write(0xfb));
    assert!(!port.write(0xfc));
    assert_eq!(3, port.pending_output());
    port.flush().unwrap();
    assert_eq!(
        vec![
            [0x0f, 0xf8, 0x00, 0x00],
            [0x0f, 0xfa, 0x00, 0x00],
            [0x0f, 0xfb, 0x00, 0x00]
        ],
        take_sent(&mut port)
    );
}

#[test]
fn flush_reports_send_failures() {
    let mut port: UsbMidiPort<_> = UsbMidiPort::new(MemoryTransport::new(), cable(0));
    port.transport_mut().disconnect();
    assert!(port.write(0xff));
    assert_eq!(1, port.pending_output());
    assert!(matches!(port.flush(), Err(TransportError::Disconnected)));
    assert_eq!(1, port.pending_output());

    let err = io::Write::flush(&mut port).unwrap_err();
    assert_eq!(io::ErrorKind::NotConnected, err.kind());
}

#[test]
fn io_write_encodes_bytes() {
    let mut port: UsbMidiPort<_> = UsbMidiPort::new(MemoryTransport::new(), cable(0));
    port.write_all(&[0xf0, 0x01, 0x02, 0x03, 0x04, 0xf7]).unwrap();
    io::Write::flush(&mut port).unwrap();
    assert_eq!(
        vec![[0x04, 0xf0, 0x01, 0x02], [0x07, 0x03, 0x04, 0xf7]],
        take_sent(&mut port)
    );
}

#[test]
fn loopback_expands_running_status() {
    let mut port: UsbMidiPort<_> = UsbMidiPort::new(MemoryTransport::new(), cable(0));
    let input = [
        0x90, 0x40, 0x7f, 0x41, 0x7f, 0xf0, 0x01, 0x02, 0x03, 0xf7, 0xc0, 0x05, 0xf8,
    ];
    for byte in input {
        assert!(port.write(byte));
    }
    port.flush().unwrap();
    let sent = port.transport_mut().take_sent();
    port.transport_mut().host_send_all(sent);
    assert_eq!(
        vec![
            0x90, 0x40, 0x7f, 0x90, 0x41, 0x7f, 0xf0, 0x01, 0x02, 0x03, 0xf7, 0xc0, 0x05, 0xf8
        ],
        read_all(&mut port)
    );
}

#[test]
fn reset_discards_partial_output() {
    let mut port: UsbMidiPort<_> = UsbMidiPort::new(MemoryTransport::new(), cable(4));
    assert!(port.write(0xf0));
    assert!(port.write(0x01));
    port.reset();
    assert!(port.write(0x7f));
    assert!(take_sent(&mut port).is_empty());
    assert_eq!(cable(4), port.cable());
}

#[test]
fn set_cable_changes_packet_header() {
    let mut port: UsbMidiPort<_> = UsbMidiPort::new(MemoryTransport::new(), cable(0));
    port.set_cable(cable(15));
    assert!(port.write(0xfe));
    assert_eq!(vec![[0xff, 0xfe, 0x00, 0x00]], take_sent(&mut port));
    assert_eq!(cable(15), port.encoder().cable());
}

#[test]
fn borrowed_transport() {
    let mut transport = MemoryTransport::new();
    {
        let mut port: UsbMidiPort<&mut MemoryTransport> =
            UsbMidiPort::new(&mut transport, cable(0));
        assert!(port.write(0xfa));
    }
    assert_eq!(&[EventPacket::from_bytes([0x0f, 0xfa, 0x00, 0x00])], transport.sent());

    let port: UsbMidiPort<_> = UsbMidiPort::new(Box::new(transport), cable(0));
    assert_eq!(1, port.into_transport().sent().len());
}
