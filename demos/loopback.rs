// SPDX-FileCopyrightText: The usbmidi authors
// SPDX-License-Identifier: MPL-2.0

use std::io::Write as _;

use usbmidi::{
    CableNumber, EventPacket, MemoryTransport, UsbMidiPort, DEFAULT_INBOUND_CAPACITY,
    DEFAULT_OUTBOUND_CAPACITY,
};

type Port = UsbMidiPort<MemoryTransport, DEFAULT_INBOUND_CAPACITY, DEFAULT_OUTBOUND_CAPACITY>;

fn main() {
    pretty_env_logger::init();

    match run() {
        Ok(()) => (),
        Err(err) => log::error!("{err}"),
    }
}

fn run() -> anyhow::Result<()> {
    let cable = CableNumber::try_from(1)?;
    let mut port = Port::new(MemoryTransport::new(), cable);
    log::info!("Writing MIDI output on cable {cable}");

    // Note on/off with running status, a clock tick in between, and a
    // universal identity request
    port.write_all(&[0x90, 0x3c, 0x64, 0xf8, 0x3c, 0x00])?;
    port.write_all(&[0xf0, 0x7e, 0x7f, 0x06, 0x01, 0xf7])?;
    port.flush()?;

    let sent = port.transport_mut().take_sent();
    for packet in &sent {
        println!(
            "{bytes:02x?} cable = {cable}, cin = {cin:?}, payload = {payload:02x?}",
            bytes = packet.to_bytes(),
            cable = packet.cable(),
            cin = packet.cin(),
            payload = packet.payload(),
        );
    }

    log::info!(
        "Looping back {num_packets} packet(s) as MIDI input",
        num_packets = sent.len()
    );
    port.transport_mut().host_send_all(sent);
    // A packet with a reserved code index number is silently dropped
    port.transport_mut()
        .host_send(EventPacket::from_bytes([0x10, 0x90, 0x3c, 0x64]));

    let mut input = Vec::with_capacity(port.available());
    while let Some(byte) = port.read() {
        input.push(byte);
    }
    println!("{input:02x?}");

    Ok(())
}
