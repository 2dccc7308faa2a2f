// SPDX-FileCopyrightText: The usbmidi authors
// SPDX-License-Identifier: MPL-2.0

#![allow(rustdoc::invalid_rust_codeblocks)]
#![doc = include_str!("../README.md")]
#![warn(rust_2018_idioms)]
#![warn(rust_2021_compatibility)]
#![warn(missing_debug_implementations)]
#![warn(unreachable_pub)]
#![warn(unsafe_code)]
#![warn(clippy::pedantic)]
#![warn(clippy::clone_on_ref_ptr)]
#![warn(rustdoc::broken_intra_doc_links)]
// Repetitions of module/type names occur frequently when using many
// modules for keeping the size of the source files handy. Often
// types have the same name as their parent module.
#![allow(clippy::module_name_repetitions)]
// Repeating the type name in `..Default::default()` expressions
// is not needed since the context is obvious.
#![allow(clippy::default_trait_access)]

mod decode;
pub use self::decode::{decode, MidiBytes};

mod encode;
pub use self::encode::{Encoder, EncoderState};

pub mod fifo;

pub mod message;

mod packet;
pub use self::packet::{
    payload_len, CableNumber, CodeIndexNumber, EventPacket, InvalidCableNumber, MAX_PAYLOAD_LEN,
    PACKET_SIZE,
};

mod port;
pub use self::port::{UsbMidiPort, DEFAULT_INBOUND_CAPACITY, DEFAULT_OUTBOUND_CAPACITY};

mod transport;
pub use self::transport::{MemoryTransport, Transport, TransportError, TransportResult};
