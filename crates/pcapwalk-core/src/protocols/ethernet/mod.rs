//! Ethernet II link-layer decoding.
//!
//! Fixed 14-byte header: destination MAC, source MAC, ethertype. The
//! ethertype is big-endian on the wire and selects the network decoder.

pub mod layout;
pub mod parser;

pub use parser::{EthernetFrame, MacAddr, decode_ethernet};
