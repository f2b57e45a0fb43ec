//! UDP transport-layer decoding: four big-endian u16 fields, 8 bytes.

pub mod layout;
pub mod parser;

pub use parser::{UdpHeader, decode_udp};
