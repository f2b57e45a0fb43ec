use serde::Serialize;

use super::layout;
use crate::cursor::{ByteCursor, ByteOrder};
use crate::error::DecodeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UdpHeader {
    pub src_port: u16,
    pub dst_port: u16,
    /// Header plus datagram payload, as declared on the wire.
    pub length: u16,
    /// Passed through unverified.
    pub checksum: u16,
}

pub fn decode_udp(cursor: &mut ByteCursor<'_>) -> Result<UdpHeader, DecodeError> {
    cursor.require(layout::HEADER_LEN)?;
    Ok(UdpHeader {
        src_port: cursor.read_u16(ByteOrder::Big)?,
        dst_port: cursor.read_u16(ByteOrder::Big)?,
        length: cursor.read_u16(ByteOrder::Big)?,
        checksum: cursor.read_u16(ByteOrder::Big)?,
    })
}
