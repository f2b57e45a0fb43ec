use std::net::Ipv4Addr;

use serde::Serialize;

use super::layout;
use crate::cursor::{ByteCursor, ByteOrder};
use crate::error::DecodeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Ipv4Header {
    pub version: u8,
    /// Header length in 32-bit words.
    pub ihl: u8,
    pub service_type: u8,
    pub total_length: u16,
    pub identification: u16,
    /// Top three bits of bytes 6..8.
    pub flags: u8,
    /// In 8-byte units.
    pub fragment_offset: u16,
    pub ttl: u8,
    pub protocol: u8,
    /// Passed through unverified.
    pub checksum: u16,
    pub src: Ipv4Addr,
    pub dst: Ipv4Addr,
}

impl Ipv4Header {
    pub fn header_len(&self) -> usize {
        self.ihl as usize * layout::IHL_WORD_LEN
    }

    pub fn dont_fragment(&self) -> bool {
        self.flags & layout::FLAG_DONT_FRAGMENT != 0
    }

    pub fn more_fragments(&self) -> bool {
        self.flags & layout::FLAG_MORE_FRAGMENTS != 0
    }

    /// Non-first fragments do not start with a transport header.
    pub fn is_trailing_fragment(&self) -> bool {
        self.fragment_offset != 0
    }
}

/// Split the first header byte into (version, ihl).
///
/// # Examples
/// ```
/// use pcapwalk_core::protocols::ipv4::split_version_ihl;
///
/// assert_eq!(split_version_ihl(0x45), (4, 5));
/// assert_eq!(split_version_ihl(0xaf), (10, 15));
/// ```
pub fn split_version_ihl(byte: u8) -> (u8, u8) {
    (byte >> layout::VERSION_SHIFT, byte & layout::IHL_MASK)
}

/// Split bytes 6..8 (already big-endian decoded) into (flags, fragment offset).
///
/// # Examples
/// ```
/// use pcapwalk_core::protocols::ipv4::split_flags_fragment;
///
/// assert_eq!(split_flags_fragment(u16::from_be_bytes([0x40, 0x00])), (2, 0));
/// assert_eq!(split_flags_fragment(u16::from_be_bytes([0x20, 0x01])), (1, 1));
/// ```
pub fn split_flags_fragment(word: u16) -> (u8, u16) {
    (
        (word >> layout::FRAGMENT_OFFSET_BITS) as u8,
        word & layout::FRAGMENT_OFFSET_MASK,
    )
}

/// Decode an IPv4 header and consume exactly `ihl * 4` bytes.
///
/// # Errors
/// - `InvalidHeaderLength` when IHL is below 5.
/// - `TruncatedBuffer` when the declared header does not fit; nothing is
///   consumed in either case.
pub fn decode_ipv4(cursor: &mut ByteCursor<'_>) -> Result<Ipv4Header, DecodeError> {
    let (version, ihl) = split_version_ihl(cursor.peek_u8()?);
    if ihl < layout::MIN_IHL {
        return Err(DecodeError::InvalidHeaderLength { ihl });
    }
    let header_len = ihl as usize * layout::IHL_WORD_LEN;
    cursor.require(header_len)?;

    cursor.skip(1)?;
    let service_type = cursor.read_u8()?;
    let total_length = cursor.read_u16(ByteOrder::Big)?;
    let identification = cursor.read_u16(ByteOrder::Big)?;
    let (flags, fragment_offset) = split_flags_fragment(cursor.read_u16(ByteOrder::Big)?);
    let ttl = cursor.read_u8()?;
    let protocol = cursor.read_u8()?;
    let checksum = cursor.read_u16(ByteOrder::Big)?;
    let src = Ipv4Addr::from(cursor.read_array::<4>()?);
    let dst = Ipv4Addr::from(cursor.read_array::<4>()?);
    cursor.skip(header_len - layout::MIN_HEADER_LEN)?;

    Ok(Ipv4Header {
        version,
        ihl,
        service_type,
        total_length,
        identification,
        flags,
        fragment_offset,
        ttl,
        protocol,
        checksum,
        src,
        dst,
    })
}

#[cfg(test)]
mod tests {
    use super::{decode_ipv4, split_flags_fragment, split_version_ihl};
    use crate::cursor::ByteCursor;
    use crate::error::DecodeError;
    use crate::protocols::ipv4::layout;

    fn header(ihl: u8) -> Vec<u8> {
        let mut bytes = vec![0u8; ihl as usize * 4];
        bytes[0] = 0x40 | ihl;
        bytes[1] = 0xb8;
        bytes[2..4].copy_from_slice(&48u16.to_be_bytes());
        bytes[4..6].copy_from_slice(&0x1c46u16.to_be_bytes());
        bytes[6..8].copy_from_slice(&[0x40, 0x00]);
        bytes[8] = 64;
        bytes[9] = layout::PROTOCOL_UDP;
        bytes[10..12].copy_from_slice(&0xb1e6u16.to_be_bytes());
        bytes[12..16].copy_from_slice(&[192, 168, 0, 1]);
        bytes[16..20].copy_from_slice(&[10, 0, 0, 254]);
        bytes
    }

    #[test]
    fn version_and_ihl_from_same_byte() {
        assert_eq!(split_version_ihl(0x45), (4, 5));
        assert_eq!(split_version_ihl(0x4f), (4, 15));
        assert_eq!(split_version_ihl(0xa6), (10, 6));
    }

    #[test]
    fn flags_and_fragment_offset_span_both_bytes() {
        assert_eq!(split_flags_fragment(u16::from_be_bytes([0x40, 0x00])), (2, 0));
        assert_eq!(split_flags_fragment(u16::from_be_bytes([0x20, 0x01])), (1, 1));
        assert_eq!(split_flags_fragment(u16::from_be_bytes([0x3f, 0xff])), (1, 0x1fff));
        assert_eq!(split_flags_fragment(u16::from_be_bytes([0xe1, 0x00])), (7, 0x0100));
    }

    #[test]
    fn decode_ipv4_fixed_fields() {
        let bytes = header(5);
        let mut cursor = ByteCursor::new(&bytes);
        let ip = decode_ipv4(&mut cursor).unwrap();
        assert_eq!(cursor.position(), 20);
        assert_eq!(ip.version, 4);
        assert_eq!(ip.ihl, 5);
        assert_eq!(ip.header_len(), 20);
        assert_eq!(ip.service_type, 0xb8);
        assert_eq!(ip.total_length, 48);
        assert_eq!(ip.identification, 0x1c46);
        assert_eq!(ip.flags, 2);
        assert!(ip.dont_fragment());
        assert!(!ip.more_fragments());
        assert_eq!(ip.fragment_offset, 0);
        assert_eq!(ip.ttl, 64);
        assert_eq!(ip.protocol, layout::PROTOCOL_UDP);
        assert_eq!(ip.checksum, 0xb1e6);
        assert_eq!(ip.src.to_string(), "192.168.0.1");
        assert_eq!(ip.dst.to_string(), "10.0.0.254");
    }

    #[test]
    fn decode_ipv4_skips_options() {
        let mut bytes = header(7);
        bytes.extend_from_slice(&[0xaa, 0xbb]);
        let mut cursor = ByteCursor::new(&bytes);
        let ip = decode_ipv4(&mut cursor).unwrap();
        assert_eq!(ip.ihl, 7);
        assert_eq!(cursor.position(), 28);
        assert_eq!(cursor.read_u8().unwrap(), 0xaa);
    }

    #[test]
    fn decode_ipv4_rejects_short_ihl() {
        let mut bytes = header(5);
        bytes[0] = 0x44;
        let mut cursor = ByteCursor::new(&bytes);
        let err = decode_ipv4(&mut cursor).unwrap_err();
        assert_eq!(err, DecodeError::InvalidHeaderLength { ihl: 4 });
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn decode_ipv4_options_past_end_are_truncated() {
        let mut bytes = header(5);
        bytes[0] = 0x46;
        let mut cursor = ByteCursor::new(&bytes);
        let err = decode_ipv4(&mut cursor).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::TruncatedBuffer {
                needed: 24,
                remaining: 20,
                ..
            }
        ));
        assert_eq!(cursor.position(), 0);
    }
}
