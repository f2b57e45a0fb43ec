use std::fmt;

use serde::{Serialize, Serializer};

use super::layout;
use crate::cursor::{ByteCursor, ByteOrder};
use crate::error::DecodeError;

/// 48-bit hardware address, displayed as lowercase colon-separated hex.
///
/// # Examples
/// ```
/// use pcapwalk_core::MacAddr;
///
/// let mac = MacAddr([0x00, 0x1b, 0x21, 0x0a, 0xbc, 0xff]);
/// assert_eq!(mac.to_string(), "00:1b:21:0a:bc:ff");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MacAddr(pub [u8; layout::MAC_LEN]);

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02x}:{b:02x}:{c:02x}:{d:02x}:{e:02x}:{g:02x}")
    }
}

impl Serialize for MacAddr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EthernetFrame {
    pub dst: MacAddr,
    pub src: MacAddr,
    pub ethertype: u16,
}

pub fn decode_ethernet(cursor: &mut ByteCursor<'_>) -> Result<EthernetFrame, DecodeError> {
    cursor.require(layout::HEADER_LEN)?;
    Ok(EthernetFrame {
        dst: MacAddr(cursor.read_array()?),
        src: MacAddr(cursor.read_array()?),
        ethertype: cursor.read_u16(ByteOrder::Big)?,
    })
}

#[cfg(test)]
mod tests {
    use super::{MacAddr, decode_ethernet};
    use crate::cursor::ByteCursor;
    use crate::error::DecodeError;
    use crate::protocols::ethernet::layout;

    #[test]
    fn decode_ethernet_ok() {
        let bytes = [
            0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x0a, 0x0b, 0x0c, 0x0d, 0x0e, 0x0f, 0x08, 0x00,
            0xff,
        ];
        let mut cursor = ByteCursor::new(&bytes);
        let frame = decode_ethernet(&mut cursor).unwrap();
        assert_eq!(cursor.position(), layout::HEADER_LEN);
        assert_eq!(frame.dst.to_string(), "01:02:03:04:05:06");
        assert_eq!(frame.src.to_string(), "0a:0b:0c:0d:0e:0f");
        assert_eq!(frame.ethertype, layout::ETHERTYPE_IPV4);
    }

    #[test]
    fn decode_ethernet_too_short() {
        let bytes = [0u8; 13];
        let mut cursor = ByteCursor::new(&bytes);
        let err = decode_ethernet(&mut cursor).unwrap_err();
        assert!(matches!(err, DecodeError::TruncatedBuffer { needed: 14, .. }));
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn mac_serializes_as_string() {
        let mac = MacAddr([0xde, 0xad, 0xbe, 0xef, 0x00, 0x01]);
        let value = serde_json::to_value(mac).unwrap();
        assert_eq!(value, "de:ad:be:ef:00:01");
    }
}
