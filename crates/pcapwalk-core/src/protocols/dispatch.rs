use serde::Serialize;

use super::ethernet::{self, EthernetFrame, decode_ethernet};
use super::ipv4::{self, Ipv4Header, decode_ipv4};
use super::udp::{UdpHeader, decode_udp};
use crate::capture::layout::LINKTYPE_ETHERNET;
use crate::cursor::ByteCursor;
use crate::error::DecodeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LinkLayer {
    Ethernet(EthernetFrame),
    Opaque { linktype: i32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NetworkLayer {
    Ipv4(Ipv4Header),
    Opaque { ethertype: u16 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransportLayer {
    Udp(UdpHeader),
    Opaque { protocol: u8 },
}

/// Headers decoded from one frame, outermost first.
///
/// A layer is `None` when the layer below it was opaque.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layers {
    pub link: LinkLayer,
    pub network: Option<NetworkLayer>,
    pub transport: Option<TransportLayer>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LinkDecoder {
    Ethernet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NetworkDecoder {
    Ipv4,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TransportDecoder {
    Udp,
}

const LINK_DECODERS: &[(i32, LinkDecoder)] = &[(LINKTYPE_ETHERNET, LinkDecoder::Ethernet)];
const NETWORK_DECODERS: &[(u16, NetworkDecoder)] =
    &[(ethernet::layout::ETHERTYPE_IPV4, NetworkDecoder::Ipv4)];
const TRANSPORT_DECODERS: &[(u8, TransportDecoder)] =
    &[(ipv4::layout::PROTOCOL_UDP, TransportDecoder::Udp)];

fn lookup<K: PartialEq + Copy, D: Copy>(table: &[(K, D)], key: K) -> Option<D> {
    table
        .iter()
        .find(|(candidate, _)| *candidate == key)
        .map(|(_, decoder)| *decoder)
}

/// Decode the header stack of one frame, leaving the cursor on the payload.
///
/// # Examples
/// ```
/// use pcapwalk_core::ByteCursor;
/// use pcapwalk_core::protocols::{LinkLayer, decode_layers};
///
/// let frame = [0u8; 20];
/// let mut cursor = ByteCursor::new(&frame);
/// let layers = decode_layers(113, &mut cursor)?;
/// assert_eq!(layers.link, LinkLayer::Opaque { linktype: 113 });
/// assert_eq!(cursor.position(), 0);
/// # Ok::<(), pcapwalk_core::DecodeError>(())
/// ```
///
/// # Errors
/// Propagates the first decoder error; opaque layers never fail.
pub fn decode_layers(linktype: i32, cursor: &mut ByteCursor<'_>) -> Result<Layers, DecodeError> {
    let mut layers = Layers {
        link: LinkLayer::Opaque { linktype },
        network: None,
        transport: None,
    };

    let ethertype = match lookup(LINK_DECODERS, linktype) {
        Some(LinkDecoder::Ethernet) => {
            let frame = decode_ethernet(cursor)?;
            layers.link = LinkLayer::Ethernet(frame);
            frame.ethertype
        }
        None => return Ok(layers),
    };

    let ip = match lookup(NETWORK_DECODERS, ethertype) {
        Some(NetworkDecoder::Ipv4) => {
            let ip = decode_ipv4(cursor)?;
            layers.network = Some(NetworkLayer::Ipv4(ip));
            ip
        }
        None => {
            layers.network = Some(NetworkLayer::Opaque { ethertype });
            return Ok(layers);
        }
    };

    let decoder = if ip.is_trailing_fragment() {
        None
    } else {
        lookup(TRANSPORT_DECODERS, ip.protocol)
    };
    layers.transport = Some(match decoder {
        Some(TransportDecoder::Udp) => TransportLayer::Udp(decode_udp(cursor)?),
        None => TransportLayer::Opaque {
            protocol: ip.protocol,
        },
    });

    Ok(layers)
}

#[cfg(test)]
mod tests {
    use super::{LinkLayer, NetworkLayer, TransportLayer, decode_layers};
    use crate::cursor::ByteCursor;
    use crate::error::DecodeError;

    fn ethernet(ethertype: u16) -> Vec<u8> {
        let mut bytes = vec![0x11; 6];
        bytes.extend_from_slice(&[0x22; 6]);
        bytes.extend_from_slice(&ethertype.to_be_bytes());
        bytes
    }

    fn ipv4(protocol: u8, fragment: [u8; 2]) -> Vec<u8> {
        let mut bytes = vec![0u8; 20];
        bytes[0] = 0x45;
        bytes[6..8].copy_from_slice(&fragment);
        bytes[8] = 64;
        bytes[9] = protocol;
        bytes[12..16].copy_from_slice(&[10, 0, 0, 1]);
        bytes[16..20].copy_from_slice(&[10, 0, 0, 2]);
        bytes
    }

    #[test]
    fn ethernet_ipv4_udp_chain() {
        let mut frame = ethernet(0x0800);
        frame.extend(ipv4(17, [0x40, 0x00]));
        frame.extend_from_slice(&[0x04, 0xd2, 0x16, 0x2e, 0x00, 0x0c, 0x00, 0x00]);
        frame.extend_from_slice(b"ping");

        let mut cursor = ByteCursor::new(&frame);
        let layers = decode_layers(1, &mut cursor).unwrap();
        assert!(matches!(layers.link, LinkLayer::Ethernet(_)));
        assert!(matches!(layers.network, Some(NetworkLayer::Ipv4(_))));
        match layers.transport {
            Some(TransportLayer::Udp(udp)) => {
                assert_eq!(udp.src_port, 1234);
                assert_eq!(udp.dst_port, 5678);
            }
            other => panic!("expected udp, got {other:?}"),
        }
        assert_eq!(cursor.remaining(), 4);
    }

    #[test]
    fn unknown_ethertype_is_opaque() {
        let mut frame = ethernet(0x86dd);
        frame.extend_from_slice(&[0u8; 40]);
        let mut cursor = ByteCursor::new(&frame);
        let layers = decode_layers(1, &mut cursor).unwrap();
        assert_eq!(
            layers.network,
            Some(NetworkLayer::Opaque { ethertype: 0x86dd })
        );
        assert_eq!(layers.transport, None);
        assert_eq!(cursor.position(), 14);
    }

    #[test]
    fn unknown_protocol_is_opaque() {
        let mut frame = ethernet(0x0800);
        frame.extend(ipv4(6, [0x40, 0x00]));
        let mut cursor = ByteCursor::new(&frame);
        let layers = decode_layers(1, &mut cursor).unwrap();
        assert_eq!(layers.transport, Some(TransportLayer::Opaque { protocol: 6 }));
        assert!(cursor.is_at_end());
    }

    #[test]
    fn trailing_fragment_has_no_transport_header() {
        let mut frame = ethernet(0x0800);
        frame.extend(ipv4(17, [0x20, 0x01]));
        frame.extend_from_slice(&[0u8; 8]);
        let mut cursor = ByteCursor::new(&frame);
        let layers = decode_layers(1, &mut cursor).unwrap();
        assert_eq!(layers.transport, Some(TransportLayer::Opaque { protocol: 17 }));
        assert_eq!(cursor.remaining(), 8);
    }

    #[test]
    fn truncated_udp_header_propagates() {
        let mut frame = ethernet(0x0800);
        frame.extend(ipv4(17, [0x00, 0x00]));
        frame.extend_from_slice(&[0u8; 4]);
        let mut cursor = ByteCursor::new(&frame);
        let err = decode_layers(1, &mut cursor).unwrap_err();
        assert!(matches!(err, DecodeError::TruncatedBuffer { needed: 8, .. }));
    }
}
