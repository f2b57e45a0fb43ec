use std::borrow::Cow;

use tracing::{debug, trace};

use super::header::{CaptureHeader, decode_capture_header};
use super::layout;
use super::record::{RecordHeader, decode_record_header, validate_record_header};
use crate::cursor::ByteCursor;
use crate::error::{CaptureError, DecodeError, LengthMismatch};
use crate::protocols::ethernet::EthernetFrame;
use crate::protocols::ipv4::Ipv4Header;
use crate::protocols::udp::UdpHeader;
use crate::protocols::{Layers, LinkLayer, NetworkLayer, TransportLayer, decode_layers};

/// Bytes left in a record after its last decoded header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Payload<'a> {
    bytes: &'a [u8],
}

impl<'a> Payload<'a> {
    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Best-effort UTF-8 view; invalid sequences become U+FFFD.
    pub fn text(&self) -> Cow<'a, str> {
        String::from_utf8_lossy(self.bytes)
    }
}

/// One fully decoded record, borrowing the capture buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedRecord<'a> {
    /// Zero-based record number.
    pub index: u64,
    /// Buffer offset of the record header.
    pub offset: usize,
    pub header: RecordHeader,
    pub link: LinkLayer,
    pub network: Option<NetworkLayer>,
    pub transport: Option<TransportLayer>,
    pub payload: Payload<'a>,
}

impl DecodedRecord<'_> {
    pub fn ethernet(&self) -> Option<&EthernetFrame> {
        match &self.link {
            LinkLayer::Ethernet(frame) => Some(frame),
            LinkLayer::Opaque { .. } => None,
        }
    }

    pub fn ipv4(&self) -> Option<&Ipv4Header> {
        match &self.network {
            Some(NetworkLayer::Ipv4(ip)) => Some(ip),
            _ => None,
        }
    }

    pub fn udp(&self) -> Option<&UdpHeader> {
        match &self.transport {
            Some(TransportLayer::Udp(udp)) => Some(udp),
            _ => None,
        }
    }

    /// Bytes taken by the decoded layer headers.
    pub fn headers_len(&self) -> usize {
        self.header.caplen as usize - self.payload.len()
    }
}

#[derive(Debug, Clone, Copy)]
enum State {
    Header,
    Records(CaptureHeader),
    Finished(Option<CaptureHeader>),
}

/// Lazy decoder over an in-memory classic pcap capture.
///
/// The global header is decoded on first use, then each call yields one
/// record. Any error is returned once, with the number of records already
/// produced, and the reader yields nothing afterwards.
///
/// # Examples
/// ```
/// use pcapwalk_core::CaptureReader;
///
/// let mut capture = Vec::new();
/// capture.extend_from_slice(&0xa1b2_c3d4u32.to_le_bytes());
/// capture.extend_from_slice(&2u16.to_le_bytes());
/// capture.extend_from_slice(&4u16.to_le_bytes());
/// capture.extend_from_slice(&[0u8; 8]);
/// capture.extend_from_slice(&65535i32.to_le_bytes());
/// capture.extend_from_slice(&1i32.to_le_bytes());
///
/// let mut reader = CaptureReader::new(&capture);
/// assert_eq!(reader.header()?.snaplen, 65535);
/// assert!(reader.next_record()?.is_none());
/// # Ok::<(), pcapwalk_core::CaptureError>(())
/// ```
#[derive(Debug, Clone)]
pub struct CaptureReader<'a> {
    buf: &'a [u8],
    cursor: ByteCursor<'a>,
    state: State,
    records_decoded: u64,
}

impl<'a> CaptureReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            buf,
            cursor: ByteCursor::new(buf),
            state: State::Header,
            records_decoded: 0,
        }
    }

    /// Bytes consumed so far.
    pub fn position(&self) -> usize {
        self.cursor.position()
    }

    pub fn records_decoded(&self) -> u64 {
        self.records_decoded
    }

    /// Decode the global header if needed and return it.
    ///
    /// # Errors
    /// `TruncatedBuffer` for fewer than 24 bytes, `UnknownMagic` for an
    /// unrecognized magic number.
    pub fn header(&mut self) -> Result<CaptureHeader, CaptureError> {
        match self.state {
            State::Header => {
                let header =
                    checked_capture_header(&mut self.cursor).map_err(|err| self.fail(0, err))?;
                debug!(
                    magic = format_args!("{:#010x}", header.magic()),
                    version = format_args!("{}.{}", header.version_major, header.version_minor),
                    snaplen = header.snaplen,
                    linktype = header.linktype,
                    "capture header decoded"
                );
                self.state = State::Records(header);
                Ok(header)
            }
            State::Records(header) | State::Finished(Some(header)) => Ok(header),
            // Decoding is pure, so replaying it on the original bytes yields
            // the same failure.
            State::Finished(None) => {
                let source = match checked_capture_header(&mut ByteCursor::new(self.buf)) {
                    Ok(header) => return Ok(header),
                    Err(err) => err,
                };
                Err(CaptureError {
                    records_decoded: 0,
                    offset: 0,
                    source,
                })
            }
        }
    }

    /// Decode the next record, or `Ok(None)` at the clean end of the buffer.
    ///
    /// # Errors
    /// Returns `CaptureError` for truncated or inconsistent records; the
    /// reader is finished afterwards.
    pub fn next_record(&mut self) -> Result<Option<DecodedRecord<'a>>, CaptureError> {
        let capture = match self.state {
            State::Finished(_) => return Ok(None),
            State::Header => self.header()?,
            State::Records(header) => header,
        };

        if self.cursor.is_at_end() {
            debug!(records = self.records_decoded, "end of capture");
            self.state = State::Finished(Some(capture));
            return Ok(None);
        }

        let offset = self.cursor.position();
        match self.decode_record(&capture, offset) {
            Ok(record) => {
                self.records_decoded += 1;
                trace!(
                    index = record.index,
                    offset,
                    caplen = record.header.caplen,
                    len = record.header.len,
                    payload = record.payload.len(),
                    "record decoded"
                );
                Ok(Some(record))
            }
            Err(err) => Err(self.fail(offset, err)),
        }
    }

    fn decode_record(
        &mut self,
        capture: &CaptureHeader,
        offset: usize,
    ) -> Result<DecodedRecord<'a>, DecodeError> {
        let header = decode_record_header(&mut self.cursor, capture.byte_order())
            .map_err(truncated_capture)?;
        validate_record_header(&header, capture)?;

        let mut frame = self
            .cursor
            .split_to(header.caplen as usize)
            .map_err(truncated_capture)?;
        let Layers {
            link,
            network,
            transport,
        } = decode_layers(capture.linktype, &mut frame).map_err(|err| match err {
            DecodeError::TruncatedBuffer { .. } => LengthMismatch::HeadersExceedCaplen {
                caplen: header.caplen,
            }
            .into(),
            other => other,
        })?;
        let payload = Payload {
            bytes: frame.read_bytes(frame.remaining())?,
        };

        let consumed = frame.position();
        if consumed != header.caplen as usize {
            return Err(LengthMismatch::ConsumedMismatch {
                consumed,
                caplen: header.caplen,
            }
            .into());
        }

        Ok(DecodedRecord {
            index: self.records_decoded,
            offset,
            header,
            link,
            network,
            transport,
            payload,
        })
    }

    fn fail(&mut self, offset: usize, source: DecodeError) -> CaptureError {
        debug!(
            records = self.records_decoded,
            offset,
            error = %source,
            "capture decoding stopped"
        );
        self.state = match self.state {
            State::Records(header) => State::Finished(Some(header)),
            _ => State::Finished(None),
        };
        CaptureError {
            records_decoded: self.records_decoded,
            offset,
            source,
        }
    }
}

impl<'a> Iterator for CaptureReader<'a> {
    type Item = Result<DecodedRecord<'a>, CaptureError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record().transpose()
    }
}

fn checked_capture_header(cursor: &mut ByteCursor<'_>) -> Result<CaptureHeader, DecodeError> {
    let header = decode_capture_header(cursor)?;
    match header.magic_kind() {
        Some(_) => Ok(header),
        None => Err(DecodeError::UnknownMagic {
            magic: header.magic(),
        }),
    }
}

fn truncated_capture(err: DecodeError) -> DecodeError {
    match err {
        DecodeError::TruncatedBuffer {
            offset,
            needed,
            remaining,
        } => DecodeError::TruncatedCapture {
            offset,
            needed,
            remaining,
        },
        other => other,
    }
}
