//! pcapwalk core library: layered decoding of classic pcap captures.
//!
//! A capture is a 24-byte global header followed by (record header, frame)
//! pairs. `CaptureReader` decodes the global header once, then yields one
//! `DecodedRecord` per frame, running each frame through the protocol
//! dispatch (Ethernet, IPv4, UDP; anything else stays opaque). Decoding is
//! byte-oriented and side-effect free over an in-memory buffer; the only I/O
//! is `read_capture_file` in `source`.
//!
//! Invariants:
//! - Every read goes through `ByteCursor` and is bounds-checked.
//! - A record's layers plus payload consume exactly its `caplen`.
//! - `caplen <= len` and `caplen <= snaplen` hold for every record produced.
//! - On the first error the reader stops and reports how many records it
//!   produced; it never skips a bad record.
//!
//! # Examples
//! ```no_run
//! use std::path::Path;
//!
//! use pcapwalk_core::{CaptureReader, read_capture_file};
//!
//! let bytes = read_capture_file(Path::new("capture.pcap"))?;
//! let mut reader = CaptureReader::new(&bytes);
//! println!("linktype: {}", reader.header()?.linktype);
//! for record in reader {
//!     let record = record?;
//!     if let (Some(ip), Some(udp)) = (record.ipv4(), record.udp()) {
//!         println!("{}:{} -> {}:{}", ip.src, udp.src_port, ip.dst, udp.dst_port);
//!     }
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod capture;
mod cursor;
mod error;
pub mod protocols;
mod report;
mod source;

pub use capture::{
    CaptureHeader, CaptureReader, DecodedRecord, MagicKind, Payload, RecordHeader,
    TimestampPrecision, decode_capture_header, decode_record_header, validate_record_header,
};
pub use cursor::{ByteCursor, ByteOrder};
pub use error::{CaptureError, DecodeError, LengthMismatch};
pub use protocols::ethernet::{EthernetFrame, MacAddr};
pub use protocols::ipv4::Ipv4Header;
pub use protocols::udp::UdpHeader;
pub use protocols::{LinkLayer, NetworkLayer, TransportLayer};
pub use report::{
    CaptureInfo, ErrorInfo, InputInfo, REPORT_VERSION, RecordEntry, Report, ReportOptions,
    ToolInfo, build_report, decode_capture_file, make_stub_report,
};
pub use source::{SourceError, read_capture_file};
