//! Classic pcap container decoding.
//!
//! The global header is decoded once, then each record header is decoded and
//! validated against it before its frame is handed to the protocol layers.
//! Offsets and magic values live in `layout`; `header` and `record` only
//! parse, while `reader` owns the cross-field checks and the record loop.

pub mod header;
pub mod layout;
pub mod reader;
pub mod record;

pub use header::{CaptureHeader, MagicKind, TimestampPrecision, decode_capture_header};
pub use reader::{CaptureReader, DecodedRecord, Payload};
pub use record::{RecordHeader, decode_record_header, validate_record_header};
