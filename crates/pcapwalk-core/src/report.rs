use std::path::Path;

use serde::Serialize;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use tracing::warn;

use crate::capture::{CaptureHeader, CaptureReader, DecodedRecord, TimestampPrecision};
use crate::cursor::ByteOrder;
use crate::error::CaptureError;
use crate::protocols::{LinkLayer, NetworkLayer, TransportLayer};
use crate::source::{SourceError, read_capture_file};

/// Current report schema version.
pub const REPORT_VERSION: u32 = 1;

/// Knobs for report generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportOptions {
    /// Stop after this many records.
    pub limit: Option<u64>,
    /// Include the best-effort text view of each payload.
    pub include_payload: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            limit: None,
            include_payload: true,
        }
    }
}

/// Serializable view of a decoded capture.
///
/// A decoding failure does not discard the records before it: they are kept
/// and the failure is described in `error`.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    /// Report schema version (not the binary version).
    pub report_version: u32,
    pub tool: ToolInfo,
    pub input: InputInfo,
    /// Absent when the global header itself could not be decoded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capture: Option<CaptureInfo>,
    pub records: Vec<RecordEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolInfo {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct InputInfo {
    /// Input path as provided to the decoder.
    pub path: String,
    pub bytes: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CaptureInfo {
    /// Magic number as `0x`-prefixed hex of the little-endian read.
    pub magic: String,
    pub byte_order: ByteOrder,
    pub precision: TimestampPrecision,
    /// `major.minor`.
    pub version: String,
    pub thiszone: i32,
    pub sigfigs: i32,
    pub snaplen: i32,
    pub linktype: i32,
}

impl From<&CaptureHeader> for CaptureInfo {
    fn from(header: &CaptureHeader) -> Self {
        Self {
            magic: format!("{:#010x}", header.magic()),
            byte_order: header.byte_order(),
            precision: header.timestamp_precision(),
            version: format!("{}.{}", header.version_major, header.version_minor),
            thiszone: header.thiszone,
            sigfigs: header.sigfigs,
            snaplen: header.snaplen,
            linktype: header.linktype,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RecordEntry {
    pub index: u64,
    pub offset: usize,
    /// RFC 3339 UTC timestamp, when representable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    pub ts_sec: i32,
    pub ts_usec: i32,
    pub caplen: u32,
    pub len: u32,
    pub link: LinkLayer,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network: Option<NetworkLayer>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transport: Option<TransportLayer>,
    pub payload_len: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload_text: Option<String>,
}

impl RecordEntry {
    fn new(record: &DecodedRecord<'_>, precision: TimestampPrecision, payload: bool) -> Self {
        Self {
            index: record.index,
            offset: record.offset,
            timestamp: ts_to_rfc3339(record.header.timestamp_nanos(precision)),
            ts_sec: record.header.ts_sec,
            ts_usec: record.header.ts_usec,
            caplen: record.header.caplen,
            len: record.header.len,
            link: record.link,
            network: record.network,
            transport: record.transport,
            payload_len: record.payload.len(),
            payload_text: payload.then(|| record.payload.text().into_owned()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorInfo {
    /// Stable error kind (e.g. `truncated_capture`).
    pub kind: String,
    pub message: String,
    pub records_decoded: u64,
    pub offset: usize,
}

impl From<&CaptureError> for ErrorInfo {
    fn from(err: &CaptureError) -> Self {
        Self {
            kind: err.source.kind().to_string(),
            message: err.source.to_string(),
            records_decoded: err.records_decoded,
            offset: err.offset,
        }
    }
}

/// Build a report with base fields filled and no capture data.
///
/// # Examples
/// ```
/// use pcapwalk_core::make_stub_report;
///
/// let report = make_stub_report("capture.pcap", 24);
/// assert_eq!(report.report_version, pcapwalk_core::REPORT_VERSION);
/// assert!(report.records.is_empty());
/// ```
pub fn make_stub_report(input_path: &str, input_bytes: u64) -> Report {
    Report {
        report_version: REPORT_VERSION,
        tool: ToolInfo {
            name: "pcapwalk".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        input: InputInfo {
            path: input_path.to_string(),
            bytes: input_bytes,
        },
        capture: None,
        records: vec![],
        error: None,
    }
}

/// Decode `bytes` into a report, consuming records lazily.
pub fn build_report(input_path: &str, bytes: &[u8], options: &ReportOptions) -> Report {
    let mut report = make_stub_report(input_path, bytes.len() as u64);
    let mut reader = CaptureReader::new(bytes);

    let header = match reader.header() {
        Ok(header) => header,
        Err(err) => {
            warn!(error = %err, "capture header rejected");
            report.error = Some(ErrorInfo::from(&err));
            return report;
        }
    };
    report.capture = Some(CaptureInfo::from(&header));
    let precision = header.timestamp_precision();

    while options
        .limit
        .is_none_or(|limit| reader.records_decoded() < limit)
    {
        match reader.next_record() {
            Ok(Some(record)) => {
                report
                    .records
                    .push(RecordEntry::new(&record, precision, options.include_payload));
            }
            Ok(None) => break,
            Err(err) => {
                warn!(error = %err, "capture decoding stopped early");
                report.error = Some(ErrorInfo::from(&err));
                break;
            }
        }
    }
    report
}

/// Read a capture file and decode it into a report.
///
/// # Errors
/// Only I/O failures are errors; decoding failures are recorded in
/// `Report::error`.
pub fn decode_capture_file(path: &Path, options: &ReportOptions) -> Result<Report, SourceError> {
    let bytes = read_capture_file(path)?;
    Ok(build_report(&path.display().to_string(), &bytes, options))
}

fn ts_to_rfc3339(nanos: i128) -> Option<String> {
    OffsetDateTime::from_unix_timestamp_nanos(nanos)
        .ok()
        .and_then(|dt| dt.format(&Rfc3339).ok())
}

#[cfg(test)]
mod tests {
    use super::{ReportOptions, build_report, ts_to_rfc3339};

    fn capture(records: &[&[u8]]) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&0xa1b2_c3d4u32.to_le_bytes());
        bytes.extend_from_slice(&2u16.to_le_bytes());
        bytes.extend_from_slice(&4u16.to_le_bytes());
        bytes.extend_from_slice(&[0u8; 8]);
        bytes.extend_from_slice(&65535i32.to_le_bytes());
        bytes.extend_from_slice(&147i32.to_le_bytes());
        for frame in records {
            bytes.extend_from_slice(&1_700_000_000i32.to_le_bytes());
            bytes.extend_from_slice(&500_000i32.to_le_bytes());
            bytes.extend_from_slice(&(frame.len() as u32).to_le_bytes());
            bytes.extend_from_slice(&(frame.len() as u32).to_le_bytes());
            bytes.extend_from_slice(frame);
        }
        bytes
    }

    #[test]
    fn timestamp_formats_as_rfc3339() {
        let ts = ts_to_rfc3339(1_500_000_000).unwrap();
        assert_eq!(ts, "1970-01-01T00:00:01.5Z");
    }

    #[test]
    fn report_lists_records_and_header() {
        let bytes = capture(&[b"first", b"second"]);
        let report = build_report("mem.pcap", &bytes, &ReportOptions::default());
        assert!(report.error.is_none());
        let capture = report.capture.as_ref().unwrap();
        assert_eq!(capture.magic, "0xa1b2c3d4");
        assert_eq!(capture.version, "2.4");
        assert_eq!(report.records.len(), 2);
        assert_eq!(report.records[1].payload_text.as_deref(), Some("second"));
        assert_eq!(
            report.records[0].timestamp.as_deref(),
            Some("2023-11-14T22:13:20.5Z")
        );

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["records"][0]["link"]["kind"], "opaque");
        assert_eq!(value["records"][0]["link"]["linktype"], 147);
        assert!(value["records"][0].get("network").is_none());
        assert!(value.get("error").is_none());
    }

    #[test]
    fn report_respects_limit_and_payload_flag() {
        let bytes = capture(&[b"a", b"b", b"c"]);
        let options = ReportOptions {
            limit: Some(2),
            include_payload: false,
        };
        let report = build_report("mem.pcap", &bytes, &options);
        assert_eq!(report.records.len(), 2);
        assert!(report.records[0].payload_text.is_none());
        assert_eq!(report.records[0].payload_len, 1);
    }

    #[test]
    fn report_keeps_records_before_error() {
        let mut bytes = capture(&[b"ok"]);
        bytes.extend_from_slice(&[0u8; 5]);
        let report = build_report("mem.pcap", &bytes, &ReportOptions::default());
        assert_eq!(report.records.len(), 1);
        let error = report.error.unwrap();
        assert_eq!(error.kind, "truncated_capture");
        assert_eq!(error.records_decoded, 1);
    }

    #[test]
    fn report_without_header_has_no_capture() {
        let report = build_report("mem.pcap", &[0xd4, 0xc3], &ReportOptions::default());
        assert!(report.capture.is_none());
        assert_eq!(report.error.unwrap().kind, "truncated_buffer");
    }
}
