use thiserror::Error;

/// Errors returned by the byte cursor, the header decoders and the layer
/// decoders.
///
/// # Examples
/// ```
/// use pcapwalk_core::DecodeError;
///
/// let err = DecodeError::TruncatedBuffer {
///     offset: 20,
///     needed: 4,
///     remaining: 2,
/// };
/// assert!(err.to_string().contains("truncated buffer"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("truncated buffer at offset {offset}: need {needed} bytes, {remaining} remaining")]
    TruncatedBuffer {
        offset: usize,
        needed: usize,
        remaining: usize,
    },
    #[error("capture ends mid-record at offset {offset}: need {needed} bytes, {remaining} remaining")]
    TruncatedCapture {
        offset: usize,
        needed: usize,
        remaining: usize,
    },
    #[error("inconsistent length: {0}")]
    InconsistentLength(#[from] LengthMismatch),
    #[error("invalid IPv4 header length: ihl {ihl} (minimum 5)")]
    InvalidHeaderLength { ihl: u8 },
    #[error("unknown capture magic: {magic:#010x}")]
    UnknownMagic { magic: u32 },
}

/// Cross-field length checks that a record can fail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LengthMismatch {
    #[error("caplen {caplen} exceeds original length {len}")]
    CaplenExceedsLen { caplen: u32, len: u32 },
    #[error("caplen {caplen} exceeds snaplen {snaplen}")]
    CaplenExceedsSnaplen { caplen: u32, snaplen: i32 },
    #[error("layer headers need more than caplen {caplen} bytes")]
    HeadersExceedCaplen { caplen: u32 },
    #[error("record consumed {consumed} bytes, caplen is {caplen}")]
    ConsumedMismatch { consumed: usize, caplen: u32 },
}

impl DecodeError {
    /// Stable, machine-friendly name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            DecodeError::TruncatedBuffer { .. } => "truncated_buffer",
            DecodeError::TruncatedCapture { .. } => "truncated_capture",
            DecodeError::InconsistentLength(_) => "inconsistent_length",
            DecodeError::InvalidHeaderLength { .. } => "invalid_header_length",
            DecodeError::UnknownMagic { .. } => "unknown_magic",
        }
    }
}

/// Error surfaced by `CaptureReader` when decoding stops.
///
/// Carries the number of records produced before the failure so callers can
/// tell how far the capture was readable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("decoding stopped after {records_decoded} records at offset {offset}: {source}")]
pub struct CaptureError {
    pub records_decoded: u64,
    pub offset: usize,
    #[source]
    pub source: DecodeError,
}
