//! IPv4 network-layer decoding.
//!
//! Version and IHL share the first byte; flags and fragment offset share
//! bytes 6..8. Both pairs are split with shifts and masks from `layout`.
//! The header is validated (IHL >= 5, whole header present) before any byte
//! is consumed, and options past the fixed 20 bytes are skipped, not parsed.

pub mod layout;
pub mod parser;

pub use parser::{Ipv4Header, decode_ipv4, split_flags_fragment, split_version_ihl};
