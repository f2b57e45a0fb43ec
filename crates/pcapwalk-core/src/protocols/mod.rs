//! Protocol layer decoders.
//!
//! Each protocol follows a layered structure:
//! - `layout`: byte widths, masks and well-known numbers (source of truth)
//! - `parser`: domain-level decoding through `ByteCursor` (no direct indexing)
//!
//! `dispatch` chains them: linktype selects the link decoder, ethertype the
//! network decoder, IP protocol the transport decoder. Unknown numbers end the
//! chain with an opaque variant instead of an error.

pub mod dispatch;
pub mod ethernet;
pub mod ipv4;
pub mod udp;

pub use dispatch::{Layers, LinkLayer, NetworkLayer, TransportLayer, decode_layers};
