pub const CAPTURE_HEADER_LEN: usize = 24;
pub const RECORD_HEADER_LEN: usize = 16;

pub const MAGIC_MICROS: u32 = 0xa1b2_c3d4;
pub const MAGIC_NANOS: u32 = 0xa1b2_3c4d;
pub const MAGIC_MICROS_SWAPPED: u32 = 0xd4c3_b2a1;
pub const MAGIC_NANOS_SWAPPED: u32 = 0x4d3c_b2a1;

pub const LINKTYPE_ETHERNET: i32 = 1;

pub const NANOS_PER_SECOND: i128 = 1_000_000_000;
pub const NANOS_PER_MICRO: i128 = 1_000;
