pub const MIN_HEADER_LEN: usize = 20;
pub const MIN_IHL: u8 = 5;
pub const IHL_WORD_LEN: usize = 4;

pub const VERSION_SHIFT: u32 = 4;
pub const IHL_MASK: u8 = 0x0f;

pub const FRAGMENT_OFFSET_BITS: u32 = 13;
pub const FRAGMENT_OFFSET_MASK: u16 = (1 << FRAGMENT_OFFSET_BITS) - 1;

pub const FLAG_DONT_FRAGMENT: u8 = 0b010;
pub const FLAG_MORE_FRAGMENTS: u8 = 0b001;

pub const PROTOCOL_UDP: u8 = 17;
