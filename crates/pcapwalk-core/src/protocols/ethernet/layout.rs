pub const MAC_LEN: usize = 6;
pub const HEADER_LEN: usize = 2 * MAC_LEN + 2;

pub const ETHERTYPE_IPV4: u16 = 0x0800;
