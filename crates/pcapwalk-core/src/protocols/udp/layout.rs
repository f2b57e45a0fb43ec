pub const HEADER_LEN: usize = 8;
