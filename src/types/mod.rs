pub mod error;
pub mod row;

// Common type aliases
pub type PageNum = u32;

/// One in-memory page buffer, bit-identical to its on-disk form.
pub type PageBuf = [u8; PAGE_SIZE];

pub const PAGE_SIZE: usize = 4096;
pub const TABLE_MAX_PAGES: usize = 100;

/// Sentinel for a right-child pointer that has not been assigned yet.
pub const INVALID_PAGE_NUM: PageNum = u32::MAX;

/// Sentinel in a leaf's next-leaf field: page 0 is always the root, so it
/// can never be another leaf's sibling.
pub const NO_SIBLING: PageNum = 0;
