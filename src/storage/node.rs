//! Node codec: typed field accessors over raw page bytes.
//!
//! Every function here is a pure read or write at a fixed offset of a
//! single [`PageBuf`]; nothing allocates and nothing touches the pager.
//! Tree logic composes these into whole operations.

use crate::storage::layout::*;
use crate::types::error::{DatabaseError, Result};
use crate::types::{PageBuf, PageNum, INVALID_PAGE_NUM, NO_SIBLING};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    Internal,
    Leaf,
}

impl NodeType {
    pub fn from_u8(value: u8) -> Result<Self> {
        match value {
            0 => Ok(NodeType::Internal),
            1 => Ok(NodeType::Leaf),
            _ => Err(DatabaseError::UnknownNodeType(value)),
        }
    }

    pub fn as_u8(&self) -> u8 {
        match self {
            NodeType::Internal => 0,
            NodeType::Leaf => 1,
        }
    }
}

fn read_u32(page: &PageBuf, offset: usize) -> u32 {
    u32::from_le_bytes([
        page[offset],
        page[offset + 1],
        page[offset + 2],
        page[offset + 3],
    ])
}

fn write_u32(page: &mut PageBuf, offset: usize, value: u32) {
    page[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}

// Common header

pub fn node_type(page: &PageBuf) -> Result<NodeType> {
    NodeType::from_u8(page[NODE_TYPE_OFFSET])
}

pub fn set_node_type(page: &mut PageBuf, node_type: NodeType) {
    page[NODE_TYPE_OFFSET] = node_type.as_u8();
}

pub fn is_root(page: &PageBuf) -> bool {
    page[IS_ROOT_OFFSET] != 0
}

pub fn set_root(page: &mut PageBuf, is_root: bool) {
    page[IS_ROOT_OFFSET] = is_root as u8;
}

pub fn parent(page: &PageBuf) -> PageNum {
    read_u32(page, PARENT_POINTER_OFFSET)
}

pub fn set_parent(page: &mut PageBuf, parent: PageNum) {
    write_u32(page, PARENT_POINTER_OFFSET, parent);
}

// Leaf nodes

pub fn init_leaf(page: &mut PageBuf) {
    set_node_type(page, NodeType::Leaf);
    set_root(page, false);
    set_leaf_num_cells(page, 0);
    set_leaf_next(page, NO_SIBLING);
}

pub fn leaf_num_cells(page: &PageBuf) -> u32 {
    read_u32(page, LEAF_NODE_NUM_CELLS_OFFSET)
}

pub fn set_leaf_num_cells(page: &mut PageBuf, num_cells: u32) {
    write_u32(page, LEAF_NODE_NUM_CELLS_OFFSET, num_cells);
}

pub fn leaf_next(page: &PageBuf) -> PageNum {
    read_u32(page, LEAF_NODE_NEXT_LEAF_OFFSET)
}

pub fn set_leaf_next(page: &mut PageBuf, next: PageNum) {
    write_u32(page, LEAF_NODE_NEXT_LEAF_OFFSET, next);
}

fn leaf_cell_offset(cell_num: u32) -> usize {
    LEAF_NODE_HEADER_SIZE + cell_num as usize * LEAF_NODE_CELL_SIZE
}

pub fn leaf_key(page: &PageBuf, cell_num: u32) -> u32 {
    read_u32(page, leaf_cell_offset(cell_num))
}

pub fn set_leaf_key(page: &mut PageBuf, cell_num: u32, key: u32) {
    write_u32(page, leaf_cell_offset(cell_num), key);
}

pub fn leaf_value(page: &PageBuf, cell_num: u32) -> &[u8] {
    let offset = leaf_cell_offset(cell_num) + LEAF_NODE_KEY_SIZE;
    &page[offset..offset + LEAF_NODE_VALUE_SIZE]
}

pub fn leaf_value_mut(page: &mut PageBuf, cell_num: u32) -> &mut [u8] {
    let offset = leaf_cell_offset(cell_num) + LEAF_NODE_KEY_SIZE;
    &mut page[offset..offset + LEAF_NODE_VALUE_SIZE]
}

/// Copy a whole cell out. Cell moves during inserts and splits go through
/// this owned copy so source and destination pages never alias.
pub fn leaf_cell(page: &PageBuf, cell_num: u32) -> [u8; LEAF_NODE_CELL_SIZE] {
    let offset = leaf_cell_offset(cell_num);
    let mut cell = [0u8; LEAF_NODE_CELL_SIZE];
    cell.copy_from_slice(&page[offset..offset + LEAF_NODE_CELL_SIZE]);
    cell
}

pub fn set_leaf_cell(page: &mut PageBuf, cell_num: u32, cell: &[u8; LEAF_NODE_CELL_SIZE]) {
    let offset = leaf_cell_offset(cell_num);
    page[offset..offset + LEAF_NODE_CELL_SIZE].copy_from_slice(cell);
}

/// Lower-bound search: smallest cell index whose key is >= `key`, which
/// is the key's slot when present and its insertion slot when absent.
pub fn leaf_find_slot(page: &PageBuf, key: u32) -> u32 {
    let mut low = 0;
    let mut high = leaf_num_cells(page);
    while low != high {
        let mid = low + (high - low) / 2;
        if leaf_key(page, mid) >= key {
            high = mid;
        } else {
            low = mid + 1;
        }
    }
    low
}

// Internal nodes

pub fn init_internal(page: &mut PageBuf) {
    set_node_type(page, NodeType::Internal);
    set_root(page, false);
    set_internal_num_keys(page, 0);
    // The zeroed right-child field would otherwise point at page 0, the
    // root, making this node the root's parent.
    set_internal_right_child(page, INVALID_PAGE_NUM);
}

pub fn internal_num_keys(page: &PageBuf) -> u32 {
    read_u32(page, INTERNAL_NODE_NUM_KEYS_OFFSET)
}

pub fn set_internal_num_keys(page: &mut PageBuf, num_keys: u32) {
    write_u32(page, INTERNAL_NODE_NUM_KEYS_OFFSET, num_keys);
}

pub fn internal_right_child(page: &PageBuf) -> PageNum {
    read_u32(page, INTERNAL_NODE_RIGHT_CHILD_OFFSET)
}

pub fn set_internal_right_child(page: &mut PageBuf, child: PageNum) {
    write_u32(page, INTERNAL_NODE_RIGHT_CHILD_OFFSET, child);
}

fn internal_cell_offset(cell_num: u32) -> usize {
    INTERNAL_NODE_HEADER_SIZE + cell_num as usize * INTERNAL_NODE_CELL_SIZE
}

pub fn internal_left_child(page: &PageBuf, cell_num: u32) -> PageNum {
    read_u32(page, internal_cell_offset(cell_num))
}

pub fn set_internal_left_child(page: &mut PageBuf, cell_num: u32, child: PageNum) {
    write_u32(page, internal_cell_offset(cell_num), child);
}

pub fn internal_key(page: &PageBuf, key_num: u32) -> u32 {
    read_u32(page, internal_cell_offset(key_num) + INTERNAL_NODE_CHILD_SIZE)
}

pub fn set_internal_key(page: &mut PageBuf, key_num: u32, key: u32) {
    write_u32(
        page,
        internal_cell_offset(key_num) + INTERNAL_NODE_CHILD_SIZE,
        key,
    );
}

pub fn internal_cell(page: &PageBuf, cell_num: u32) -> [u8; INTERNAL_NODE_CELL_SIZE] {
    let offset = internal_cell_offset(cell_num);
    let mut cell = [0u8; INTERNAL_NODE_CELL_SIZE];
    cell.copy_from_slice(&page[offset..offset + INTERNAL_NODE_CELL_SIZE]);
    cell
}

pub fn set_internal_cell(page: &mut PageBuf, cell_num: u32, cell: &[u8; INTERNAL_NODE_CELL_SIZE]) {
    let offset = internal_cell_offset(cell_num);
    page[offset..offset + INTERNAL_NODE_CELL_SIZE].copy_from_slice(cell);
}

/// Child pointer by position: index `num_keys` resolves to the right
/// child, anything below it to that cell's left child. Dereferencing a
/// pointer still marked [`INVALID_PAGE_NUM`] is a structural error.
pub fn internal_child(page: &PageBuf, page_num: PageNum, child_num: u32) -> Result<PageNum> {
    let num_keys = internal_num_keys(page);
    let child = if child_num == num_keys {
        internal_right_child(page)
    } else {
        internal_left_child(page, child_num)
    };

    if child == INVALID_PAGE_NUM {
        return Err(DatabaseError::InvalidChild { page_num });
    }
    Ok(child)
}

/// Index of the child whose subtree should contain `key`. An exact match
/// on a separator resolves to its left child, which owns the "<=" range.
pub fn internal_find_child(page: &PageBuf, key: u32) -> u32 {
    let mut low = 0;
    let mut high = internal_num_keys(page);
    while low != high {
        let mid = low + (high - low) / 2;
        if internal_key(page, mid) >= key {
            high = mid;
        } else {
            low = mid + 1;
        }
    }
    low
}
