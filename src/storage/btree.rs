//! B+-tree operations over pages served by the [`Pager`].
//!
//! Nodes refer to each other by page number, never by address; the pager
//! is the arena and every function here borrows one page at a time,
//! moving cells between pages through owned copies. Splits propagate
//! upward: a full leaf spawns a sibling, a full internal node spawns a
//! sibling, and splitting the root recycles page 0 in place so the root
//! page number never changes.

use std::fmt::Write;

use crate::storage::layout::{
    INTERNAL_NODE_MAX_KEYS, LEAF_NODE_LEFT_SPLIT_COUNT, LEAF_NODE_MAX_CELLS,
    LEAF_NODE_RIGHT_SPLIT_COUNT,
};
use crate::storage::node::{self, NodeType};
use crate::storage::pager::Pager;
use crate::types::error::{DatabaseError, Result};
use crate::types::row::Row;
use crate::types::{PageBuf, PageNum, INVALID_PAGE_NUM};

/// Position of one cell in the tree, or one past the last.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    pub page_num: PageNum,
    pub cell_num: u32,
    pub end_of_table: bool,
}

/// Descend from `root_page_num` to the leaf position for `key`. When the
/// key is absent the cursor lands on its insertion slot.
pub fn table_find(pager: &mut Pager, root_page_num: PageNum, key: u32) -> Result<Cursor> {
    match node::node_type(pager.get(root_page_num)?)? {
        NodeType::Leaf => leaf_node_find(pager, root_page_num, key),
        NodeType::Internal => internal_node_find(pager, root_page_num, key),
    }
}

fn leaf_node_find(pager: &mut Pager, page_num: PageNum, key: u32) -> Result<Cursor> {
    let page = pager.get(page_num)?;
    Ok(Cursor {
        page_num,
        cell_num: node::leaf_find_slot(page, key),
        end_of_table: false,
    })
}

fn internal_node_find(pager: &mut Pager, page_num: PageNum, key: u32) -> Result<Cursor> {
    let page = pager.get(page_num)?;
    let child_index = node::internal_find_child(page, key);
    let child_num = node::internal_child(page, page_num, child_index)?;

    match node::node_type(pager.get(child_num)?)? {
        NodeType::Leaf => leaf_node_find(pager, child_num, key),
        NodeType::Internal => internal_node_find(pager, child_num, key),
    }
}

/// Largest key in the subtree rooted at `page_num`. Internal keys are
/// only separators, so the true maximum lives down the right spine.
fn node_max_key(pager: &mut Pager, page_num: PageNum) -> Result<u32> {
    let page = pager.get(page_num)?;
    match node::node_type(page)? {
        NodeType::Leaf => Ok(node::leaf_key(page, node::leaf_num_cells(page) - 1)),
        NodeType::Internal => {
            let right_child = node::internal_right_child(page);
            if right_child == INVALID_PAGE_NUM {
                return Err(DatabaseError::InvalidChild { page_num });
            }
            node_max_key(pager, right_child)
        }
    }
}

/// Insert `(key, row)` at the cursor position, splitting the leaf when it
/// is already at capacity. The caller has ruled out duplicates.
pub fn leaf_node_insert(pager: &mut Pager, cursor: Cursor, key: u32, row: &Row) -> Result<()> {
    let page = pager.get(cursor.page_num)?;
    let num_cells = node::leaf_num_cells(page);
    if num_cells as usize >= LEAF_NODE_MAX_CELLS {
        return leaf_node_split_and_insert(pager, cursor, key, row);
    }

    // Make room for the new cell.
    for i in ((cursor.cell_num + 1)..=num_cells).rev() {
        let cell = node::leaf_cell(page, i - 1);
        node::set_leaf_cell(page, i, &cell);
    }

    node::set_leaf_num_cells(page, num_cells + 1);
    node::set_leaf_key(page, cursor.cell_num, key);
    row.serialize(node::leaf_value_mut(page, cursor.cell_num));
    Ok(())
}

/// Split a full leaf: allocate a right sibling, deal the existing cells
/// plus the incoming one evenly across both halves, relink the sibling
/// chain, then hand the new node to the parent (or grow a new root).
fn leaf_node_split_and_insert(pager: &mut Pager, cursor: Cursor, key: u32, row: &Row) -> Result<()> {
    let old_page_num = cursor.page_num;
    let old_max = node_max_key(pager, old_page_num)?;

    let new_page_num = pager.unused_page_num();
    node::init_leaf(pager.get(new_page_num)?);

    // The old node's parent and sibling become the new node's; the old
    // node now points at the new one.
    let old_parent = node::parent(pager.get(old_page_num)?);
    let old_next = node::leaf_next(pager.get(old_page_num)?);
    {
        let new_page = pager.get(new_page_num)?;
        node::set_parent(new_page, old_parent);
        node::set_leaf_next(new_page, old_next);
    }
    node::set_leaf_next(pager.get(old_page_num)?, new_page_num);

    // Deal all MAX+1 logical cells from the highest slot down so nothing
    // in the old node is overwritten before it has been moved.
    for i in (0..=LEAF_NODE_MAX_CELLS).rev() {
        let dest_page_num = if i >= LEAF_NODE_LEFT_SPLIT_COUNT {
            new_page_num
        } else {
            old_page_num
        };
        let dest_index = (i % LEAF_NODE_LEFT_SPLIT_COUNT) as u32;

        if i as u32 == cursor.cell_num {
            let dest = pager.get(dest_page_num)?;
            node::set_leaf_key(dest, dest_index, key);
            row.serialize(node::leaf_value_mut(dest, dest_index));
        } else if i as u32 > cursor.cell_num {
            let cell = node::leaf_cell(pager.get(old_page_num)?, i as u32 - 1);
            node::set_leaf_cell(pager.get(dest_page_num)?, dest_index, &cell);
        } else {
            let cell = node::leaf_cell(pager.get(old_page_num)?, i as u32);
            node::set_leaf_cell(pager.get(dest_page_num)?, dest_index, &cell);
        }
    }

    node::set_leaf_num_cells(pager.get(old_page_num)?, LEAF_NODE_LEFT_SPLIT_COUNT as u32);
    node::set_leaf_num_cells(pager.get(new_page_num)?, LEAF_NODE_RIGHT_SPLIT_COUNT as u32);

    if node::is_root(pager.get(old_page_num)?) {
        create_new_root(pager, old_page_num, new_page_num)
    } else {
        let parent_page_num = node::parent(pager.get(old_page_num)?);
        let new_max = node_max_key(pager, old_page_num)?;
        update_internal_node_key(pager.get(parent_page_num)?, old_max, new_max);
        internal_node_insert(pager, parent_page_num, new_page_num)
    }
}

/// Replace the separator that tracked `old_key` with `new_key`.
fn update_internal_node_key(page: &mut PageBuf, old_key: u32, new_key: u32) {
    let index = node::internal_find_child(page, old_key);
    node::set_internal_key(page, index, new_key);
}

/// Add a `(child, key)` entry to `parent`, keyed by the child's subtree
/// maximum. A child larger than the current right child swaps through the
/// right-child slot instead of landing in a cell directly.
fn internal_node_insert(
    pager: &mut Pager,
    parent_page_num: PageNum,
    child_page_num: PageNum,
) -> Result<()> {
    let child_max = node_max_key(pager, child_page_num)?;
    let index = node::internal_find_child(pager.get(parent_page_num)?, child_max);

    let original_num_keys = node::internal_num_keys(pager.get(parent_page_num)?);
    if original_num_keys as usize >= INTERNAL_NODE_MAX_KEYS {
        return internal_node_split_and_insert(pager, parent_page_num, child_page_num);
    }

    let right_child_page_num = node::internal_right_child(pager.get(parent_page_num)?);
    if right_child_page_num == INVALID_PAGE_NUM {
        // Freshly initialized node: the first child becomes its right
        // child and no key is needed yet.
        node::set_internal_right_child(pager.get(parent_page_num)?, child_page_num);
        return Ok(());
    }

    let right_child_max = node_max_key(pager, right_child_page_num)?;

    let parent = pager.get(parent_page_num)?;
    node::set_internal_num_keys(parent, original_num_keys + 1);

    if child_max > right_child_max {
        // The new child is the rightmost: demote the current right child
        // into the last cell and take its place.
        node::set_internal_left_child(parent, original_num_keys, right_child_page_num);
        node::set_internal_key(parent, original_num_keys, right_child_max);
        node::set_internal_right_child(parent, child_page_num);
    } else {
        for i in ((index + 1)..=original_num_keys).rev() {
            let cell = node::internal_cell(parent, i - 1);
            node::set_internal_cell(parent, i, &cell);
        }
        node::set_internal_left_child(parent, index, child_page_num);
        node::set_internal_key(parent, index, child_max);
    }
    Ok(())
}

/// Split a full internal node while absorbing one more child.
///
/// The upper half of the node (right child first, then the keys above the
/// midpoint) moves into a new sibling, the cell below the midpoint is
/// promoted to the old node's right child, and the incoming child lands
/// in whichever half owns its key range. Every moved child gets its
/// parent pointer rewritten.
fn internal_node_split_and_insert(
    pager: &mut Pager,
    parent_page_num: PageNum,
    child_page_num: PageNum,
) -> Result<()> {
    let mut old_page_num = parent_page_num;
    let old_max = node_max_key(pager, old_page_num)?;
    let child_max = node_max_key(pager, child_page_num)?;

    let new_page_num = pager.unused_page_num();
    let splitting_root = node::is_root(pager.get(old_page_num)?);

    let parent_of_split: PageNum;
    if splitting_root {
        // The old node's content now lives in the new root's left child;
        // the new page is already wired in as its right child.
        create_new_root(pager, old_page_num, new_page_num)?;
        parent_of_split = old_page_num;
        old_page_num = node::internal_left_child(pager.get(parent_of_split)?, 0);
    } else {
        parent_of_split = node::parent(pager.get(old_page_num)?);
        node::init_internal(pager.get(new_page_num)?);
    }

    // Move the right child over first and leave the old node's right
    // pointer unassigned until a replacement is promoted below.
    let moved_right_child = node::internal_right_child(pager.get(old_page_num)?);
    internal_node_insert(pager, new_page_num, moved_right_child)?;
    node::set_parent(pager.get(moved_right_child)?, new_page_num);
    node::set_internal_right_child(pager.get(old_page_num)?, INVALID_PAGE_NUM);

    // Keys above the midpoint follow it into the new node.
    let mid = INTERNAL_NODE_MAX_KEYS / 2;
    for i in ((mid + 1)..INTERNAL_NODE_MAX_KEYS).rev() {
        let moved_child = node::internal_left_child(pager.get(old_page_num)?, i as u32);
        internal_node_insert(pager, new_page_num, moved_child)?;
        node::set_parent(pager.get(moved_child)?, new_page_num);

        let old_node = pager.get(old_page_num)?;
        let num_keys = node::internal_num_keys(old_node);
        node::set_internal_num_keys(old_node, num_keys - 1);
    }

    // Promote the cell below the midpoint to be the old node's right
    // child.
    {
        let old_node = pager.get(old_page_num)?;
        let num_keys = node::internal_num_keys(old_node);
        let promoted = node::internal_left_child(old_node, num_keys - 1);
        node::set_internal_right_child(old_node, promoted);
        node::set_internal_num_keys(old_node, num_keys - 1);
    }

    // The incoming child belongs to whichever half covers its key range.
    let max_after_split = node_max_key(pager, old_page_num)?;
    let destination_page_num = if child_max < max_after_split {
        old_page_num
    } else {
        new_page_num
    };
    internal_node_insert(pager, destination_page_num, child_page_num)?;
    node::set_parent(pager.get(child_page_num)?, destination_page_num);

    let new_max_of_old = node_max_key(pager, old_page_num)?;
    update_internal_node_key(pager.get(parent_of_split)?, old_max, new_max_of_old);

    if !splitting_root {
        internal_node_insert(pager, parent_of_split, new_page_num)?;
        node::set_parent(pager.get(new_page_num)?, parent_of_split);
    }
    Ok(())
}

/// Grow the tree by one level without moving the root page.
///
/// Page 0 is copied verbatim into a freshly allocated left child, then
/// reinitialized as an internal node with exactly one key and the two
/// children. When the old root was itself internal, all of its children
/// are reparented to the copy.
fn create_new_root(
    pager: &mut Pager,
    root_page_num: PageNum,
    right_child_page_num: PageNum,
) -> Result<()> {
    let root_snapshot = *pager.get(root_page_num)?;
    let root_was_internal = node::node_type(&root_snapshot)? == NodeType::Internal;

    if root_was_internal {
        node::init_internal(pager.get(right_child_page_num)?);
    }

    // Materialize the right child before picking the left child's page so
    // the two never collide.
    pager.get(right_child_page_num)?;
    let left_child_page_num = pager.unused_page_num();

    {
        let left_child = pager.get(left_child_page_num)?;
        *left_child = root_snapshot;
        node::set_root(left_child, false);
    }

    if root_was_internal {
        let num_keys = node::internal_num_keys(&root_snapshot);
        for i in 0..num_keys {
            let child = node::internal_left_child(&root_snapshot, i);
            node::set_parent(pager.get(child)?, left_child_page_num);
        }
        let right = node::internal_right_child(&root_snapshot);
        node::set_parent(pager.get(right)?, left_child_page_num);
    }

    let left_child_max_key = node_max_key(pager, left_child_page_num)?;

    {
        let root = pager.get(root_page_num)?;
        node::init_internal(root);
        node::set_root(root, true);
        node::set_internal_num_keys(root, 1);
        node::set_internal_left_child(root, 0, left_child_page_num);
        node::set_internal_key(root, 0, left_child_max_key);
        node::set_internal_right_child(root, right_child_page_num);
    }

    node::set_parent(pager.get(left_child_page_num)?, root_page_num);
    node::set_parent(pager.get(right_child_page_num)?, root_page_num);
    Ok(())
}

/// Pretty-print the subtree at `page_num`, two spaces of indent per
/// level. Used by the shell's `.btree` command and by tests asserting
/// tree shape.
pub fn render_tree(pager: &mut Pager, page_num: PageNum, out: &mut String) -> Result<()> {
    render_node(pager, page_num, 0, out)
}

fn render_node(pager: &mut Pager, page_num: PageNum, depth: usize, out: &mut String) -> Result<()> {
    let page = pager.get(page_num)?;
    match node::node_type(page)? {
        NodeType::Leaf => {
            let num_cells = node::leaf_num_cells(page);
            writeln!(out, "{}- leaf (size {})", indent(depth), num_cells).ok();
            for i in 0..num_cells {
                writeln!(out, "{}- {}", indent(depth + 1), node::leaf_key(page, i)).ok();
            }
        }
        NodeType::Internal => {
            let num_keys = node::internal_num_keys(page);
            writeln!(out, "{}- internal (size {})", indent(depth), num_keys).ok();
            if num_keys >= 1 {
                for i in 0..num_keys {
                    let child = node::internal_child(pager.get(page_num)?, page_num, i)?;
                    render_node(pager, child, depth + 1, out)?;

                    let key = node::internal_key(pager.get(page_num)?, i);
                    writeln!(out, "{}- key {}", indent(depth + 1), key).ok();
                }
                let right = node::internal_child(pager.get(page_num)?, page_num, num_keys)?;
                render_node(pager, right, depth + 1, out)?;
            }
        }
    }
    Ok(())
}

fn indent(depth: usize) -> String {
    "  ".repeat(depth)
}
