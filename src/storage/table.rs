use std::path::Path;

use crate::storage::btree::{self, Cursor};
use crate::storage::node;
use crate::storage::pager::Pager;
use crate::types::error::{DatabaseError, Result};
use crate::types::row::Row;
use crate::types::{PageNum, NO_SIBLING};

/// The single table of the database: a root page number and the pager
/// that serves its pages. The root is always page 0.
pub struct Table {
    root_page_num: PageNum,
    pager: Pager,
}

impl Table {
    /// Open the database file, initializing page 0 as an empty leaf root
    /// when the file is new.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut pager = Pager::open(path)?;

        if pager.num_pages() == 0 {
            let root = pager.get(0)?;
            node::init_leaf(root);
            node::set_root(root, true);
        }

        Ok(Table {
            root_page_num: 0,
            pager,
        })
    }

    /// Insert a row keyed by its id, rejecting duplicates.
    pub fn insert(&mut self, row: &Row) -> Result<()> {
        let key = row.id;
        let cursor = btree::table_find(&mut self.pager, self.root_page_num, key)?;

        let leaf = self.pager.get(cursor.page_num)?;
        if cursor.cell_num < node::leaf_num_cells(leaf)
            && node::leaf_key(leaf, cursor.cell_num) == key
        {
            return Err(DatabaseError::DuplicateKey(key));
        }

        btree::leaf_node_insert(&mut self.pager, cursor, key, row)
    }

    /// All rows in ascending key order, walking the leaf chain.
    pub fn select_all(&mut self) -> Result<Vec<Row>> {
        let mut rows = Vec::new();
        let mut cursor = self.table_start()?;
        while !cursor.end_of_table {
            rows.push(Row::deserialize(self.cursor_value(&cursor)?));
            self.cursor_advance(&mut cursor)?;
        }
        Ok(rows)
    }

    /// The serialized row the cursor points at.
    pub fn cursor_value(&mut self, cursor: &Cursor) -> Result<&[u8]> {
        let page = self.pager.get(cursor.page_num)?;
        Ok(node::leaf_value(page, cursor.cell_num))
    }

    /// Cursor at the smallest key, or already at the end for an empty
    /// table.
    pub fn table_start(&mut self) -> Result<Cursor> {
        let mut cursor = btree::table_find(&mut self.pager, self.root_page_num, 0)?;
        let leaf = self.pager.get(cursor.page_num)?;
        cursor.end_of_table = node::leaf_num_cells(leaf) == 0;
        Ok(cursor)
    }

    /// Step to the next cell, hopping to the sibling leaf when the
    /// current one is exhausted.
    pub fn cursor_advance(&mut self, cursor: &mut Cursor) -> Result<()> {
        let page = self.pager.get(cursor.page_num)?;
        cursor.cell_num += 1;
        if cursor.cell_num < node::leaf_num_cells(page) {
            return Ok(());
        }

        let next = node::leaf_next(page);
        if next == NO_SIBLING {
            // Rightmost leaf, hence the end of the table.
            cursor.end_of_table = true;
        } else {
            cursor.page_num = next;
            cursor.cell_num = 0;
        }
        Ok(())
    }

    /// The `.btree` dump of the whole tree.
    pub fn render_tree(&mut self) -> Result<String> {
        let mut out = String::new();
        btree::render_tree(&mut self.pager, self.root_page_num, &mut out)?;
        Ok(out)
    }

    /// Flush every cached page to disk and release the buffers. Safe to
    /// call more than once; drop calls it best-effort.
    pub fn close(&mut self) -> Result<()> {
        self.pager.close()
    }
}

impl Drop for Table {
    fn drop(&mut self) {
        let _ = self.pager.close();
    }
}
