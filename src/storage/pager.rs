use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::types::error::{DatabaseError, Result};
use crate::types::{PageBuf, PageNum, PAGE_SIZE, TABLE_MAX_PAGES};

/// Page cache over the database file.
///
/// Owns the file handle and a fixed slot array of page buffers: one slot
/// per possible page, filled lazily on first access. `num_pages` is the
/// authoritative count of allocated pages, on disk or not yet flushed.
pub struct Pager {
    file: File,
    file_len: u64,
    num_pages: PageNum,
    pages: [Option<Box<PageBuf>>; TABLE_MAX_PAGES],
}

impl Pager {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(path)?;

        let file_len = file.seek(SeekFrom::End(0))?;
        if file_len % PAGE_SIZE as u64 != 0 {
            return Err(DatabaseError::CorruptFile);
        }

        Ok(Pager {
            file,
            file_len,
            num_pages: (file_len / PAGE_SIZE as u64) as PageNum,
            pages: std::array::from_fn(|_| None),
        })
    }

    /// Fetch a page, reading it through from disk on the first miss.
    /// Pages past the end of the file materialize zero-filled, which is
    /// what a freshly allocated node expects.
    pub fn get(&mut self, page_num: PageNum) -> Result<&mut PageBuf> {
        let index = page_num as usize;
        if index >= TABLE_MAX_PAGES {
            return Err(DatabaseError::PageOutOfBounds {
                page_num,
                max: TABLE_MAX_PAGES as PageNum,
            });
        }

        if self.pages[index].is_none() {
            let mut buffer = Box::new([0u8; PAGE_SIZE]);

            let pages_on_disk = (self.file_len / PAGE_SIZE as u64) as PageNum;
            if page_num < pages_on_disk {
                self.file
                    .seek(SeekFrom::Start(page_num as u64 * PAGE_SIZE as u64))?;
                match self.file.read_exact(&mut buffer[..]) {
                    // A short read at end of file leaves the tail zeroed,
                    // which is the correct content for it.
                    Err(e) if e.kind() == ErrorKind::UnexpectedEof => {}
                    other => other?,
                }
            }

            if page_num >= self.num_pages {
                self.num_pages = page_num + 1;
            }
            self.pages[index] = Some(buffer);
        }

        self.pages[index]
            .as_deref_mut()
            .ok_or(DatabaseError::PageNotLoaded(page_num))
    }

    /// Write one cached page back to its slot in the file.
    pub fn flush(&mut self, page_num: PageNum) -> Result<()> {
        let index = page_num as usize;
        let page = self.pages[index]
            .as_deref()
            .ok_or(DatabaseError::PageNotLoaded(page_num))?;

        self.file
            .seek(SeekFrom::Start(page_num as u64 * PAGE_SIZE as u64))?;
        self.file.write_all(&page[..])?;

        let end = (page_num as u64 + 1) * PAGE_SIZE as u64;
        if end > self.file_len {
            self.file_len = end;
        }
        Ok(())
    }

    /// Next unused page number. Pages are only ever appended; a free list
    /// could reuse holes later without changing any caller.
    pub fn unused_page_num(&self) -> PageNum {
        self.num_pages
    }

    pub fn num_pages(&self) -> PageNum {
        self.num_pages
    }

    /// Flush every populated slot and release its buffer.
    pub fn close(&mut self) -> Result<()> {
        for page_num in 0..self.num_pages {
            if self.pages[page_num as usize].is_some() {
                self.flush(page_num)?;
                self.pages[page_num as usize] = None;
            }
        }
        self.file.flush()?;
        Ok(())
    }
}
