use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::Path;

use tracing::debug;

use crate::error::{DbError, Result};
use crate::{PAGE_SIZE, TABLE_MAX_PAGES};

pub type Page = [u8; PAGE_SIZE];

/// Page cache over a single flat file.
///
/// Pages are read through on first touch and stay resident until the pager
/// is closed; nothing is ever evicted. Writes only reach the file through
/// [`Pager::flush`], so the owner must flush every live page before calling
/// [`Pager::close`].
pub struct Pager {
    file: File,
    file_length: u64,
    pages: Vec<Option<Box<Page>>>,
}

impl Pager {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;
        let file_length = file.metadata()?.len();
        debug!(path = %path.display(), file_length, "opened pager");

        Ok(Self {
            file,
            file_length,
            pages: std::iter::repeat_with(|| None).take(TABLE_MAX_PAGES).collect(),
        })
    }

    /// Length of the file when the pager was opened.
    pub fn file_length(&self) -> u64 {
        self.file_length
    }

    pub fn is_resident(&self, page_num: usize) -> bool {
        self.pages.get(page_num).is_some_and(Option::is_some)
    }

    pub fn get_page(&mut self, page_num: usize) -> Result<&mut Page> {
        if page_num >= TABLE_MAX_PAGES {
            return Err(DbError::PageOutOfBounds {
                page_num,
                max: TABLE_MAX_PAGES,
            });
        }

        let page = match self.pages[page_num].take() {
            Some(page) => page,
            None => self.load_page(page_num)?,
        };
        Ok(&mut **self.pages[page_num].insert(page))
    }

    /// Writes the first `bytes` bytes of a resident page back to its offset
    /// in the file.
    pub fn flush(&mut self, page_num: usize, bytes: usize) -> Result<()> {
        debug_assert!(bytes <= PAGE_SIZE);
        let page = self
            .pages
            .get(page_num)
            .and_then(Option::as_deref)
            .ok_or(DbError::FlushNullPage(page_num))?;

        self.file.seek(SeekFrom::Start((page_num * PAGE_SIZE) as u64))?;
        self.file.write_all(&page[..bytes])?;
        debug!(page_num, bytes, "flushed page");
        Ok(())
    }

    /// Syncs and releases the file. Resident pages are dropped unwritten.
    pub fn close(self) -> Result<()> {
        self.file.sync_all()?;
        Ok(())
    }

    fn load_page(&mut self, page_num: usize) -> Result<Box<Page>> {
        let mut page = Box::new([0u8; PAGE_SIZE]);

        // A partial page at the end of the file still counts as on disk.
        let pages_on_disk = self.file_length.div_ceil(PAGE_SIZE as u64);
        if (page_num as u64) < pages_on_disk {
            self.file.seek(SeekFrom::Start((page_num * PAGE_SIZE) as u64))?;
            let read = read_up_to(&mut self.file, &mut page[..])?;
            debug!(page_num, read, "loaded page from disk");
        } else {
            debug!(page_num, "allocated empty page");
        }

        Ok(page)
    }
}

/// Fills `buf` until it is full or the reader hits end of file.
fn read_up_to<R: Read>(reader: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
