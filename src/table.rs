use std::path::Path;

use tracing::{debug, warn};

use crate::cursor::{Cursor, Scan};
use crate::error::{DbError, Result};
use crate::pager::Pager;
use crate::row::Row;
use crate::{PAGE_SIZE, ROW_SIZE, ROWS_PER_PAGE, TABLE_MAX_ROWS};

/// A single append-only table of [`Row`]s stored in one flat file.
///
/// The row count is never persisted; it is rederived from the file length
/// on [`Table::open`] and written back implicitly by [`Table::close`], which
/// must be called to keep rows inserted during the session.
pub struct Table {
    num_rows: usize,
    pager: Pager,
}

impl Table {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let pager = Pager::open(path)?;
        let num_rows = rows_in_file(pager.file_length());
        debug!(num_rows, "opened table");
        Ok(Self { num_rows, pager })
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    /// Maps a row index to its `(page, slot)` address.
    pub fn row_address(row_num: usize) -> (usize, usize) {
        (row_num / ROWS_PER_PAGE, row_num % ROWS_PER_PAGE)
    }

    /// Appends a row. On error the table is left untouched.
    pub fn insert(&mut self, row: &Row) -> Result<()> {
        if self.num_rows >= TABLE_MAX_ROWS {
            return Err(DbError::TableFull);
        }
        let slot = row.encode()?;

        Cursor::end(self).write(&slot)?;
        self.num_rows += 1;
        Ok(())
    }

    /// Iterates over every row in insertion order. Each call starts a fresh
    /// scan from the first row.
    pub fn scan(&mut self) -> Scan<'_> {
        Scan::new(Cursor::start(self))
    }

    /// Flushes every page that holds live rows, then releases the file.
    ///
    /// Full pages are written whole; the trailing page is written only up to
    /// the end of its last row.
    pub fn close(mut self) -> Result<()> {
        let num_full_pages = self.num_rows / ROWS_PER_PAGE;
        let mut flushed = 0;
        for page_num in 0..num_full_pages {
            if !self.pager.is_resident(page_num) {
                continue;
            }
            self.pager.flush(page_num, PAGE_SIZE)?;
            flushed += 1;
        }

        let num_additional_rows = self.num_rows % ROWS_PER_PAGE;
        if num_additional_rows > 0 && self.pager.is_resident(num_full_pages) {
            self.pager.flush(num_full_pages, num_additional_rows * ROW_SIZE)?;
            flushed += 1;
        }

        debug!(num_rows = self.num_rows, flushed, "closing table");
        self.pager.close()
    }

    pub(crate) fn pager_mut(&mut self) -> &mut Pager {
        &mut self.pager
    }
}

/// Derives the row count from the file length.
///
/// Full pages carry `PAGE_SIZE - ROWS_PER_PAGE * ROW_SIZE` unused tail bytes,
/// so the count is taken per page. A trailing partial row is dropped.
fn rows_in_file(file_length: u64) -> usize {
    let page_size = PAGE_SIZE as u64;
    let full_pages = (file_length / page_size) as usize;
    let tail = (file_length % page_size) as usize;

    if tail % ROW_SIZE != 0 {
        warn!(
            file_length,
            dangling = tail % ROW_SIZE,
            "file ends with a partial row, ignoring it"
        );
    }

    let num_rows = full_pages
        .saturating_mul(ROWS_PER_PAGE)
        .saturating_add(tail / ROW_SIZE);
    if num_rows > TABLE_MAX_ROWS {
        warn!(num_rows, max = TABLE_MAX_ROWS, "file holds more rows than the table allows");
        return TABLE_MAX_ROWS;
    }
    num_rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TABLE_MAX_PAGES;
    use tempfile::NamedTempFile;

    fn sample_row(i: u32) -> Row {
        Row::new(i, format!("user{i}"), format!("person{i}@example.com"))
    }

    #[test]
    fn test_row_address() {
        assert_eq!(Table::row_address(0), (0, 0));
        assert_eq!(Table::row_address(ROWS_PER_PAGE - 1), (0, ROWS_PER_PAGE - 1));
        assert_eq!(Table::row_address(ROWS_PER_PAGE), (1, 0));
        assert_eq!(Table::row_address(ROWS_PER_PAGE * 7 + 3), (7, 3));
        assert_eq!(
            Table::row_address(TABLE_MAX_ROWS - 1),
            (TABLE_MAX_PAGES - 1, ROWS_PER_PAGE - 1)
        );
    }

    #[test]
    fn test_rows_in_file() {
        assert_eq!(rows_in_file(0), 0);
        assert_eq!(rows_in_file(ROW_SIZE as u64), 1);
        assert_eq!(rows_in_file((3 * ROW_SIZE + 10) as u64), 3);
        assert_eq!(rows_in_file(PAGE_SIZE as u64), ROWS_PER_PAGE);
        assert_eq!(
            rows_in_file((PAGE_SIZE * 20 + 2 * ROW_SIZE) as u64),
            ROWS_PER_PAGE * 20 + 2
        );
        assert_eq!(rows_in_file((PAGE_SIZE * TABLE_MAX_PAGES) as u64), TABLE_MAX_ROWS);
        assert_eq!(rows_in_file(u64::MAX), TABLE_MAX_ROWS);
    }

    #[test]
    fn test_insert_counts_rows() {
        let file = NamedTempFile::new().unwrap();
        let mut table = Table::open(file.path()).unwrap();

        for i in 0..30 {
            table.insert(&sample_row(i)).unwrap();
            assert_eq!(table.num_rows(), i as usize + 1);
        }
    }

    #[test]
    fn test_rejected_insert_leaves_table_unchanged() {
        let file = NamedTempFile::new().unwrap();
        let mut table = Table::open(file.path()).unwrap();
        table.insert(&sample_row(1)).unwrap();

        let oversized = Row::new(2, "u".repeat(64), "e");
        assert!(matches!(
            table.insert(&oversized),
            Err(DbError::FieldTooLong { .. })
        ));
        assert_eq!(table.num_rows(), 1);

        let rows: Vec<Row> = table.scan().collect::<Result<_>>().unwrap();
        assert_eq!(rows, vec![sample_row(1)]);
    }

    #[test]
    fn test_table_full() {
        let file = NamedTempFile::new().unwrap();
        let mut table = Table::open(file.path()).unwrap();

        for i in 0..TABLE_MAX_ROWS {
            table.insert(&sample_row(i as u32)).unwrap();
        }
        assert!(matches!(
            table.insert(&sample_row(0)),
            Err(DbError::TableFull)
        ));
        assert_eq!(table.num_rows(), TABLE_MAX_ROWS);
    }

    #[test]
    fn test_close_flushes_only_live_bytes() {
        let file = NamedTempFile::new().unwrap();
        let mut table = Table::open(file.path()).unwrap();
        for i in 0..3 {
            table.insert(&sample_row(i)).unwrap();
        }
        table.close().unwrap();

        let len = std::fs::metadata(file.path()).unwrap().len();
        assert_eq!(len, (3 * ROW_SIZE) as u64);
    }

    #[test]
    fn test_close_writes_full_pages_whole() {
        let file = NamedTempFile::new().unwrap();
        let mut table = Table::open(file.path()).unwrap();
        for i in 0..(ROWS_PER_PAGE + 2) as u32 {
            table.insert(&sample_row(i)).unwrap();
        }
        table.close().unwrap();

        let len = std::fs::metadata(file.path()).unwrap().len();
        assert_eq!(len, (PAGE_SIZE + 2 * ROW_SIZE) as u64);
    }

    #[test]
    fn test_close_empty_table_writes_nothing() {
        let file = NamedTempFile::new().unwrap();
        let table = Table::open(file.path()).unwrap();
        table.close().unwrap();

        assert_eq!(std::fs::metadata(file.path()).unwrap().len(), 0);
    }
}
