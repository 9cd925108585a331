use crate::ROW_SIZE;
use crate::error::Result;
use crate::row::Row;
use crate::table::Table;

/// A position in a [`Table`], used to read and write rows without exposing
/// page arithmetic.
pub struct Cursor<'a> {
    table: &'a mut Table,
    row_num: usize,
    end_of_table: bool,
}

impl<'a> Cursor<'a> {
    pub fn start(table: &'a mut Table) -> Self {
        let end_of_table = table.num_rows() == 0;
        Self {
            table,
            row_num: 0,
            end_of_table,
        }
    }

    /// The past-the-end position, where the next row will be appended.
    pub fn end(table: &'a mut Table) -> Self {
        let row_num = table.num_rows();
        Self {
            table,
            row_num,
            end_of_table: true,
        }
    }

    pub fn row_num(&self) -> usize {
        self.row_num
    }

    pub fn end_of_table(&self) -> bool {
        self.end_of_table
    }

    /// Moves to the next row. Must not be called once `end_of_table` is set.
    pub fn advance(&mut self) {
        debug_assert!(!self.end_of_table, "advanced past the end of the table");
        self.row_num += 1;
        self.end_of_table = self.row_num == self.table.num_rows();
    }

    /// `(page, slot)` address of the current row.
    pub fn value(&self) -> (usize, usize) {
        Table::row_address(self.row_num)
    }

    /// Decodes the row under the cursor.
    pub fn read(&mut self) -> Result<Row> {
        let (page_num, slot_num) = self.value();
        let page = self.table.pager_mut().get_page(page_num)?;

        let offset = slot_num * ROW_SIZE;
        let mut slot = [0u8; ROW_SIZE];
        slot.copy_from_slice(&page[offset..offset + ROW_SIZE]);
        Ok(Row::decode(&slot))
    }

    /// Copies an encoded row into the slot under the cursor.
    pub fn write(&mut self, slot: &[u8; ROW_SIZE]) -> Result<()> {
        let (page_num, slot_num) = self.value();
        let page = self.table.pager_mut().get_page(page_num)?;

        let offset = slot_num * ROW_SIZE;
        page[offset..offset + ROW_SIZE].copy_from_slice(slot);
        Ok(())
    }
}

/// Full-table scan returned by [`Table::scan`].
pub struct Scan<'a> {
    cursor: Cursor<'a>,
}

impl<'a> Scan<'a> {
    pub fn new(cursor: Cursor<'a>) -> Self {
        Self { cursor }
    }
}

impl Iterator for Scan<'_> {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor.end_of_table() {
            return None;
        }
        let row = self.cursor.read();
        self.cursor.advance();
        Some(row)
    }
}
