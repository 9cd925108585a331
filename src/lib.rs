pub mod cursor;
pub mod error;
pub mod pager;
pub mod row;
pub mod statement;
pub mod table;

pub use cursor::{Cursor, Scan};
pub use error::{DbError, Result};
pub use pager::{Page, Pager};
pub use row::Row;
pub use statement::{InputType, MetaCommand, PrepareError, Statement};
pub use table::Table;

pub const USERNAME_CAPACITY: usize = 32;
pub const EMAIL_CAPACITY: usize = 255;
pub const ID_SIZE: usize = size_of::<u32>();

pub const ID_OFFSET: usize = 0;
pub const USERNAME_OFFSET: usize = ID_OFFSET + ID_SIZE;
pub const EMAIL_OFFSET: usize = USERNAME_OFFSET + USERNAME_CAPACITY;
pub const ROW_SIZE: usize = ID_SIZE + USERNAME_CAPACITY + EMAIL_CAPACITY;

pub const PAGE_SIZE: usize = 4096;
pub const TABLE_MAX_PAGES: usize = 100;
pub const ROWS_PER_PAGE: usize = PAGE_SIZE / ROW_SIZE;
pub const TABLE_MAX_ROWS: usize = ROWS_PER_PAGE * TABLE_MAX_PAGES;
