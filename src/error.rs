use thiserror::Error;

pub type Result<T> = std::result::Result<T, DbError>;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Tried to fetch page number out of bounds: {page_num} (max: {max})")]
    PageOutOfBounds { page_num: usize, max: usize },

    #[error("Table full.")]
    TableFull,

    #[error("Field '{field}' is too long: {len} bytes (max: {max})")]
    FieldTooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },

    #[error("Field '{field}' contains a NUL byte")]
    NulByte { field: &'static str },

    #[error("Tried to flush null page {0}")]
    FlushNullPage(usize),
}

impl DbError {
    /// Fatal errors leave the store in a state the REPL cannot continue from.
    /// The others reject a single insert and change nothing.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            DbError::TableFull | DbError::FieldTooLong { .. } | DbError::NulByte { .. }
        )
    }
}
