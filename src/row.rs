use std::fmt;

use crate::error::{DbError, Result};
use crate::{
    EMAIL_CAPACITY, EMAIL_OFFSET, ID_OFFSET, ID_SIZE, ROW_SIZE, USERNAME_CAPACITY, USERNAME_OFFSET,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub id: u32,
    pub username: String,
    pub email: String,
}

impl Row {
    pub fn new(id: u32, username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            email: email.into(),
        }
    }

    /// Packs the row into a fixed-size slot.
    ///
    /// Layout: little-endian `u32` id, then the username and email buffers,
    /// each zero-padded to its capacity. Text that does not fit is rejected
    /// with [`DbError::FieldTooLong`] rather than truncated, and text holding
    /// a NUL byte with [`DbError::NulByte`], since NUL is the padding.
    pub fn encode(&self) -> Result<[u8; ROW_SIZE]> {
        check_field("username", &self.username, USERNAME_CAPACITY)?;
        check_field("email", &self.email, EMAIL_CAPACITY)?;

        let mut slot = [0u8; ROW_SIZE];
        slot[ID_OFFSET..ID_OFFSET + ID_SIZE].copy_from_slice(&self.id.to_le_bytes());
        write_text(&mut slot[USERNAME_OFFSET..], &self.username);
        write_text(&mut slot[EMAIL_OFFSET..], &self.email);
        Ok(slot)
    }

    /// Unpacks a slot written by [`Row::encode`]. Trailing zero padding is
    /// stripped from both text fields.
    pub fn decode(slot: &[u8; ROW_SIZE]) -> Row {
        let mut id = [0u8; ID_SIZE];
        id.copy_from_slice(&slot[ID_OFFSET..ID_OFFSET + ID_SIZE]);

        Row {
            id: u32::from_le_bytes(id),
            username: read_text(&slot[USERNAME_OFFSET..USERNAME_OFFSET + USERNAME_CAPACITY]),
            email: read_text(&slot[EMAIL_OFFSET..EMAIL_OFFSET + EMAIL_CAPACITY]),
        }
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.id, self.username, self.email)
    }
}

fn check_field(field: &'static str, value: &str, max: usize) -> Result<()> {
    if value.as_bytes().contains(&0) {
        return Err(DbError::NulByte { field });
    }
    if value.len() > max {
        return Err(DbError::FieldTooLong {
            field,
            len: value.len(),
            max,
        });
    }
    Ok(())
}

fn write_text(dst: &mut [u8], value: &str) {
    let bytes = value.as_bytes();
    dst[..bytes.len()].copy_from_slice(bytes);
}

fn read_text(src: &[u8]) -> String {
    let end = src.iter().rposition(|&b| b != 0).map_or(0, |pos| pos + 1);
    String::from_utf8_lossy(&src[..end]).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_layout() {
        let row = Row::new(0x0102_0304, "alice", "a@x.com");
        let slot = row.encode().unwrap();

        assert_eq!(&slot[0..4], &[0x04, 0x03, 0x02, 0x01]);
        assert_eq!(&slot[USERNAME_OFFSET..USERNAME_OFFSET + 5], b"alice");
        assert!(slot[USERNAME_OFFSET + 5..EMAIL_OFFSET].iter().all(|&b| b == 0));
        assert_eq!(&slot[EMAIL_OFFSET..EMAIL_OFFSET + 7], b"a@x.com");
        assert!(slot[EMAIL_OFFSET + 7..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_round_trip() {
        let rows = [
            Row::new(0, "", ""),
            Row::new(1, "user1", "person1@example.com"),
            Row::new(u32::MAX, "ünïcödé", "e@x.org"),
            Row::new(7, "a".repeat(USERNAME_CAPACITY), "b".repeat(EMAIL_CAPACITY)),
        ];
        for row in rows {
            let slot = row.encode().unwrap();
            assert_eq!(Row::decode(&slot), row);
        }
    }

    #[test]
    fn test_rejects_long_username() {
        let row = Row::new(1, "a".repeat(USERNAME_CAPACITY + 1), "e");
        match row.encode() {
            Err(DbError::FieldTooLong { field, len, max }) => {
                assert_eq!(field, "username");
                assert_eq!(len, USERNAME_CAPACITY + 1);
                assert_eq!(max, USERNAME_CAPACITY);
            }
            other => panic!("expected FieldTooLong, got {other:?}"),
        }
    }

    #[test]
    fn test_rejects_long_email() {
        let row = Row::new(1, "u", "e".repeat(EMAIL_CAPACITY + 1));
        assert!(matches!(
            row.encode(),
            Err(DbError::FieldTooLong { field: "email", .. })
        ));
    }

    #[test]
    fn test_rejects_nul_bytes() {
        let trailing = Row::new(1, "bob\0", "b@x.com");
        assert!(matches!(
            trailing.encode(),
            Err(DbError::NulByte { field: "username" })
        ));

        let interior = Row::new(1, "bob", "b\0@x.com");
        assert!(matches!(
            interior.encode(),
            Err(DbError::NulByte { field: "email" })
        ));
    }

    #[test]
    fn test_capacity_counts_bytes_not_chars() {
        // 17 two-byte characters overflow a 32-byte buffer.
        let row = Row::new(1, "é".repeat(17), "e");
        assert!(row.encode().is_err());
    }

    #[test]
    fn test_display() {
        let row = Row::new(1, "user1", "person1@example.com");
        assert_eq!(row.to_string(), "(1, user1, person1@example.com)");
    }
}
