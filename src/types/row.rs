use std::borrow::Cow;
use std::fmt;

use crate::types::error::{DatabaseError, Result};

/// User-visible column capacities, not counting the NUL terminator.
pub const COLUMN_USERNAME_SIZE: usize = 32;
pub const COLUMN_EMAIL_SIZE: usize = 255;

// Serialized field sizes; the string fields carry their NUL byte on disk.
pub const ID_SIZE: usize = 4;
pub const USERNAME_SIZE: usize = COLUMN_USERNAME_SIZE + 1;
pub const EMAIL_SIZE: usize = COLUMN_EMAIL_SIZE + 1;
pub const ROW_SIZE: usize = ID_SIZE + USERNAME_SIZE + EMAIL_SIZE;

// Serialized field offsets
pub const ID_OFFSET: usize = 0;
pub const USERNAME_OFFSET: usize = ID_OFFSET + ID_SIZE;
pub const EMAIL_OFFSET: usize = USERNAME_OFFSET + USERNAME_SIZE;

/// One row of the hard-coded table schema. The string columns live in
/// fixed NUL-padded buffers so a serialized row is always [`ROW_SIZE`]
/// bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub id: u32,
    username: [u8; USERNAME_SIZE],
    email: [u8; EMAIL_SIZE],
}

impl Row {
    pub fn new(id: u32, username: &str, email: &str) -> Result<Self> {
        if username.len() > COLUMN_USERNAME_SIZE || email.len() > COLUMN_EMAIL_SIZE {
            return Err(DatabaseError::StringTooLong);
        }

        let mut row = Row {
            id,
            username: [0u8; USERNAME_SIZE],
            email: [0u8; EMAIL_SIZE],
        };
        row.username[..username.len()].copy_from_slice(username.as_bytes());
        row.email[..email.len()].copy_from_slice(email.as_bytes());

        Ok(row)
    }

    pub fn username(&self) -> Cow<'_, str> {
        field_as_str(&self.username)
    }

    pub fn email(&self) -> Cow<'_, str> {
        field_as_str(&self.email)
    }

    /// Write the row into `dest`, which must be exactly [`ROW_SIZE`] bytes.
    pub fn serialize(&self, dest: &mut [u8]) {
        dest[ID_OFFSET..ID_OFFSET + ID_SIZE].copy_from_slice(&self.id.to_le_bytes());
        dest[USERNAME_OFFSET..USERNAME_OFFSET + USERNAME_SIZE].copy_from_slice(&self.username);
        dest[EMAIL_OFFSET..EMAIL_OFFSET + EMAIL_SIZE].copy_from_slice(&self.email);
    }

    /// Read a row back from a [`ROW_SIZE`]-byte region.
    pub fn deserialize(src: &[u8]) -> Self {
        let id = u32::from_le_bytes([
            src[ID_OFFSET],
            src[ID_OFFSET + 1],
            src[ID_OFFSET + 2],
            src[ID_OFFSET + 3],
        ]);

        let mut username = [0u8; USERNAME_SIZE];
        username.copy_from_slice(&src[USERNAME_OFFSET..USERNAME_OFFSET + USERNAME_SIZE]);

        let mut email = [0u8; EMAIL_SIZE];
        email.copy_from_slice(&src[EMAIL_OFFSET..EMAIL_OFFSET + EMAIL_SIZE]);

        Row {
            id,
            username,
            email,
        }
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "( {}, {}, {} )", self.id, self.username(), self.email())
    }
}

fn field_as_str(field: &[u8]) -> Cow<'_, str> {
    let len = field
        .iter()
        .position(|&b| b == 0)
        .unwrap_or(field.len());
    String::from_utf8_lossy(&field[..len])
}
