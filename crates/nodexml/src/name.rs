//! XML name grammar used for element and attribute names
//!
//! A name starts with an ASCII letter or `_`, continues with ASCII letters,
//! digits, `:`, `-`, `.` or `_`, and never ends with `:`.

use crate::error::{Error, Result};

pub(crate) fn is_name_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

pub(crate) fn is_name_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b':' | b'-' | b'.' | b'_')
}

/// Returns true if `name` is a legal element or attribute name
pub fn is_valid_name(name: &str) -> bool {
    let bytes = name.as_bytes();
    let Some((&first, rest)) = bytes.split_first() else {
        return false;
    };
    is_name_start(first) && rest.iter().all(|&b| is_name_char(b)) && bytes.last() != Some(&b':')
}

/// Check `name`, reporting `parent` as the enclosing element on failure
pub fn validate_name(name: &str, parent: Option<&str>) -> Result<()> {
    if is_valid_name(name) {
        Ok(())
    } else {
        Err(Error::invalid_name(name, parent))
    }
}
