//! Free-text normalization rules shared by every entity.
//!
//! Text is trimmed before it is checked or stored. Lengths are counted in
//! characters, not bytes.

use crate::error::{DomainError, DomainResult};

/// Trim a required value; reject it when empty or longer than `max_len`.
pub fn required(field: &str, value: &str, max_len: usize) -> DomainResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(format!("{field} is required")));
    }
    ensure_max_len(field, trimmed, max_len)?;
    Ok(trimmed.to_string())
}

/// Trim an optional value. Blank input collapses to `None`.
pub fn optional(field: &str, value: Option<&str>, max_len: usize) -> DomainResult<Option<String>> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(trimmed) => {
            ensure_max_len(field, trimmed, max_len)?;
            Ok(Some(trimmed.to_string()))
        }
    }
}

fn ensure_max_len(field: &str, value: &str, max_len: usize) -> DomainResult<()> {
    if value.chars().count() > max_len {
        return Err(DomainError::validation(format!(
            "{field} cannot exceed {max_len} characters"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_trims_and_rejects_blank() {
        assert_eq!(required("name", "  Straight line ", 32).unwrap(), "Straight line");
        assert!(required("name", "   ", 32).unwrap_err().is_validation());
    }

    #[test]
    fn optional_collapses_blank_to_none() {
        assert_eq!(optional("notes", Some("  "), 10).unwrap(), None);
        assert_eq!(optional("notes", None, 10).unwrap(), None);
        assert_eq!(optional("notes", Some(" ok "), 10).unwrap(), Some("ok".to_string()));
    }

    #[test]
    fn length_is_counted_in_chars() {
        let text = "é".repeat(5);
        assert!(required("description", &text, 5).is_ok());
        let err = required("description", &"é".repeat(6), 5).unwrap_err();
        assert_eq!(
            err,
            DomainError::validation("description cannot exceed 5 characters")
        );
    }
}
