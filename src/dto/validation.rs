//! Validation helpers for DTOs.

use validator::ValidationError;

/// Validates that a display name is 3 to 30 characters of letters, digits,
/// spaces, underscores, or dashes.
pub fn validate_username(name: &str) -> Result<(), ValidationError> {
    let length = name.chars().count();
    if !(3..=30).contains(&length) {
        let mut err = ValidationError::new("username_length");
        err.message =
            Some(format!("Username must be 3 to 30 characters (got {length})").into());
        return Err(err);
    }

    if !name
        .chars()
        .all(|c| c.is_alphanumeric() || c == ' ' || c == '_' || c == '-')
    {
        let mut err = ValidationError::new("username_format");
        err.message = Some(
            "Username may only contain letters, digits, spaces, underscores, and dashes".into(),
        );
        return Err(err);
    }

    Ok(())
}

/// Validates a skin identifier: 1 to 50 non-whitespace ASCII characters.
pub fn validate_skin_id(id: &str) -> Result<(), ValidationError> {
    if id.is_empty() || id.len() > 50 || !id.chars().all(|c| c.is_ascii_graphic()) {
        let mut err = ValidationError::new("skin_id_format");
        err.message = Some("Skin id must be 1 to 50 printable ASCII characters".into());
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_username_valid() {
        assert!(validate_username("abc").is_ok());
        assert!(validate_username("Tourist 42").is_ok());
        assert!(validate_username("night-runner_7").is_ok());
    }

    #[test]
    fn test_validate_username_invalid_length() {
        assert!(validate_username("ab").is_err()); // too short
        assert!(validate_username(&"x".repeat(31)).is_err()); // too long
        assert!(validate_username("").is_err()); // empty
    }

    #[test]
    fn test_validate_username_invalid_format() {
        assert!(validate_username("so@cool").is_err());
        assert!(validate_username("tab\tname").is_err());
    }

    #[test]
    fn test_validate_skin_id() {
        assert!(validate_skin_id("1").is_ok());
        assert!(validate_skin_id("golden_fox").is_ok());
        assert!(validate_skin_id("").is_err());
        assert!(validate_skin_id("has space").is_err());
        assert!(validate_skin_id(&"s".repeat(51)).is_err());
    }
}
