use uuid::{Uuid, Variant};

use crate::errors::AppError;

const HYPHENATED_LEN: usize = 36;

/// Parses a user identifier, accepting only the hyphenated form of an
/// RFC 4122 UUID with version 1 through 5.
pub fn parse_user_id(raw: &str) -> Result<Uuid, AppError> {
    parse_uuid_field("user_id", raw)
}

pub fn parse_uuid_field(field: &str, raw: &str) -> Result<Uuid, AppError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(AppError::validation(format!("{field} is required")));
    }
    let invalid = || AppError::validation(format!("{field} must be a valid UUID"));

    if raw.len() != HYPHENATED_LEN {
        return Err(invalid());
    }
    let id = Uuid::try_parse(raw).map_err(|_| invalid())?;
    if !(1..=5).contains(&id.get_version_num()) || id.get_variant() != Variant::RFC4122 {
        return Err(invalid());
    }
    Ok(id)
}

/// Returns the trimmed value or a validation error naming the field.
pub fn require_text<'a>(field: &str, value: Option<&'a str>) -> Result<&'a str, AppError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::validation(format!("{field} is required")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_v4() {
        let id = Uuid::new_v4();
        assert_eq!(parse_user_id(&id.to_string()).unwrap(), id);
    }

    #[test]
    fn test_accepts_uppercase_v1() {
        assert!(parse_user_id("6BA7B810-9DAD-11D1-80B4-00C04FD430C8").is_ok());
    }

    #[test]
    fn test_rejects_garbage_and_empty() {
        assert!(matches!(parse_user_id("abc"), Err(AppError::Validation(_))));
        assert!(matches!(parse_user_id(""), Err(AppError::Validation(_))));
        assert!(matches!(parse_user_id("   "), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_rejects_bad_version_nibble() {
        // v4 shape with version nibble 0 and 7
        assert!(parse_user_id("3f2b8c1e-4d5a-0b6c-8d7e-9f0a1b2c3d4e").is_err());
        assert!(parse_user_id("3f2b8c1e-4d5a-7b6c-8d7e-9f0a1b2c3d4e").is_err());
    }

    #[test]
    fn test_rejects_bad_variant() {
        assert!(parse_user_id("3f2b8c1e-4d5a-4b6c-cd7e-9f0a1b2c3d4e").is_err());
    }

    #[test]
    fn test_rejects_simple_and_braced_forms() {
        assert!(parse_user_id("3f2b8c1e4d5a4b6c8d7e9f0a1b2c3d4e").is_err());
        assert!(parse_user_id("{3f2b8c1e-4d5a-4b6c-8d7e-9f0a1b2c3d4e}").is_err());
    }

    #[test]
    fn test_require_text() {
        assert_eq!(require_text("title", Some("  Help  ")).unwrap(), "Help");
        assert!(require_text("title", Some("   ")).is_err());
        assert!(require_text("title", None).is_err());
    }
}
