//! Validation helpers for DTOs.

use validator::ValidationError;

/// Maximum accepted display-name length in characters.
const DISPLAY_NAME_MAX: usize = 32;
/// Room codes are exactly this many decimal digits.
const ROOM_CODE_LENGTH: usize = 6;

/// Validates that a room code is exactly 6 decimal digits.
///
/// # Examples
///
/// ```ignore
/// validate_room_code("482913") // Ok
/// validate_room_code("48291")  // Err - too short
/// validate_room_code("48291a") // Err - not a digit
/// ```
pub fn validate_room_code(code: &str) -> Result<(), ValidationError> {
    if code.len() != ROOM_CODE_LENGTH {
        let mut err = ValidationError::new("room_code_length");
        err.message = Some(
            format!(
                "Room code must be exactly {ROOM_CODE_LENGTH} digits (got {})",
                code.len()
            )
            .into(),
        );
        return Err(err);
    }

    if !code.chars().all(|c| c.is_ascii_digit()) {
        let mut err = ValidationError::new("room_code_format");
        err.message = Some("Room code must contain only decimal digits".into());
        return Err(err);
    }

    Ok(())
}

/// Validates that a display name is non-blank and within the length cap.
pub fn validate_display_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        let mut err = ValidationError::new("display_name_blank");
        err.message = Some("Display name must not be blank".into());
        return Err(err);
    }

    if name.chars().count() > DISPLAY_NAME_MAX {
        let mut err = ValidationError::new("display_name_length");
        err.message =
            Some(format!("Display name must be at most {DISPLAY_NAME_MAX} characters").into());
        return Err(err);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_room_code_valid() {
        assert!(validate_room_code("482913").is_ok());
        assert!(validate_room_code("000000").is_ok());
    }

    #[test]
    fn test_validate_room_code_invalid() {
        assert!(validate_room_code("48291").is_err()); // too short
        assert!(validate_room_code("4829131").is_err()); // too long
        assert!(validate_room_code("48291a").is_err()); // non-digit
        assert!(validate_room_code("").is_err()); // empty
    }

    #[test]
    fn test_validate_display_name() {
        assert!(validate_display_name("Ava").is_ok());
        assert!(validate_display_name("   ").is_err());
        assert!(validate_display_name(&"x".repeat(33)).is_err());
    }
}
