//! Field checks shared by request handlers and services.
//!
//! Each check returns the short message sent back to the client on failure.

/// Maximum length of a display name, in characters.
pub const MAX_NAME_LENGTH: usize = 100;

/// Largest quantity a single cart line may hold.
pub const MAX_QUANTITY: u32 = 999;

/// Trim and check a display name (1-100 characters).
///
/// # Errors
///
/// Returns a message if the trimmed name is empty or too long.
pub fn display_name(name: &str) -> Result<String, String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err("name is required".to_owned());
    }
    if trimmed.chars().count() > MAX_NAME_LENGTH {
        return Err(format!("name must be at most {MAX_NAME_LENGTH} characters"));
    }
    Ok(trimmed.to_owned())
}

/// Check a quantity for adding to the cart (1-999).
///
/// # Errors
///
/// Returns a message if the quantity is out of range.
pub fn add_quantity(quantity: u32) -> Result<u32, String> {
    if (1..=MAX_QUANTITY).contains(&quantity) {
        Ok(quantity)
    } else {
        Err(format!("quantity must be between 1 and {MAX_QUANTITY}"))
    }
}

/// Check a replacement quantity (0-999). Zero means remove the line.
///
/// # Errors
///
/// Returns a message if the quantity is above the maximum.
pub fn update_quantity(quantity: u32) -> Result<u32, String> {
    if quantity <= MAX_QUANTITY {
        Ok(quantity)
    } else {
        Err(format!("quantity must be between 0 and {MAX_QUANTITY}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name() {
        assert_eq!(display_name("  Ada  "), Ok("Ada".to_owned()));
        assert!(display_name("").is_err());
        assert!(display_name(" \t ").is_err());
        assert!(display_name(&"n".repeat(100)).is_ok());
        assert!(display_name(&"n".repeat(101)).is_err());
    }

    #[test]
    fn test_quantity_bounds() {
        assert!(add_quantity(0).is_err());
        assert_eq!(add_quantity(1), Ok(1));
        assert_eq!(add_quantity(999), Ok(999));
        assert!(add_quantity(1000).is_err());

        assert_eq!(update_quantity(0), Ok(0));
        assert_eq!(update_quantity(999), Ok(999));
        assert!(update_quantity(1000).is_err());
    }
}
