//! Name validation shared by writers and descriptor parsing.

use crate::error::{FormatError, FormatResult};

/// Checks that `name` is usable as a container or field name. `target`
/// describes what is being named and only appears in the error message.
///
/// Valid names are non-empty and free of dots, whitespace, and control
/// characters. Dots are reserved for addressing sub-fields.
pub fn ensure_valid_name(name: &str, target: &str) -> FormatResult<()> {
    if name.is_empty() {
        return Err(FormatError::InvalidName(
            name.to_string(),
            target.to_string(),
            "name cannot be empty",
        ));
    }
    for character in name.chars() {
        if character == '.' {
            return Err(FormatError::InvalidName(
                name.to_string(),
                target.to_string(),
                "name cannot contain '.'",
            ));
        }
        if character.is_whitespace() || character.is_control() {
            return Err(FormatError::InvalidName(
                name.to_string(),
                target.to_string(),
                "name cannot contain whitespace or control characters",
            ));
        }
    }
    Ok(())
}
