//! Employee code and login-credential derivation.
//!
//! Employee identity is a generated code (`EMP001`, `EMP002`, ...) whose
//! numeric sequence also seeds the generated username and initial password.
//! Renaming an employee regenerates the name part of the username but keeps
//! the numeric suffix, so the login stays stable across corrections.

use crate::error::CoreError;

/// Build an employee code from a sequence number: `EMP{seq:03}`.
pub fn employee_code(seq: u32) -> String {
    format!("EMP{seq:03}")
}

/// Extract the sequence number from an employee code.
pub fn code_sequence(code: &str) -> Option<u32> {
    code.strip_prefix("EMP")?.parse().ok()
}

/// Extract the numeric suffix from a generated username.
pub fn username_sequence(username: &str) -> Option<u32> {
    let digits: String = username
        .chars()
        .rev()
        .take_while(|c| c.is_ascii_digit())
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

/// The first word of the name, lowercased, stripped to ASCII alphanumerics.
fn name_token(name: &str) -> Result<String, CoreError> {
    let token: String = name
        .split_whitespace()
        .next()
        .unwrap_or("")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect();
    if token.is_empty() {
        return Err(CoreError::Validation(
            "Employee name must contain at least one letter or digit".to_string(),
        ));
    }
    Ok(token)
}

/// Derive a username from an employee name and sequence number:
/// `{first name, lowercased}{seq:03}`.
pub fn derive_username(name: &str, seq: u32) -> Result<String, CoreError> {
    Ok(format!("{}{seq:03}", name_token(name)?))
}

/// Derive the initial plaintext password: `{First name}@{seq:03}`.
///
/// The caller hashes this before storage; the plaintext is returned to the
/// admin exactly once in the create response.
pub fn derive_password(name: &str, seq: u32) -> Result<String, CoreError> {
    let token = name_token(name)?;
    let mut chars = token.chars();
    let capitalized = match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => token,
    };
    Ok(format!("{capitalized}@{seq:03}"))
}

/// Regenerate a username for a renamed employee, preserving the numeric
/// suffix of the current username.
pub fn renamed_username(current: &str, new_name: &str) -> Result<String, CoreError> {
    let seq = username_sequence(current).ok_or_else(|| {
        CoreError::Internal(format!("Username {current} has no numeric suffix"))
    })?;
    derive_username(new_name, seq)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn employee_code_pads_to_three_digits() {
        assert_eq!(employee_code(3), "EMP003");
        assert_eq!(employee_code(42), "EMP042");
        assert_eq!(employee_code(1000), "EMP1000");
    }

    #[test]
    fn code_sequence_round_trips() {
        assert_eq!(code_sequence("EMP003"), Some(3));
        assert_eq!(code_sequence("EMP1000"), Some(1000));
        assert_eq!(code_sequence("XYZ003"), None);
    }

    #[test]
    fn username_from_first_name_and_sequence() {
        assert_eq!(derive_username("Ramesh Kumar", 3).unwrap(), "ramesh003");
        assert_eq!(derive_username("priya", 12).unwrap(), "priya012");
    }

    #[test]
    fn username_strips_punctuation() {
        assert_eq!(derive_username("O'Brien Shaw", 7).unwrap(), "obrien007");
    }

    #[test]
    fn blank_name_rejected() {
        assert_matches!(derive_username("   ", 1), Err(CoreError::Validation(_)));
        assert_matches!(derive_username("!!!", 1), Err(CoreError::Validation(_)));
    }

    #[test]
    fn password_capitalizes_name_token() {
        assert_eq!(derive_password("ramesh kumar", 3).unwrap(), "Ramesh@003");
    }

    #[test]
    fn username_sequence_reads_trailing_digits() {
        assert_eq!(username_sequence("ramesh003"), Some(3));
        assert_eq!(username_sequence("priya1000"), Some(1000));
        assert_eq!(username_sequence("nodigits"), None);
    }

    #[test]
    fn rename_preserves_numeric_suffix() {
        assert_eq!(
            renamed_username("ramesh003", "Suresh Singh").unwrap(),
            "suresh003"
        );
    }
}
