//! Validation gates for each onboarding stage.
//!
//! Every function here is pure: same input, same answer, no shared state.
//! The controller calls them before mutating anything.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::ValidationError;

use super::model::ImageFile;

/// `local@domain.tld`, with a TLD of at least two letters. Matched against
/// the already-lowercased value, but case-insensitive regardless.
static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[a-z0-9._%+-]+@[a-z0-9.-]+\.[a-z]{2,}$").expect("email pattern compiles")
});

/// 2–50 ASCII letters or spaces.
static NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z ]{2,50}$").expect("name pattern compiles"));

/// Trim and lowercase an email address.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Validate an email address, returning the normalized form on success.
pub fn validate_email(raw: &str) -> Result<String, ValidationError> {
    let normalized = normalize_email(raw);
    if normalized.is_empty() {
        return Err(ValidationError::EmptyInput);
    }
    if !EMAIL_PATTERN.is_match(&normalized) {
        return Err(ValidationError::FormatInvalid);
    }
    Ok(normalized)
}

/// Validate the content of a single OTP box.
///
/// The empty string clears the box (`Ok(None)`); exactly one ASCII digit
/// fills it.
pub fn validate_otp_digit(value: &str) -> Result<Option<char>, ValidationError> {
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (None, _) => Ok(None),
        (Some(c), None) if c.is_ascii_digit() => Ok(Some(c)),
        _ => Err(ValidationError::DigitInvalid),
    }
}

/// Validate a full name: letters and spaces only, 2–50 characters, at least
/// one letter.
///
/// Deliberately stricter than the bare `^[A-Za-z ]{2,50}$` form pattern,
/// which accepts an all-space name such as `"  "`.
pub fn validate_full_name(name: &str) -> Result<(), ValidationError> {
    if NAME_PATTERN.is_match(name) && name.chars().any(|c| c.is_ascii_alphabetic()) {
        Ok(())
    } else {
        Err(ValidationError::NameInvalid)
    }
}

/// Validate an image selection by its reported content type.
pub fn validate_image(file: Option<&ImageFile>) -> Result<(), ValidationError> {
    let file = file.ok_or(ValidationError::NoFileSelected)?;
    match file.mime_type.as_deref() {
        Some(mime) if mime.trim().to_ascii_lowercase().starts_with("image/") => Ok(()),
        _ => Err(ValidationError::NotAnImage),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_is_trimmed_and_lowercased() {
        assert_eq!(
            validate_email("  USER@Example.COM ").unwrap(),
            "user@example.com"
        );
    }

    #[test]
    fn email_accepts_common_shapes() {
        for ok in [
            "a@example.com",
            "name.surname@example.co",
            "first+tag@sub.domain.org",
            "under_score%x@host-name.io",
        ] {
            assert!(validate_email(ok).is_ok(), "{ok} should be accepted");
        }
    }

    #[test]
    fn blank_email_is_empty_input() {
        assert_eq!(validate_email(""), Err(ValidationError::EmptyInput));
        assert_eq!(validate_email("   \t"), Err(ValidationError::EmptyInput));
    }

    #[test]
    fn malformed_email_is_format_invalid() {
        for bad in [
            "not-an-email",
            "missing-at.example.com",
            "missing-domain@",
            "two@@example.com",
            "a@b@example.com",
            "no-dot@localhost",
            "short-tld@example.c",
            "digit-tld@example.c0m",
            "space in@example.com",
        ] {
            assert_eq!(
                validate_email(bad),
                Err(ValidationError::FormatInvalid),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn email_validation_is_repeatable() {
        for input in ["x@y.zz", "nope", ""] {
            assert_eq!(validate_email(input), validate_email(input));
        }
    }

    #[test]
    fn otp_digit_accepts_empty_or_single_digit() {
        assert_eq!(validate_otp_digit(""), Ok(None));
        assert_eq!(validate_otp_digit("0"), Ok(Some('0')));
        assert_eq!(validate_otp_digit("9"), Ok(Some('9')));
    }

    #[test]
    fn otp_digit_rejects_everything_else() {
        for bad in ["a", "12", " ", "-1", "٣", "1 "] {
            assert_eq!(
                validate_otp_digit(bad),
                Err(ValidationError::DigitInvalid),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn full_name_accepts_letters_and_spaces() {
        assert!(validate_full_name("Jane Doe").is_ok());
        assert!(validate_full_name("Al").is_ok());
        assert!(validate_full_name(&"a".repeat(50)).is_ok());
    }

    #[test]
    fn full_name_rejects_bad_input() {
        for bad in ["J4ne", "J", "", "   ", "O'Brien", "Jane-Doe", "Zoë Smith"] {
            assert_eq!(
                validate_full_name(bad),
                Err(ValidationError::NameInvalid),
                "{bad:?} should be rejected"
            );
        }
        assert_eq!(
            validate_full_name(&"a".repeat(51)),
            Err(ValidationError::NameInvalid)
        );
    }

    #[test]
    fn all_space_name_is_rejected_even_though_pattern_matches() {
        assert!(NAME_PATTERN.is_match("  "));
        assert_eq!(validate_full_name("  "), Err(ValidationError::NameInvalid));
    }

    #[test]
    fn image_requires_a_file() {
        assert_eq!(validate_image(None), Err(ValidationError::NoFileSelected));
    }

    #[test]
    fn image_requires_image_mime_type() {
        let png = ImageFile::new("me.png", Some("image/png"), vec![]);
        let upper = ImageFile::new("me.jpg", Some("IMAGE/JPEG"), vec![]);
        let pdf = ImageFile::new("cv.pdf", Some("application/pdf"), vec![]);
        let unknown = ImageFile::new("blob", None, vec![]);

        assert!(validate_image(Some(&png)).is_ok());
        assert!(validate_image(Some(&upper)).is_ok());
        assert_eq!(validate_image(Some(&pdf)), Err(ValidationError::NotAnImage));
        assert_eq!(validate_image(Some(&unknown)), Err(ValidationError::NotAnImage));
    }
}
