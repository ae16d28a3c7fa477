//! Internal helpers for input validation, credentials and identifiers.
//!
//! These utilities are **not** part of the public API, except
//! [`generate_order_id`] and [`validate_password`] which are re-exported for
//! callers that want to pre-check input.

use std::sync::LazyLock;

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{self, SaltString},
};
use regex::Regex;
use uuid::Uuid;
use validator::{ValidateEmail, ValidateUrl};

use crate::FieldErrors;

/// Characters accepted as the "special character" of a strong password.
pub const PASSWORD_SPECIAL_CHARS: &str = "!@#$%^&*()-_=+[]{}|;:'\",.<>/?`~\\";

const PASSWORD_MIN_LEN: usize = 8;
const TOKEN_KEY_LEN: usize = 40;

/// Verified against when a login names an unknown user, so that both
/// outcomes cost one hash.
static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("dummy password for unknown users").ok());

static PHONE_RE: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"^(?:\+8801|01)?(\d{9})$"));

/// Checks password strength, pushing one message per unmet rule.
pub fn validate_password(password: &str, errors: &mut FieldErrors) {
    if password.chars().count() < PASSWORD_MIN_LEN {
        errors.push(
            "password",
            "This password is too short. It must contain at least 8 characters.",
        );
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        errors.push("password", "The password must contain at least 1 digit.");
    }
    if !password.chars().any(char::is_alphabetic) {
        errors.push("password", "The password must contain at least 1 letter.");
    }
    if !password.chars().any(char::is_uppercase) {
        errors.push(
            "password",
            "The password must contain at least 1 uppercase letter.",
        );
    }
    if !password.chars().any(|c| PASSWORD_SPECIAL_CHARS.contains(c)) {
        errors.push(
            "password",
            format!("The password must contain at least 1 special character: {PASSWORD_SPECIAL_CHARS}"),
        );
    }
}

pub(crate) fn validate_phone(phone: &str, field: &str, errors: &mut FieldErrors) {
    let len = phone.chars().count();
    if len < 11 {
        errors.push(
            field,
            format!("Ensure this value has at least 11 characters (it has {len})."),
        );
    }
    if len > 14 {
        errors.push(field, "Ensure this field has no more than 14 characters.");
    }
    let matches = match PHONE_RE.as_ref() {
        Ok(re) => re.is_match(phone),
        Err(_) => false,
    };
    if !matches {
        errors.push(field, "Invalid Phone Number");
    }
}

/// Trims a required text field; pushes an error when empty or too long.
pub(crate) fn required_text(
    value: &str,
    field: &str,
    max_len: usize,
    errors: &mut FieldErrors,
) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        errors.push(field, "This field may not be blank.");
    } else if trimmed.chars().count() > max_len {
        errors.push(
            field,
            format!("Ensure this field has no more than {max_len} characters."),
        );
    }
    trimmed.to_string()
}

pub(crate) fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

pub(crate) fn validate_email(value: &str, field: &str, errors: &mut FieldErrors) {
    if !value.validate_email() {
        errors.push(field, "Enter a valid email address.");
    }
}

pub(crate) fn validate_url(value: &str, field: &str, errors: &mut FieldErrors) {
    let http = value.starts_with("http://") || value.starts_with("https://");
    if !http || !value.validate_url() {
        errors.push(field, "Enter a valid URL.");
    }
}

/// Hash a password into an Argon2id PHC string.
pub(crate) fn hash_password(password: &str) -> Result<String, password_hash::Error> {
    let salt = SaltString::encode_b64(Uuid::new_v4().as_bytes())?;
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string())
}

pub(crate) fn verify_password(password: &str, encoded: &str) -> bool {
    PasswordHash::new(encoded).is_ok_and(|parsed| {
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    })
}

/// Burn one verification for a login whose username matched nobody.
pub(crate) fn verify_unknown_user(password: &str) {
    if let Some(encoded) = DUMMY_HASH.as_deref() {
        verify_password(password, encoded);
    }
}

/// Generate an opaque 40 hex characters token key.
pub(crate) fn generate_token_key() -> String {
    format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
        .chars()
        .take(TOKEN_KEY_LEN)
        .collect()
}

/// Builds an order reference `ORD-<INITIALS>-<8 HEX>`.
///
/// `INITIALS` is the upper-cased first character of every whitespace separated
/// word of the restaurant name; the suffix is the first group of a random
/// UUID, upper-cased.
pub fn generate_order_id(restaurant_name: &str) -> String {
    let initials: String = restaurant_name
        .split_whitespace()
        .filter_map(|word| word.chars().next())
        .flat_map(char::to_uppercase)
        .collect();
    let uuid = Uuid::new_v4().hyphenated().to_string();
    let unique = uuid.split('-').next().unwrap_or_default().to_uppercase();
    format!("ORD-{initials}-{unique}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn password_errors(password: &str) -> FieldErrors {
        let mut errors = FieldErrors::new();
        validate_password(password, &mut errors);
        errors
    }

    #[test]
    fn weak_password_is_rejected() {
        let errors = password_errors("test");
        assert!(errors.contains("password"));
        assert!(errors.get("password").unwrap().len() >= 3);
    }

    #[test]
    fn strong_password_is_accepted() {
        assert!(password_errors("test@134Pass").is_empty());
        assert!(password_errors("Test@1234").is_empty());
    }

    #[test]
    fn password_requires_special_character() {
        let errors = password_errors("Test12345");
        assert_eq!(errors.get("password").map(<[String]>::len), Some(1));
    }

    #[test]
    fn phone_numbers_follow_local_format() {
        for ok in ["01700000000", "+8801700000000"] {
            let mut errors = FieldErrors::new();
            validate_phone(ok, "phone_number", &mut errors);
            assert!(errors.is_empty(), "{ok} should be valid: {errors}");
        }
        for bad in ["12345", "0170000000a", "+880170000000000"] {
            let mut errors = FieldErrors::new();
            validate_phone(bad, "phone_number", &mut errors);
            assert!(errors.contains("phone_number"), "{bad} should be rejected");
        }
    }

    #[test]
    fn password_hash_verifies_only_the_original() {
        let encoded = hash_password("test@134Pass").unwrap();
        assert!(encoded.starts_with("$argon2id$"), "{encoded}");
        assert!(verify_password("test@134Pass", &encoded));
        assert!(!verify_password("test@134pass", &encoded));
        assert!(!verify_password("test@134Pass", "garbage"));
        assert_ne!(encoded, hash_password("test@134Pass").unwrap());
    }

    #[test]
    fn unknown_users_still_pay_for_a_hash_check() {
        let dummy = DUMMY_HASH.as_deref().unwrap();
        assert!(dummy.starts_with("$argon2id$"), "{dummy}");
        assert!(!verify_password("test@134Pass", dummy));
        verify_unknown_user("test@134Pass");
    }

    #[test]
    fn token_keys_are_forty_hex_chars() {
        let key = generate_token_key();
        assert_eq!(key.len(), 40);
        assert!(key.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(key, generate_token_key());
    }

    #[test]
    fn order_id_uses_restaurant_initials() {
        let id = generate_order_id("ABC Diner");
        assert!(id.starts_with("ORD-AD-"), "{id}");
        let suffix = id.trim_start_matches("ORD-AD-");
        assert_eq!(suffix.len(), 8);
        assert!(
            suffix
                .chars()
                .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase())
        );
    }

    #[test]
    fn order_id_handles_lowercase_and_extra_spaces() {
        assert!(generate_order_id("  the   green fork ").starts_with("ORD-TGF-"));
    }

    #[test]
    fn email_and_url_checks() {
        let mut errors = FieldErrors::new();
        validate_email("owner@example.com", "email", &mut errors);
        validate_url("https://example.com", "website", &mut errors);
        assert!(errors.is_empty());

        validate_email("not-an-email", "email", &mut errors);
        validate_url("example.com", "website", &mut errors);
        assert!(errors.contains("email"));
        assert!(errors.contains("website"));
    }

    #[test]
    fn trailing_dot_domains_and_spaced_hosts_are_rejected() {
        for email in ["a@b.", "a b@example.com", "@example.com"] {
            let mut errors = FieldErrors::new();
            validate_email(email, "email", &mut errors);
            assert!(errors.contains("email"), "{email} should be rejected");
        }
        for url in ["http://a b", "https://", "ftp://example.com"] {
            let mut errors = FieldErrors::new();
            validate_url(url, "website", &mut errors);
            assert!(errors.contains("website"), "{url} should be rejected");
        }
    }
}
