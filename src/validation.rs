//! Field validators.
//!
//! Every validator is a pure function from raw input to a [`FieldCheck`].
//! The controller decides what to do with the result (update the field's
//! inline state, block submission).

#[cfg(test)]
#[path = "validation_test.rs"]
mod validation_test;

use reqwest::Url;

use crate::ui::Field;

pub const MIN_USERNAME_LEN: usize = 3;
pub const MIN_PASSWORD_LEN: usize = 8;

/// Validity flag plus the message shown next to the field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldCheck {
    pub valid: bool,
    pub message: String,
}

impl FieldCheck {
    fn ok(message: &str) -> Self {
        Self { valid: true, message: message.to_owned() }
    }

    fn fail(message: impl Into<String>) -> Self {
        Self { valid: false, message: message.into() }
    }
}

/// Validate `raw` according to the rules for `field`.
#[must_use]
pub fn validate(field: Field, raw: &str) -> FieldCheck {
    match field {
        Field::Username => validate_username(raw),
        Field::Email => validate_email(raw),
        Field::Password => validate_password(raw),
        Field::LoginPassword => validate_password_present(raw),
        Field::Title => validate_title(raw),
        Field::Url => validate_url(raw),
    }
}

#[must_use]
pub fn validate_username(raw: &str) -> FieldCheck {
    if raw.trim().chars().count() >= MIN_USERNAME_LEN {
        FieldCheck::ok("Looks good.")
    } else {
        FieldCheck::fail(format!("Username must be at least {MIN_USERNAME_LEN} characters."))
    }
}

#[must_use]
pub fn validate_email(raw: &str) -> FieldCheck {
    if is_email(raw) {
        FieldCheck::ok("Looks good.")
    } else {
        FieldCheck::fail("Please enter a valid email address.")
    }
}

/// `local@domain.tld`: one `@`, a dot after it with non-empty labels on both
/// sides, and no whitespace anywhere.
fn is_email(raw: &str) -> bool {
    if raw.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = raw.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let Some((host, tld)) = domain.rsplit_once('.') else {
        return false;
    };
    !host.is_empty() && !tld.is_empty() && !host.starts_with('.')
}

#[must_use]
pub fn validate_password(raw: &str) -> FieldCheck {
    let mut missing = Vec::new();
    if raw.chars().count() < MIN_PASSWORD_LEN {
        missing.push(format!("at least {MIN_PASSWORD_LEN} characters"));
    }
    if !raw.chars().any(|c| c.is_ascii_lowercase()) {
        missing.push("a lowercase letter".to_owned());
    }
    if !raw.chars().any(|c| c.is_ascii_uppercase()) {
        missing.push("an uppercase letter".to_owned());
    }
    if !raw.chars().any(|c| c.is_ascii_digit()) {
        missing.push("a number".to_owned());
    }
    if missing.is_empty() {
        FieldCheck::ok("Strong password.")
    } else {
        FieldCheck::fail(format!("Password needs {}.", missing.join(", ")))
    }
}

/// Login only checks that something was typed.
#[must_use]
pub fn validate_password_present(raw: &str) -> FieldCheck {
    if raw.is_empty() {
        FieldCheck::fail("Please enter your password.")
    } else {
        FieldCheck::ok("")
    }
}

#[must_use]
pub fn validate_title(raw: &str) -> FieldCheck {
    if raw.trim().is_empty() {
        FieldCheck::fail("Title is required.")
    } else {
        FieldCheck::ok("Looks good.")
    }
}

#[must_use]
pub fn validate_url(raw: &str) -> FieldCheck {
    match Url::parse(raw.trim()) {
        Ok(url) if url.has_host() => FieldCheck::ok("Looks good."),
        _ => FieldCheck::fail("Please enter a full URL, e.g. https://example.com."),
    }
}
