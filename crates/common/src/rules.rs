//! Contact form field rules
//!
//! What the booking site accepts for each contact field. The generator in
//! [`crate::faker`] produces values on either side of these rules.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;

/// Phone lengths accepted by the site
pub const PHONE_LEN: RangeInclusive<usize> = 11..=21;

/// Subject lengths accepted by the site
pub const SUBJECT_LEN: RangeInclusive<usize> = 5..=100;

/// Description lengths accepted by the site
pub const DESCRIPTION_LEN: RangeInclusive<usize> = 20..=2000;

/// Digits in a generated valid phone number
pub const VALID_PHONE_DIGITS: usize = 15;

/// Lengths of generated valid subjects
pub const VALID_SUBJECT_LEN: RangeInclusive<usize> = 11..=21;

/// Lengths of generated valid descriptions
pub const VALID_DESCRIPTION_LEN: RangeInclusive<usize> = 20..=2000;

static EMAIL: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9-]+(\.[A-Za-z0-9-]+)*\.[A-Za-z]{2,}$").ok()
});

/// A field of the front page contact form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactField {
    Name,
    Email,
    Phone,
    Subject,
    Description,
}

impl ContactField {
    pub const ALL: [ContactField; 5] = [
        ContactField::Name,
        ContactField::Email,
        ContactField::Phone,
        ContactField::Subject,
        ContactField::Description,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ContactField::Name => "name",
            ContactField::Email => "email",
            ContactField::Phone => "phone",
            ContactField::Subject => "subject",
            ContactField::Description => "description",
        }
    }

    /// Whether the site accepts `value` for this field
    pub fn accepts(&self, value: &str) -> bool {
        let len = value.chars().count();
        match self {
            ContactField::Name => !value.trim().is_empty(),
            ContactField::Email => is_email(value),
            ContactField::Phone => PHONE_LEN.contains(&len),
            ContactField::Subject => SUBJECT_LEN.contains(&len),
            ContactField::Description => DESCRIPTION_LEN.contains(&len),
        }
    }
}

impl fmt::Display for ContactField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Syntactic email check
pub fn is_email(value: &str) -> bool {
    EMAIL.as_ref().map(|re| re.is_match(value)).unwrap_or(false)
}

/// Number of ASCII digits in `value`
pub fn digit_count(value: &str) -> usize {
    value.chars().filter(|c| c.is_ascii_digit()).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("sergio.freire@example.com", true)]
    #[test_case("a@b.co", true)]
    #[test_case("Sergio Freire", false)]
    #[test_case("no-at-sign.example.com", false)]
    #[test_case("trailing@dot.", false)]
    #[test_case("", false)]
    fn test_is_email(value: &str, expected: bool) {
        assert_eq!(is_email(value), expected);
    }

    #[test_case(ContactField::Name, "", false)]
    #[test_case(ContactField::Name, "sergio", true)]
    #[test_case(ContactField::Phone, "0000", false)]
    #[test_case(ContactField::Phone, "123456789012345", true)]
    #[test_case(ContactField::Subject, "doubt", true)]
    #[test_case(ContactField::Subject, "hey", false)]
    #[test_case(ContactField::Description, "too short", false)]
    #[test_case(ContactField::Description, "Can I book rooms up to 2 months ahead of time?", true)]
    fn test_accepts(field: ContactField, value: &str, expected: bool) {
        assert_eq!(field.accepts(value), expected);
    }

    #[test]
    fn test_generated_ranges_sit_inside_site_limits() {
        assert!(SUBJECT_LEN.contains(VALID_SUBJECT_LEN.start()));
        assert!(SUBJECT_LEN.contains(VALID_SUBJECT_LEN.end()));
        assert!(DESCRIPTION_LEN.contains(VALID_DESCRIPTION_LEN.start()));
        assert!(DESCRIPTION_LEN.contains(VALID_DESCRIPTION_LEN.end()));
        assert!(PHONE_LEN.contains(&VALID_PHONE_DIGITS));
    }

    #[test]
    fn test_digit_count() {
        assert_eq!(digit_count("+1 234-567"), 7);
        assert_eq!(digit_count(""), 0);
    }
}
