//! Property-based tests for the constrained field generator.
//!
//! Each property draws a seed and checks that the generated values stay on
//! their side of the field rules.

use booker_common::rules::{digit_count, is_email};
use booker_common::{ContactData, ContactFaker, ContactField};
use proptest::prelude::*;

proptest! {
    /// Valid names are never empty.
    #[test]
    fn prop_valid_name_non_empty(seed in any::<u64>()) {
        let mut faker = ContactFaker::new(seed);
        prop_assert!(!faker.valid_name().is_empty());
    }

    /// Invalid subjects are shorter than 5 or longer than 100 characters.
    #[test]
    fn prop_invalid_subject_outside_site_limits(seed in any::<u64>()) {
        let mut faker = ContactFaker::new(seed);
        let len = faker.invalid_subject().chars().count();
        prop_assert!(len < 5 || len > 100, "len = {}", len);
    }

    /// Valid phones have exactly 15 digits; invalid ones never do.
    #[test]
    fn prop_phone_digit_counts(seed in any::<u64>()) {
        let mut faker = ContactFaker::new(seed);
        prop_assert_eq!(digit_count(&faker.valid_phone()), 15);
        prop_assert_ne!(digit_count(&faker.invalid_phone()), 15);
    }

    /// The out-of-range generator never lands inside [min, max].
    #[test]
    fn prop_text_outside_range(
        seed in any::<u64>(),
        min in 0usize..50,
        span in 0usize..100,
    ) {
        let max = min + span;
        let mut faker = ContactFaker::new(seed);
        let len = faker.text_less_than_or_greater_than(min, max).chars().count();
        prop_assert!(len < min || len > max, "len {} inside [{}, {}]", len, min, max);
    }

    /// The site's own limits, 5..=100, are never hit either.
    #[test]
    fn prop_text_outside_subject_limits(seed in any::<u64>()) {
        let mut faker = ContactFaker::new(seed);
        let len = faker.text_less_than_or_greater_than(5, 100).chars().count();
        prop_assert!(!(5..=100).contains(&len));
    }

    /// Valid subjects and descriptions use the narrow generator ranges.
    #[test]
    fn prop_valid_text_lengths(seed in any::<u64>()) {
        let mut faker = ContactFaker::new(seed);
        let subject = faker.valid_subject().chars().count();
        let description = faker.valid_description().chars().count();
        prop_assert!((11..=21).contains(&subject));
        prop_assert!((20..=2000).contains(&description));
        prop_assert!(faker.invalid_description().chars().count() < 20);
    }

    /// Email generators sit on opposite sides of the email rule.
    #[test]
    fn prop_email_rule(seed in any::<u64>()) {
        let mut faker = ContactFaker::new(seed);
        prop_assert!(is_email(&faker.valid_email()));
        prop_assert!(!is_email(&faker.invalid_email()));
    }

    /// A fully valid submission passes every field rule.
    #[test]
    fn prop_valid_contact_accepted(seed in any::<u64>()) {
        let mut faker = ContactFaker::new(seed);
        let data = ContactData::valid(&mut faker);
        prop_assert!(data.rejected_fields().is_empty());
    }

    /// A random invalid submission always breaks at least one rule.
    #[test]
    fn prop_random_invalid_rejected(seed in any::<u64>()) {
        let mut faker = ContactFaker::new(seed);
        let data = ContactData::random_invalid(&mut faker);
        prop_assert!(!data.rejected_fields().is_empty());
    }

    /// Replacing one field breaks exactly that field.
    #[test]
    fn prop_single_invalid_field(seed in any::<u64>(), index in 0usize..5) {
        let field = ContactField::ALL[index];
        let mut faker = ContactFaker::new(seed);
        let data = ContactData::with_invalid(&mut faker, field);
        prop_assert_eq!(data.rejected_fields(), vec![field]);
    }
}
