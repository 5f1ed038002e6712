//! Constrained fake data for the contact and booking forms
//!
//! Every generator comes in a valid and an invalid flavour. Invalid values
//! never fall inside the range the valid generator draws from, and the valid
//! ranges sit inside what the site accepts (see [`crate::rules`]).

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::rules::{
    ContactField, VALID_DESCRIPTION_LEN, VALID_PHONE_DIGITS, VALID_SUBJECT_LEN,
};

const FIRST_NAMES: &[&str] = &[
    "James", "Mary", "Robert", "Patricia", "John", "Jennifer", "Michael", "Linda", "David",
    "Elizabeth", "William", "Barbara", "Richard", "Susan", "Joseph", "Jessica", "Thomas",
    "Sarah", "Charles", "Karen", "Daniel", "Nancy", "Matthew", "Lisa", "Anthony", "Betty",
    "Mark", "Margaret", "Sergio", "Ana", "Joao", "Rita",
];

const LAST_NAMES: &[&str] = &[
    "Smith", "Johnson", "Williams", "Brown", "Jones", "Garcia", "Miller", "Davis",
    "Rodriguez", "Martinez", "Hernandez", "Lopez", "Gonzalez", "Wilson", "Anderson",
    "Thomas", "Taylor", "Moore", "Jackson", "Martin", "Lee", "Perez", "Thompson", "White",
    "Harris", "Sanchez", "Clark", "Lewis", "Freire", "Silva", "Costa", "Ferreira",
];

const DOMAINS: &[&str] = &["example.com", "example.org", "example.net"];

const WORDS: &[&str] = &[
    "room", "bathroom", "breakfast", "view", "booking", "night", "parking", "wifi", "check",
    "late", "early", "pool", "garden", "quiet", "double", "single", "family", "bed", "towel",
    "question", "about", "available", "price", "weekend", "arrival", "departure", "dog",
    "allowed", "is", "there", "a", "the", "for", "with", "can", "we", "have", "private",
    "sea", "shower", "balcony", "dinner", "included", "cancel", "change", "dates", "please",
];

const LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Seeded generator of valid and invalid form values
#[derive(Debug, Clone)]
pub struct ContactFaker {
    rng: StdRng,
    seed: u64,
}

impl ContactFaker {
    /// Create a generator; the same seed always yields the same values
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            seed,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// The underlying random source, for callers that need their own draws
    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    /// Fair coin
    pub fn coin_flip(&mut self) -> bool {
        self.rng.gen_bool(0.5)
    }

    /// Random ASCII letters with a length in `[min_chars, max_chars]`
    pub fn pystr(&mut self, min_chars: usize, max_chars: usize) -> String {
        let len = self.rng.gen_range(min_chars..=max_chars.max(min_chars));
        (0..len)
            .map(|_| LETTERS[self.rng.gen_range(0..LETTERS.len())] as char)
            .collect()
    }

    /// A string shorter than `min_chars` or longer than `max_chars`, each with p≈0.5.
    ///
    /// With `min_chars == 0` nothing is shorter than the range, so the result
    /// is always too long.
    pub fn text_less_than_or_greater_than(&mut self, min_chars: usize, max_chars: usize) -> String {
        if min_chars > 0 && self.coin_flip() {
            self.pystr(0, min_chars - 1)
        } else {
            let lo = max_chars.saturating_add(1);
            let hi = max_chars.saturating_mul(10).max(lo);
            self.pystr(lo, hi)
        }
    }

    pub fn first_name(&mut self) -> String {
        self.pick(FIRST_NAMES).to_string()
    }

    pub fn last_name(&mut self) -> String {
        self.pick(LAST_NAMES).to_string()
    }

    pub fn valid_name(&mut self) -> String {
        format!("{} {}", self.first_name(), self.last_name())
    }

    pub fn invalid_name(&mut self) -> String {
        String::new()
    }

    pub fn valid_email(&mut self) -> String {
        let first = self.first_name().to_lowercase();
        let last = self.last_name().to_lowercase();
        let domain = self.pick(DOMAINS);
        format!("{}.{}@{}", first, last, domain)
    }

    /// A person's name, which is never an email address
    pub fn invalid_email(&mut self) -> String {
        self.valid_name()
    }

    pub fn valid_phone(&mut self) -> String {
        self.digits(VALID_PHONE_DIGITS)
    }

    /// Up to nine digits
    pub fn invalid_phone(&mut self) -> String {
        let len = self.rng.gen_range(1..=9);
        self.digits(len)
    }

    pub fn valid_subject(&mut self) -> String {
        let len = self.rng.gen_range(VALID_SUBJECT_LEN);
        self.sentence_of_len(len)
    }

    pub fn invalid_subject(&mut self) -> String {
        self.text_less_than_or_greater_than(5, 100)
    }

    pub fn valid_description(&mut self) -> String {
        let len = self.rng.gen_range(VALID_DESCRIPTION_LEN);
        self.sentence_of_len(len)
    }

    pub fn invalid_description(&mut self) -> String {
        self.pystr(0, VALID_DESCRIPTION_LEN.start() - 1)
    }

    /// Valid value for `field`
    pub fn valid(&mut self, field: ContactField) -> String {
        match field {
            ContactField::Name => self.valid_name(),
            ContactField::Email => self.valid_email(),
            ContactField::Phone => self.valid_phone(),
            ContactField::Subject => self.valid_subject(),
            ContactField::Description => self.valid_description(),
        }
    }

    /// Invalid value for `field`
    pub fn invalid(&mut self, field: ContactField) -> String {
        match field {
            ContactField::Name => self.invalid_name(),
            ContactField::Email => self.invalid_email(),
            ContactField::Phone => self.invalid_phone(),
            ContactField::Subject => self.invalid_subject(),
            ContactField::Description => self.invalid_description(),
        }
    }

    fn pick(&mut self, items: &[&'static str]) -> &'static str {
        items.choose(&mut self.rng).copied().unwrap_or_default()
    }

    /// `len` digits without a leading zero
    fn digits(&mut self, len: usize) -> String {
        (0..len)
            .map(|i| {
                let lo = if i == 0 { 1 } else { 0 };
                char::from(b'0' + self.rng.gen_range(lo..=9u8))
            })
            .collect()
    }

    /// Capitalised words ending in a full stop, exactly `len` characters long
    fn sentence_of_len(&mut self, len: usize) -> String {
        let len = len.max(2);
        let mut text = String::with_capacity(len + 16);
        while text.len() < len {
            if !text.is_empty() {
                text.push(' ');
            }
            text.push_str(self.pick(WORDS));
        }
        text.truncate(len - 1);
        if text.ends_with(' ') {
            // pluralise the last word rather than ending on a space
            text.pop();
            text.push('s');
        }
        text.push('.');

        let mut chars = text.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => text,
        }
    }
}

/// One submission of the front page contact form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactData {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub subject: String,
    pub description: String,
}

impl ContactData {
    /// All fields valid
    pub fn valid(faker: &mut ContactFaker) -> Self {
        Self {
            name: faker.valid_name(),
            email: faker.valid_email(),
            phone: faker.valid_phone(),
            subject: faker.valid_subject(),
            description: faker.valid_description(),
        }
    }

    /// Exactly `field` invalid, everything else valid
    pub fn with_invalid(faker: &mut ContactFaker, field: ContactField) -> Self {
        let mut data = Self::valid(faker);
        data.set(field, faker.invalid(field));
        data
    }

    /// Each field invalid with p≈0.5; the description is forced invalid as
    /// soon as an earlier field came out valid, so at least one field is invalid
    pub fn random_invalid(faker: &mut ContactFaker) -> Self {
        let mut data = Self::valid(faker);
        let mut any_valid = false;

        for field in [
            ContactField::Name,
            ContactField::Email,
            ContactField::Phone,
            ContactField::Subject,
        ] {
            if faker.coin_flip() {
                data.set(field, faker.invalid(field));
            } else {
                any_valid = true;
            }
        }

        if faker.coin_flip() || any_valid {
            data.set(ContactField::Description, faker.invalid_description());
        }

        data
    }

    pub fn get(&self, field: ContactField) -> &str {
        match field {
            ContactField::Name => &self.name,
            ContactField::Email => &self.email,
            ContactField::Phone => &self.phone,
            ContactField::Subject => &self.subject,
            ContactField::Description => &self.description,
        }
    }

    pub fn set(&mut self, field: ContactField, value: String) {
        match field {
            ContactField::Name => self.name = value,
            ContactField::Email => self.email = value,
            ContactField::Phone => self.phone = value,
            ContactField::Subject => self.subject = value,
            ContactField::Description => self.description = value,
        }
    }

    /// Fields the site would reject
    pub fn rejected_fields(&self) -> Vec<ContactField> {
        ContactField::ALL
            .into_iter()
            .filter(|field| !field.accepts(self.get(*field)))
            .collect()
    }
}

/// Guest details typed into the booking dialog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingContact {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
}

impl BookingContact {
    pub fn fake(faker: &mut ContactFaker) -> Self {
        Self {
            first_name: faker.first_name(),
            last_name: faker.last_name(),
            email: faker.valid_email(),
            phone: faker.valid_phone(),
        }
    }
}
