//! Page objects for the booking site
//!
//! One type per view, one method per user-observable action. Nothing here
//! retries: a missing element surfaces as [`crate::E2eError::ElementNotFound`]
//! once the session's implicit wait runs out.

pub mod admin;
pub mod front;

pub use admin::{AdminPage, AdminRooms, Inbox, MessageDetails};
pub use front::{ContactForm, FrontPage, Rooms};

use booker_common::StayDates;

/// Feedback shown after a successful contact form submission
pub fn contact_feedback_text(name: &str, subject: &str) -> String {
    format!(
        "Thanks for getting in touch {}!\nWe'll get back to you about\n{}\nas soon as possible.",
        name, subject
    )
}

/// Confirmation modal text after a successful booking
pub fn booking_confirmation_text(stay: &StayDates) -> String {
    format!(
        "Booking Successful!\nCongratulations! Your booking has been confirmed for:\n{} - {}\nClose",
        stay.checkin_iso(),
        stay.checkout_iso()
    )
}

/// Calendar selection summary, e.g. `2 night(s) - £200`
pub fn night_summary_text(nights: i64, total_price: i64) -> String {
    format!("{} night(s) - £{}", nights, total_price)
}
