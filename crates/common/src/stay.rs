//! Check-in / check-out dates of a booking

use chrono::{Datelike, Duration, Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A stay of at least one night
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StayDates {
    pub checkin: NaiveDate,
    pub checkout: NaiveDate,
}

impl StayDates {
    /// `nights` nights starting on `checkin`
    pub fn starting(checkin: NaiveDate, nights: u32) -> Result<Self> {
        if nights == 0 {
            return Err(Error::InvalidStay("a stay needs at least one night".to_string()));
        }
        let checkout = checkin
            .checked_add_signed(Duration::days(i64::from(nights)))
            .ok_or_else(|| Error::InvalidStay(format!("{} + {} nights overflows", checkin, nights)))?;
        Ok(Self { checkin, checkout })
    }

    /// `nights` nights starting today (local time)
    pub fn starting_today(nights: u32) -> Result<Self> {
        Self::starting(Local::now().date_naive(), nights)
    }

    pub fn nights(&self) -> i64 {
        (self.checkout - self.checkin).num_days()
    }

    pub fn checkin_iso(&self) -> String {
        self.checkin.format("%Y-%m-%d").to_string()
    }

    pub fn checkout_iso(&self) -> String {
        self.checkout.format("%Y-%m-%d").to_string()
    }

    /// Whether both dates fall in the same calendar month; the booking
    /// calendar only shows the current month
    pub fn within_single_month(&self) -> bool {
        self.checkin.year() == self.checkout.year() && self.checkin.month() == self.checkout.month()
    }
}
