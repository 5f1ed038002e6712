//! Read-only client for the booking API
//!
//! Two idempotent reads behind HTTP basic auth. No pagination and no retry:
//! a non-2xx status or a malformed body is returned as an error.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use booker_common::{StayDates, SuiteConfig};

use crate::error::{E2eError, E2eResult};

/// A room as listed by `GET /room`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    #[serde(rename = "roomid")]
    pub room_id: i64,
    #[serde(rename = "roomName", default)]
    pub room_name: String,
    #[serde(rename = "type", default)]
    pub room_type: String,
    #[serde(default)]
    pub accessible: bool,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(rename = "roomPrice")]
    pub room_price: i64,
}

/// A booking as listed by `GET /booking`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    #[serde(rename = "bookingid")]
    pub booking_id: i64,
    #[serde(rename = "roomid")]
    pub room_id: i64,
    #[serde(rename = "firstname")]
    pub first_name: String,
    #[serde(rename = "lastname")]
    pub last_name: String,
    #[serde(rename = "depositpaid", default)]
    pub deposit_paid: bool,
    #[serde(rename = "bookingdates")]
    pub booking_dates: BookingDates,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingDates {
    pub checkin: NaiveDate,
    pub checkout: NaiveDate,
}

impl Booking {
    /// Whether this booking is for `first_name last_name` over `stay`
    pub fn matches(&self, first_name: &str, last_name: &str, stay: &StayDates) -> bool {
        self.first_name == first_name
            && self.last_name == last_name
            && self.booking_dates.checkin == stay.checkin
            && self.booking_dates.checkout == stay.checkout
    }
}

#[derive(Debug, Deserialize)]
struct RoomsEnvelope {
    rooms: Vec<Room>,
}

#[derive(Debug, Deserialize)]
struct BookingsEnvelope {
    bookings: Vec<Booking>,
}

/// Booking API client
#[derive(Debug, Clone)]
pub struct BookerApi {
    client: reqwest::Client,
    base_url: String,
    username: String,
    password: String,
}

impl BookerApi {
    pub fn new(base_url: &str, username: &str, password: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    pub fn from_config(config: &SuiteConfig) -> Self {
        Self::new(
            config.base_url(),
            &config.app.booker_api_username,
            &config.app.booker_api_password,
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET {base_url}/room`
    pub async fn get_rooms(&self) -> E2eResult<Vec<Room>> {
        let envelope: RoomsEnvelope = self.get("/room").await?;
        debug!("Booking API listed {} room(s)", envelope.rooms.len());
        Ok(envelope.rooms)
    }

    /// `GET {base_url}/booking`
    pub async fn get_bookings(&self) -> E2eResult<Vec<Booking>> {
        let envelope: BookingsEnvelope = self.get("/booking").await?;
        debug!("Booking API listed {} booking(s)", envelope.bookings.len());
        Ok(envelope.bookings)
    }

    /// Most recently stored booking
    pub async fn last_booking(&self) -> E2eResult<Booking> {
        self.get_bookings()
            .await?
            .pop()
            .ok_or(E2eError::EmptyApiResponse("bookings"))
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, path: &str) -> E2eResult<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {}", url);
        let body = self
            .client
            .get(&url)
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(serde_json::from_str(&body)?)
    }
}
