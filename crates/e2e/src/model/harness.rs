//! Entry actions and verifications behind the model element names

use chrono::Datelike;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use booker_common::{BookingContact, ContactData, ContactFaker, StayDates, SuiteConfig};

use crate::api::BookerApi;
use crate::error::{assert_that, assert_text, E2eError, E2eResult};
use crate::model::{ModelContext, ModelGraph, ModelState, Transition};
use crate::pages::{
    booking_confirmation_text, contact_feedback_text, AdminPage, FrontPage, MessageDetails,
};
use crate::webdriver::Session;

/// Nights booked by the booking entry action
pub const BOOKING_NIGHTS: u32 = 2;

/// Values carried from one model step to a later verification
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelData {
    pub last_contact: Option<ContactData>,
    pub last_booking: Option<(BookingContact, StayDates)>,
}

/// Runs one model against a browser session
pub struct ModelHarness<'a> {
    session: &'a Session,
    base_url: String,
    api: BookerApi,
    faker: &'a mut ContactFaker,
    graph: ModelGraph,
    state: ModelState,
    ctx: ModelContext,
    data: ModelData,
    steps: usize,
}

impl<'a> ModelHarness<'a> {
    pub fn new(
        session: &'a Session,
        config: &SuiteConfig,
        graph: ModelGraph,
        faker: &'a mut ContactFaker,
    ) -> Self {
        info!("Set up for: {}", graph.name);
        let state = graph.start;
        Self {
            session,
            base_url: config.base_url().to_string(),
            api: BookerApi::from_config(config),
            faker,
            graph,
            state,
            ctx: ModelContext::default(),
            data: ModelData::default(),
            steps: 0,
        }
    }

    pub fn state(&self) -> ModelState {
        self.state
    }

    pub fn data(&self) -> &ModelData {
        &self.data
    }

    /// Number of transitions taken
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Run a model element by name, as an external walker would
    pub async fn execute(&mut self, name: &str) -> E2eResult<()> {
        if let Some(transition) = Transition::from_name(name) {
            self.step(transition).await
        } else if let Some(state) = ModelState::from_name(name) {
            if state != self.state {
                return Err(E2eError::AssertionFailed(format!(
                    "walker expects '{}' but the model is in '{}'",
                    state, self.state
                )));
            }
            self.verify(state).await
        } else {
            Err(E2eError::UnknownModelElement(name.to_string()))
        }
    }

    /// Take `transition` from the current state without verifying the target
    pub async fn step(&mut self, transition: Transition) -> E2eResult<()> {
        let next = self
            .graph
            .target(self.state, transition, &self.ctx)
            .ok_or_else(|| E2eError::InvalidTransition {
                state: self.state.to_string(),
                transition: transition.to_string(),
            })?;

        debug!("{} --{}--> {}", self.state, transition, next);
        self.enter(transition).await?;
        self.ctx.apply(transition);
        self.state = next;
        self.steps += 1;
        Ok(())
    }

    /// Verify the start state, then take and verify every step of `path`
    pub async fn walk(&mut self, path: &[Transition]) -> E2eResult<()> {
        self.graph.validate_path(path)?;
        info!("Walking '{}' for {} step(s)", self.graph.name, path.len());

        self.verify(self.state).await?;
        for &transition in path {
            self.step(transition).await?;
            self.verify(self.state).await?;
        }
        Ok(())
    }

    /// Perform the page actions of `transition`
    pub async fn enter(&mut self, transition: Transition) -> E2eResult<()> {
        let front = FrontPage::new(self.session, &self.base_url);
        let admin = AdminPage::new(self.session);

        match transition {
            Transition::LoadFrontpage => front.open().await,
            Transition::SubmitValidContactData => {
                let data = ContactData::valid(self.faker);
                self.submit_contact(&front, &data).await?;
                self.data.last_contact = Some(data);
                Ok(())
            }
            Transition::SubmitInvalidContactData => {
                let data = ContactData::random_invalid(self.faker);
                self.submit_contact(&front, &data).await
            }
            Transition::SubmitInvalidContactName
            | Transition::SubmitInvalidContactEmail
            | Transition::SubmitInvalidContactPhone
            | Transition::SubmitInvalidContactSubject
            | Transition::SubmitInvalidContactMessage => {
                let field = transition
                    .invalid_field()
                    .ok_or_else(|| E2eError::UnknownModelElement(transition.to_string()))?;
                let data = ContactData::with_invalid(self.faker, field);
                self.submit_contact(&front, &data).await
            }
            Transition::ClickAdminPanel => front.click_admin_panel().await,
            Transition::AdminCorrectLogin => admin.authenticate_with_valid_credentials().await,
            Transition::AdminClickInbox => admin.click_inbox().await,
            Transition::AdminClickRooms => admin.click_rooms().await,
            Transition::ClickFrontpage => admin.click_frontpage().await,
            Transition::ClickLastMessage => {
                let contact = self.last_contact()?;
                admin
                    .inbox()
                    .find_and_open_unread_message(&contact.name, &contact.subject)
                    .await
            }
            Transition::CloseMessageDetails => admin.inbox().close_message_details().await,
            Transition::OpenBookingDialog => {
                let rooms = front.rooms();
                let available = rooms.available_rooms().await?;
                let first = available
                    .first()
                    .ok_or_else(|| E2eError::AssertionFailed("no rooms listed".to_string()))?;
                rooms.click_book_room(first).await
            }
            Transition::SubmitValidBooking => {
                let stay = StayDates::starting_today(BOOKING_NIGHTS)?;
                assert_that(
                    stay.within_single_month(),
                    "the booking calendar cannot select a stay that crosses a month boundary",
                )?;
                let guest = BookingContact::fake(self.faker);
                let rooms = front.rooms();
                rooms
                    .select_calendar_dates(stay.checkin.day(), stay.checkout.day())
                    .await?;
                rooms.fill_booking_contact_data(&guest).await?;
                rooms.click_submit_booking().await?;
                self.data.last_booking = Some((guest, stay));
                Ok(())
            }
            Transition::CancelBooking => front.rooms().click_cancel_booking().await,
        }
    }

    /// Check the page matches `state`
    pub async fn verify(&self, state: ModelState) -> E2eResult<()> {
        let front = FrontPage::new(self.session, &self.base_url);
        let admin = AdminPage::new(self.session);

        match state {
            ModelState::Start => Ok(()),
            ModelState::FrontpageCanContact => assert_that(
                front.contact_form().is_form_available().await?,
                "contact form is unavailable for submission",
            ),
            ModelState::ContactSuccessful => {
                let contact = self.last_contact()?;
                let feedback = front.contact_form().contact_feedback_message().await?;
                assert_text(
                    &feedback,
                    &contact_feedback_text(&contact.name, &contact.subject),
                    "contact feedback",
                )
            }
            ModelState::ContactUnsuccessful => assert_that(
                front.contact_form().is_error_message_present().await?,
                "error message must be present",
            ),
            ModelState::AdminLogin => assert_that(
                admin.is_login_form_available().await?,
                "login form is unavailable",
            ),
            ModelState::AdminRooms => assert_that(
                admin.rooms().is_rooms_section_open().await?,
                "rooms section is not opened",
            ),
            ModelState::AdminMessages => assert_that(
                admin.inbox().is_message_section_open().await?,
                "message section is not opened",
            ),
            ModelState::MessageDetails => {
                let contact = self.last_contact()?;
                let details = admin.inbox().message_details().await?;
                verify_message_details(&details, contact)
            }
            ModelState::BookingDialog => assert_that(
                front.rooms().is_booking_form_open().await?,
                "booking form is not shown",
            ),
            ModelState::BookingConfirmed => {
                let (guest, stay) = self.data.last_booking.as_ref().ok_or_else(|| {
                    E2eError::AssertionFailed("no booking has been submitted".to_string())
                })?;
                let message = front.rooms().booking_confirmed_message().await?;
                assert_text(&message, &booking_confirmation_text(stay), "booking confirmation")?;

                let last = self.api.last_booking().await?;
                assert_that(
                    last.matches(&guest.first_name, &guest.last_name, stay),
                    &format!("booking not found (last_booking={:?})", last),
                )
            }
        }
    }

    async fn submit_contact(&self, front: &FrontPage<'_>, data: &ContactData) -> E2eResult<()> {
        let form = front.contact_form();
        form.wait_for_region_to_load().await?;
        form.fill_contact_data(data).await
    }

    fn last_contact(&self) -> E2eResult<&ContactData> {
        self.data.last_contact.as_ref().ok_or_else(|| {
            E2eError::AssertionFailed("no contact message has been submitted".to_string())
        })
    }
}

/// Compare the message detail modal with what was submitted
pub fn verify_message_details(details: &MessageDetails, contact: &ContactData) -> E2eResult<()> {
    assert_text(&details.name, &format!("From: {}", contact.name), "message's name doesnt match")?;
    assert_text(&details.email, &format!("Email: {}", contact.email), "message's email doesnt match")?;
    assert_text(&details.phone, &format!("Phone: {}", contact.phone), "message's phone doesnt match")?;
    assert_text(&details.subject, &contact.subject, "message's subject doesnt match")?;
    assert_text(&details.description, &contact.description, "message's description doesnt match")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact() -> ContactData {
        ContactData {
            name: "Sergio Freire".to_string(),
            email: "sergio.freire@example.com".to_string(),
            phone: "123456789012345".to_string(),
            subject: "Room with a view".to_string(),
            description: "Do all rooms have a private bathroom?".to_string(),
        }
    }

    #[test]
    fn test_message_details_match() {
        let details = MessageDetails {
            name: "From: Sergio Freire".to_string(),
            email: "Email: sergio.freire@example.com".to_string(),
            phone: "Phone: 123456789012345".to_string(),
            subject: "Room with a view".to_string(),
            description: "Do all rooms have a private bathroom?".to_string(),
        };
        verify_message_details(&details, &contact()).unwrap();
    }

    #[test]
    fn test_message_details_mismatch_names_field() {
        let details = MessageDetails {
            name: "From: Sergio Freire".to_string(),
            email: "Email: sergio.freire@example.com".to_string(),
            phone: "Phone: 000".to_string(),
            subject: "Room with a view".to_string(),
            description: "Do all rooms have a private bathroom?".to_string(),
        };
        let err = verify_message_details(&details, &contact()).unwrap_err();
        assert!(err.to_string().contains("phone"));
    }
}
