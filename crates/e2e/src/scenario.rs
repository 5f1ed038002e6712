//! Test scenarios
//!
//! Each scenario is a fixed flow over the page objects, named and tagged so
//! the runner can select a subset. Chapters follow the tags: `ch1` contact
//! form, `ch1n` rejected contact data, `ch2` back office, `ch3` booking and
//! `model` for random walks over the model graphs.

use std::fmt;

use chrono::Datelike;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use booker_common::{BookingContact, ContactData, ContactFaker, ContactField, StayDates, SuiteConfig};

use crate::api::BookerApi;
use crate::error::{assert_text, assert_that, E2eError, E2eResult};
use crate::model::harness::{verify_message_details, BOOKING_NIGHTS};
use crate::model::{ModelGraph, ModelHarness, ModelKind, Transition};
use crate::pages::{
    booking_confirmation_text, contact_feedback_text, night_summary_text, AdminPage, FrontPage,
};
use crate::webdriver::Session;

/// Upper bound on the transitions of one random model walk
pub const MODEL_WALK_STEPS: usize = 40;

const KNOWN_VISITOR_NAME: &str = "sergio";
const KNOWN_VISITOR_EMAIL: &str = "sergio.freire@example.com";
const KNOWN_VISITOR_PHONE: &str = "+1234567890";
const KNOWN_VISITOR_SUBJECT: &str = "doubt";
const KNOWN_VISITOR_DESCRIPTION: &str = "Can I book rooms up to 2 months ahead of time?";

/// What a scenario does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScenarioKind {
    ContactFormSuccessful,
    ContactFormKnownVisitor,
    ContactFormInvalid(ContactField),
    MessageReceivedInBackoffice,
    BookSuccessful,
    Model(ModelKind),
}

/// A named, tagged scenario
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub tags: Vec<String>,
    pub description: String,
    pub kind: ScenarioKind,
}

/// How a scenario ended, short of failing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Passed,
    Skipped(String),
}

/// Everything a scenario needs while it runs
pub struct ScenarioContext<'a> {
    pub session: &'a Session,
    pub config: &'a SuiteConfig,
    pub faker: &'a mut ContactFaker,
    /// Overrides for the built-in model graphs, e.g. loaded from model files
    pub models: &'a [ModelGraph],
    /// Seed for model walks
    pub walk_seed: u64,
}

impl Scenario {
    fn new(name: impl Into<String>, tag: &str, description: impl Into<String>, kind: ScenarioKind) -> Self {
        Self {
            name: name.into(),
            tags: vec![tag.to_string()],
            description: description.into(),
            kind,
        }
    }

    /// Every scenario, in run order
    pub fn catalog() -> Vec<Scenario> {
        let mut scenarios = vec![
            Scenario::new(
                "contact_form_successful",
                "ch1",
                "Valid contact data is accepted with a feedback message",
                ScenarioKind::ContactFormSuccessful,
            ),
            Scenario::new(
                "contact_form_successful_known_visitor",
                "ch1",
                "A fixed visitor gets the exact feedback message",
                ScenarioKind::ContactFormKnownVisitor,
            ),
        ];

        for field in ContactField::ALL {
            scenarios.push(Scenario::new(
                format!("contact_form_invalid_{}", field.name()),
                "ch1n",
                format!("An invalid {} is rejected with an error alert", field.name()),
                ScenarioKind::ContactFormInvalid(field),
            ));
        }

        scenarios.push(Scenario::new(
            "contact_message_received_in_backoffice",
            "ch2",
            "A submitted message shows up unread in the admin inbox",
            ScenarioKind::MessageReceivedInBackoffice,
        ));
        scenarios.push(Scenario::new(
            "book_successful",
            "ch3",
            "Booking the first room for two nights is confirmed and stored",
            ScenarioKind::BookSuccessful,
        ));

        for kind in ModelKind::ALL {
            scenarios.push(Scenario::new(
                format!("model_{}", model_scenario_suffix(kind)),
                "model",
                format!("Random walk over the {} model", kind.name()),
                ScenarioKind::Model(kind),
            ));
        }

        scenarios
    }

    /// Scenarios carrying `tag`
    pub fn tagged(tag: &str) -> Vec<Scenario> {
        Self::catalog().into_iter().filter(|s| s.has_tag(tag)).collect()
    }

    /// The scenario called `name`
    pub fn named(name: &str) -> E2eResult<Scenario> {
        Self::catalog()
            .into_iter()
            .find(|s| s.name == name)
            .ok_or_else(|| E2eError::ScenarioNotFound(name.to_string()))
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    pub async fn run(&self, ctx: &mut ScenarioContext<'_>) -> E2eResult<Outcome> {
        debug!("Running scenario {}", self.name);
        match self.kind {
            ScenarioKind::ContactFormSuccessful => {
                let data = ContactData::valid(ctx.faker);
                contact_form_successful(ctx, &data).await
            }
            ScenarioKind::ContactFormKnownVisitor => {
                let data = ContactData {
                    name: KNOWN_VISITOR_NAME.to_string(),
                    email: KNOWN_VISITOR_EMAIL.to_string(),
                    phone: KNOWN_VISITOR_PHONE.to_string(),
                    subject: KNOWN_VISITOR_SUBJECT.to_string(),
                    description: KNOWN_VISITOR_DESCRIPTION.to_string(),
                };
                contact_form_successful(ctx, &data).await
            }
            ScenarioKind::ContactFormInvalid(field) => contact_form_invalid(ctx, field).await,
            ScenarioKind::MessageReceivedInBackoffice => message_received_in_backoffice(ctx).await,
            ScenarioKind::BookSuccessful => book_successful(ctx).await,
            ScenarioKind::Model(kind) => model_walk(ctx, kind).await,
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}] {}", self.name, self.tags.join(","), self.description)
    }
}

fn model_scenario_suffix(kind: ModelKind) -> &'static str {
    match kind {
        ModelKind::ContactForm => "contact_form",
        ModelKind::ContactFormDetailed => "contact_form_detailed",
        ModelKind::MessageBackoffice => "message_backoffice",
        ModelKind::Booking => "booking",
    }
}

async fn contact_form_successful(ctx: &mut ScenarioContext<'_>, data: &ContactData) -> E2eResult<Outcome> {
    let page = FrontPage::new(ctx.session, ctx.config.base_url());
    page.open().await?;
    let form = page.contact_form();
    form.wait_for_region_to_load().await?;
    form.fill_contact_data(data).await?;

    let feedback = form.contact_feedback_message().await?;
    assert_text(&feedback, &contact_feedback_text(&data.name, &data.subject), "contact feedback")?;
    Ok(Outcome::Passed)
}

async fn contact_form_invalid(ctx: &mut ScenarioContext<'_>, field: ContactField) -> E2eResult<Outcome> {
    let data = ContactData::with_invalid(ctx.faker, field);
    debug!("Invalid {}: {:?}", field, data.get(field));

    let page = FrontPage::new(ctx.session, ctx.config.base_url());
    page.open().await?;
    let form = page.contact_form();
    form.wait_for_region_to_load().await?;
    form.fill_contact_data(&data).await?;

    assert_that(form.is_error_message_present().await?, "error message must be present")?;
    Ok(Outcome::Passed)
}

async fn message_received_in_backoffice(ctx: &mut ScenarioContext<'_>) -> E2eResult<Outcome> {
    let data = ContactData::valid(ctx.faker);

    let page = FrontPage::new(ctx.session, ctx.config.base_url());
    page.open().await?;
    let form = page.contact_form();
    form.wait_for_region_to_load().await?;
    form.fill_contact_data(&data).await?;
    page.click_admin_panel().await?;

    let admin = AdminPage::new(ctx.session);
    admin.authenticate_with_valid_credentials().await?;
    assert_that(admin.rooms().is_rooms_section_open().await?, "rooms section is not opened")?;
    admin.click_inbox().await?;

    let inbox = admin.inbox();
    assert_that(inbox.is_message_section_open().await?, "message section is not opened")?;
    inbox.find_and_open_unread_message(&data.name, &data.subject).await?;
    verify_message_details(&inbox.message_details().await?, &data)?;
    Ok(Outcome::Passed)
}

async fn book_successful(ctx: &mut ScenarioContext<'_>) -> E2eResult<Outcome> {
    let stay = StayDates::starting_today(BOOKING_NIGHTS)?;
    if !stay.within_single_month() {
        return Ok(Outcome::Skipped(format!(
            "stay {} - {} crosses a month boundary",
            stay.checkin_iso(),
            stay.checkout_iso()
        )));
    }

    let api = BookerApi::from_config(ctx.config);
    let page = FrontPage::new(ctx.session, ctx.config.base_url());
    page.open().await?;

    let rooms = page.rooms();
    let listed = rooms.available_rooms().await?;
    let first = listed
        .first()
        .ok_or_else(|| E2eError::AssertionFailed("no rooms listed".to_string()))?;
    rooms.click_book_room(first).await?;
    rooms
        .select_calendar_dates(stay.checkin.day(), stay.checkout.day())
        .await?;

    let price_per_night = api
        .get_rooms()
        .await?
        .first()
        .map(|room| room.room_price)
        .ok_or(E2eError::EmptyApiResponse("rooms"))?;
    let expected = night_summary_text(stay.nights(), price_per_night * stay.nights());
    for block in rooms.date_selection_blocks().await? {
        assert_text(&block, &expected, "night summary")?;
    }

    let guest = BookingContact::fake(ctx.faker);
    rooms.fill_booking_contact_data(&guest).await?;
    rooms.click_submit_booking().await?;

    let message = rooms.booking_confirmed_message().await?;
    assert_text(&message, &booking_confirmation_text(&stay), "booking confirmation")?;

    let last = api.last_booking().await?;
    assert_that(
        last.matches(&guest.first_name, &guest.last_name, &stay),
        &format!("booking not found (last_booking={:?})", last),
    )?;
    Ok(Outcome::Passed)
}

async fn model_walk(ctx: &mut ScenarioContext<'_>, kind: ModelKind) -> E2eResult<Outcome> {
    let graph = ctx
        .models
        .iter()
        .find(|g| g.name == kind.name())
        .cloned()
        .unwrap_or_else(|| kind.graph());

    let mut rng = StdRng::seed_from_u64(ctx.walk_seed);
    let path = graph.random_path(&mut rng, MODEL_WALK_STEPS);
    info!(
        "Model {} walk: {}",
        graph.name,
        path.iter().map(|t| t.name()).collect::<Vec<_>>().join(" -> ")
    );

    if path.contains(&Transition::SubmitValidBooking) {
        let stay = StayDates::starting_today(BOOKING_NIGHTS)?;
        if !stay.within_single_month() {
            return Ok(Outcome::Skipped(format!(
                "booking walk needs a stay within one month, {} - {} is not",
                stay.checkin_iso(),
                stay.checkout_iso()
            )));
        }
    }

    let mut harness = ModelHarness::new(ctx.session, ctx.config, graph, ctx.faker);
    harness.walk(&path).await?;
    info!("Model walk finished in {:?} after {} step(s)", harness.state(), harness.steps());
    Ok(Outcome::Passed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_catalog_names_unique() {
        let catalog = Scenario::catalog();
        let names: HashSet<&str> = catalog.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names.len(), catalog.len());
        assert_eq!(catalog.len(), 13);
    }

    #[test]
    fn test_tags() {
        assert_eq!(Scenario::tagged("ch1").len(), 2);
        assert_eq!(Scenario::tagged("ch1n").len(), 5);
        assert_eq!(Scenario::tagged("ch2").len(), 1);
        assert_eq!(Scenario::tagged("ch3").len(), 1);
        assert_eq!(Scenario::tagged("model").len(), 4);
        assert!(Scenario::tagged("nope").is_empty());
    }

    #[test]
    fn test_named() {
        let scenario = Scenario::named("contact_form_invalid_email").unwrap();
        assert_eq!(scenario.kind, ScenarioKind::ContactFormInvalid(ContactField::Email));
        assert!(scenario.has_tag("ch1n"));

        assert!(matches!(
            Scenario::named("missing"),
            Err(E2eError::ScenarioNotFound(name)) if name == "missing"
        ));
    }

    #[test]
    fn test_model_scenarios_cover_every_model() {
        for kind in ModelKind::ALL {
            let found = Scenario::catalog()
                .into_iter()
                .any(|s| s.kind == ScenarioKind::Model(kind));
            assert!(found, "{}", kind.name());
        }
    }

    #[test]
    fn test_display() {
        let scenario = Scenario::named("book_successful").unwrap();
        assert!(scenario.to_string().starts_with("book_successful [ch3] "));
    }
}
