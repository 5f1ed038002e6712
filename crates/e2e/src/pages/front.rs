//! Front page: contact form and room booking

use tracing::debug;

use booker_common::{BookingContact, ContactData};

use crate::error::E2eResult;
use crate::webdriver::{Element, Locator, Session};

const ADMIN_PANEL_LINK: &str = "Admin panel";

const CONTACT_NAME_ID: &str = "name";
const CONTACT_EMAIL_ID: &str = "email";
const CONTACT_PHONE_ID: &str = "phone";
const CONTACT_SUBJECT_ID: &str = "subject";
const CONTACT_DESCRIPTION_ID: &str = "description";
const CONTACT_SUBMIT_ID: &str = "submitContact";
const CONTACT_FEEDBACK_XPATH: &str = r#"//div[@class="row contact"]/div[@class="col-sm-5"]"#;
const CONTACT_ERROR_XPATH: &str = r#"//div[@class="row contact"]//div[@class="alert alert-danger"]"#;

const BOOKING_FIRSTNAME_XPATH: &str = r#"//input[@name="firstname"]"#;
const BOOKING_LASTNAME_XPATH: &str = r#"//input[@name="lastname"]"#;
const BOOKING_EMAIL_XPATH: &str = r#"//input[@name="email"]"#;
const BOOKING_PHONE_XPATH: &str = r#"//input[@name="phone"]"#;
const BOOKING_SUBMIT_XPATH: &str = r#"//button[normalize-space()="Book"]"#;
const BOOKING_CANCEL_XPATH: &str = r#"//button[contains(text(), "Cancel")]"#;
const BOOK_FIRST_ROOM_XPATH: &str = r#"//button[contains(text(), "Book this room")]"#;
const BOOK_THIS_ROOM_XPATH: &str = r#".//button[contains(text(), "Book this room")]"#;
const BOOKING_ERROR_XPATH: &str = r#"//div[@class="row hotel-room-info"]//div[@class="alert alert-danger"]"#;
const BOOKING_CONFIRMED_XPATH: &str =
    r#"//div[@class="ReactModal__Content ReactModal__Content--after-open confirmation-modal"]"#;
const AVAILABLE_ROOMS_XPATH: &str = r#"//div[@class="row hotel-room-info"]"#;
const SELECTION_BLOCKS_XPATH: &str =
    r#"//div[@class="rbc-event-content" and not(contains(text(),"Unavailable"))]"#;

/// The public landing page
pub struct FrontPage<'a> {
    session: &'a Session,
    base_url: String,
}

impl<'a> FrontPage<'a> {
    pub fn new(session: &'a Session, base_url: &str) -> Self {
        Self {
            session,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Navigate to the front page
    pub async fn open(&self) -> E2eResult<()> {
        self.session.goto(&self.base_url).await
    }

    pub async fn click_admin_panel(&self) -> E2eResult<()> {
        let link = self.session.find(&Locator::link_text(ADMIN_PANEL_LINK)).await?;
        self.session.click(&link).await
    }

    pub fn contact_form(&self) -> ContactForm<'a> {
        ContactForm { session: self.session }
    }

    pub fn rooms(&self) -> Rooms<'a> {
        Rooms { session: self.session }
    }
}

/// Contact form region of the front page
pub struct ContactForm<'a> {
    session: &'a Session,
}

impl<'a> ContactForm<'a> {
    /// Block until the form's first field is present
    pub async fn wait_for_region_to_load(&self) -> E2eResult<()> {
        self.session.find(&Locator::id(CONTACT_NAME_ID)).await?;
        Ok(())
    }

    /// Clear and type every field, then submit
    pub async fn fill_contact_data(&self, data: &ContactData) -> E2eResult<()> {
        debug!("Submitting contact form as {:?}", data.name);
        for (id, value) in [
            (CONTACT_NAME_ID, &data.name),
            (CONTACT_EMAIL_ID, &data.email),
            (CONTACT_PHONE_ID, &data.phone),
            (CONTACT_SUBJECT_ID, &data.subject),
            (CONTACT_DESCRIPTION_ID, &data.description),
        ] {
            type_into(self.session, &Locator::id(id), value).await?;
        }
        let submit = self.session.find(&Locator::id(CONTACT_SUBMIT_ID)).await?;
        self.session.click(&submit).await
    }

    pub async fn contact_feedback_message(&self) -> E2eResult<String> {
        let feedback = self.session.find(&Locator::xpath(CONTACT_FEEDBACK_XPATH)).await?;
        self.session.text(&feedback).await
    }

    pub async fn is_error_message_present(&self) -> E2eResult<bool> {
        self.session.is_present(&Locator::xpath(CONTACT_ERROR_XPATH)).await
    }

    /// Every field and the submit button are on the page
    pub async fn is_form_available(&self) -> E2eResult<bool> {
        for id in [
            CONTACT_NAME_ID,
            CONTACT_EMAIL_ID,
            CONTACT_PHONE_ID,
            CONTACT_SUBJECT_ID,
            CONTACT_DESCRIPTION_ID,
            CONTACT_SUBMIT_ID,
        ] {
            if !self.session.is_present(&Locator::id(id)).await? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

/// Room list and booking dialog of the front page
pub struct Rooms<'a> {
    session: &'a Session,
}

impl<'a> Rooms<'a> {
    pub async fn available_rooms(&self) -> E2eResult<Vec<Element>> {
        self.session.find_all(&Locator::xpath(AVAILABLE_ROOMS_XPATH)).await
    }

    /// Open the booking dialog of `room`
    pub async fn click_book_room(&self, room: &Element) -> E2eResult<()> {
        let button = self
            .session
            .find_in(room, &Locator::xpath(BOOK_THIS_ROOM_XPATH))
            .await?;
        self.session.click(&button).await
    }

    pub async fn click_book_first_available_room(&self) -> E2eResult<()> {
        let button = self.session.find(&Locator::xpath(BOOK_FIRST_ROOM_XPATH)).await?;
        self.session.click(&button).await
    }

    /// Drag across the calendar from `start_day` to `end_day`.
    ///
    /// Days index the cells of the displayed month, so both must fall in it.
    pub async fn select_calendar_dates(&self, start_day: u32, end_day: u32) -> E2eResult<()> {
        debug!("Selecting calendar days {}..{}", start_day, end_day);
        let source = self.session.find(&calendar_cell(start_day)).await?;
        let target = self.session.find(&calendar_cell(end_day)).await?;
        self.session.scroll_into_view(&source).await?;
        self.session.move_to(&source).await?;
        self.session.drag_and_drop(&source, &target).await
    }

    /// Texts of the current selection blocks in the calendar
    pub async fn date_selection_blocks(&self) -> E2eResult<Vec<String>> {
        let blocks = self
            .session
            .find_all(&Locator::xpath(SELECTION_BLOCKS_XPATH))
            .await?;
        let mut texts = Vec::with_capacity(blocks.len());
        for block in &blocks {
            texts.push(self.session.text(block).await?);
        }
        Ok(texts)
    }

    pub async fn fill_booking_contact_data(&self, guest: &BookingContact) -> E2eResult<()> {
        for (xpath, value) in [
            (BOOKING_FIRSTNAME_XPATH, &guest.first_name),
            (BOOKING_LASTNAME_XPATH, &guest.last_name),
            (BOOKING_EMAIL_XPATH, &guest.email),
            (BOOKING_PHONE_XPATH, &guest.phone),
        ] {
            type_into(self.session, &Locator::xpath(xpath), value).await?;
        }
        Ok(())
    }

    pub async fn click_submit_booking(&self) -> E2eResult<()> {
        let button = self.session.find(&Locator::xpath(BOOKING_SUBMIT_XPATH)).await?;
        self.session.click(&button).await
    }

    pub async fn click_cancel_booking(&self) -> E2eResult<()> {
        let button = self.session.find(&Locator::xpath(BOOKING_CANCEL_XPATH)).await?;
        self.session.click(&button).await
    }

    /// The guest detail fields of the booking dialog are shown
    pub async fn is_booking_form_open(&self) -> E2eResult<bool> {
        for xpath in [BOOKING_FIRSTNAME_XPATH, BOOKING_LASTNAME_XPATH, BOOKING_SUBMIT_XPATH] {
            if !self.session.is_present(&Locator::xpath(xpath)).await? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    pub async fn is_error_message_present(&self) -> E2eResult<bool> {
        self.session.is_present(&Locator::xpath(BOOKING_ERROR_XPATH)).await
    }

    pub async fn booking_confirmed_message(&self) -> E2eResult<String> {
        let modal = self.session.find(&Locator::xpath(BOOKING_CONFIRMED_XPATH)).await?;
        self.session.text(&modal).await
    }
}

/// `day`-th in-month cell of the booking calendar (1-based)
fn calendar_cell(day: u32) -> Locator {
    Locator::xpath(format!(
        r#"(//div[contains(@class,"rbc-date-cell") and not(contains(@class,"rbc-off-range"))])[{}]"#,
        day
    ))
}

pub(crate) async fn type_into(session: &Session, locator: &Locator, value: &str) -> E2eResult<()> {
    let field = session.find(locator).await?;
    session.clear(&field).await?;
    session.send_keys(&field, value).await
}
