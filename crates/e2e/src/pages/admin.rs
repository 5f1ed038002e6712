//! Admin panel: login, rooms and message inbox

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::E2eResult;
use crate::pages::front::type_into;
use crate::webdriver::{xpath_literal, Locator, Session};

const ROOMS_MENU_XPATH: &str = r##"//a[@href="#/admin/"]"##;
const FRONTPAGE_MENU_ID: &str = "frontPageLink";
const INBOX_MENU_XPATH: &str = r##"//a[@href="#/admin/messages"]"##;
const LOGOUT_MENU_LINK: &str = "Logout";

const LOGIN_USERNAME_ID: &str = "username";
const LOGIN_PASSWORD_ID: &str = "password";
const LOGIN_SUBMIT_ID: &str = "doLogin";

const MESSAGE_SECTION_XPATH: &str = r#"//div[@class="messages"]//div/p[contains(text(),"Subject")]"#;
const MESSAGE_MODAL: &str =
    r#"//div[@class="ReactModal__Content ReactModal__Content--after-open message-modal"]"#;
const MESSAGE_CLOSE_XPATH: &str = r#"//button[contains(text(),"Close")]"#;

const ROOMS_SECTION_XPATH: &str = r#"(//div[@class="row"])//div/p[contains(text(),"Room #")]"#;

/// Default admin credentials of the demo site
pub const VALID_ADMIN_USERNAME: &str = "admin";
pub const VALID_ADMIN_PASSWORD: &str = "password";

/// The admin panel
pub struct AdminPage<'a> {
    session: &'a Session,
}

impl<'a> AdminPage<'a> {
    pub fn new(session: &'a Session) -> Self {
        Self { session }
    }

    /// Text of the inbox menu entry, which carries the unread count
    pub async fn number_of_unread_messages(&self) -> E2eResult<String> {
        let inbox = self.session.find(&Locator::xpath(INBOX_MENU_XPATH)).await?;
        self.session.text(&inbox).await
    }

    pub async fn click_frontpage(&self) -> E2eResult<()> {
        self.click(&Locator::id(FRONTPAGE_MENU_ID)).await
    }

    pub async fn click_rooms(&self) -> E2eResult<()> {
        self.click(&Locator::xpath(ROOMS_MENU_XPATH)).await
    }

    pub async fn click_inbox(&self) -> E2eResult<()> {
        self.click(&Locator::xpath(INBOX_MENU_XPATH)).await
    }

    pub async fn click_logout(&self) -> E2eResult<()> {
        self.click(&Locator::link_text(LOGOUT_MENU_LINK)).await
    }

    pub async fn authenticate(&self, username: &str, password: &str) -> E2eResult<()> {
        debug!("Logging in as {}", username);
        type_into(self.session, &Locator::id(LOGIN_USERNAME_ID), username).await?;
        type_into(self.session, &Locator::id(LOGIN_PASSWORD_ID), password).await?;
        self.click(&Locator::id(LOGIN_SUBMIT_ID)).await
    }

    pub async fn authenticate_with_valid_credentials(&self) -> E2eResult<()> {
        self.authenticate(VALID_ADMIN_USERNAME, VALID_ADMIN_PASSWORD).await
    }

    pub async fn is_login_form_available(&self) -> E2eResult<bool> {
        for id in [LOGIN_USERNAME_ID, LOGIN_PASSWORD_ID, LOGIN_SUBMIT_ID] {
            if !self.session.is_present(&Locator::id(id)).await? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    pub fn inbox(&self) -> Inbox<'a> {
        Inbox { session: self.session }
    }

    pub fn rooms(&self) -> AdminRooms<'a> {
        AdminRooms { session: self.session }
    }

    async fn click(&self, locator: &Locator) -> E2eResult<()> {
        let element = self.session.find(locator).await?;
        self.session.click(&element).await
    }
}

/// Everything shown in the message detail modal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageDetails {
    /// `From: {name}`
    pub name: String,
    /// `Email: {email}`
    pub email: String,
    /// `Phone: {phone}`
    pub phone: String,
    pub subject: String,
    pub description: String,
}

/// Message inbox of the admin panel
pub struct Inbox<'a> {
    session: &'a Session,
}

impl<'a> Inbox<'a> {
    pub async fn is_message_section_open(&self) -> E2eResult<bool> {
        self.session.is_present(&Locator::xpath(MESSAGE_SECTION_XPATH)).await
    }

    /// Open the unread message sent by `name` about `subject`
    pub async fn find_and_open_unread_message(&self, name: &str, subject: &str) -> E2eResult<()> {
        let message = self.session.find(&unread_message(name, subject)).await?;
        self.session.click(&message).await
    }

    pub async fn close_message_details(&self) -> E2eResult<()> {
        let close = self.session.find(&Locator::xpath(MESSAGE_CLOSE_XPATH)).await?;
        self.session.click(&close).await
    }

    pub async fn message_detail_name(&self) -> E2eResult<String> {
        self.detail(DetailRow::Name).await
    }

    pub async fn message_detail_email(&self) -> E2eResult<String> {
        self.detail(DetailRow::Email).await
    }

    pub async fn message_detail_phone(&self) -> E2eResult<String> {
        self.detail(DetailRow::Phone).await
    }

    pub async fn message_detail_subject(&self) -> E2eResult<String> {
        self.detail(DetailRow::Subject).await
    }

    pub async fn message_detail_description(&self) -> E2eResult<String> {
        self.detail(DetailRow::Description).await
    }

    /// All detail rows of the open message
    pub async fn message_details(&self) -> E2eResult<MessageDetails> {
        Ok(MessageDetails {
            name: self.message_detail_name().await?,
            email: self.message_detail_email().await?,
            phone: self.message_detail_phone().await?,
            subject: self.message_detail_subject().await?,
            description: self.message_detail_description().await?,
        })
    }

    async fn detail(&self, row: DetailRow) -> E2eResult<String> {
        let element = self.session.find(&row.locator()).await?;
        self.session.text(&element).await
    }
}

#[derive(Debug, Clone, Copy)]
enum DetailRow {
    Name,
    Phone,
    Email,
    Subject,
    Description,
}

impl DetailRow {
    fn locator(self) -> Locator {
        let suffix = match self {
            DetailRow::Name => r#"/div[@class="form-row"]/div[1]"#,
            DetailRow::Phone => r#"/div[@class="form-row"]/div[2]"#,
            DetailRow::Email => r#"/div[@class="form-row"][2]"#,
            DetailRow::Subject => r#"/div[@class="form-row"][3]"#,
            DetailRow::Description => r#"/div[@class="form-row"][4]"#,
        };
        Locator::xpath(format!("{}{}", MESSAGE_MODAL, suffix))
    }
}

fn unread_message(name: &str, subject: &str) -> Locator {
    Locator::xpath(format!(
        r#"//div[@class="messages"]/div[contains(@class,"detail") and contains(@class,"read-false")]//p[contains(text(),{})]/parent::div/following-sibling::div/p[contains(text(),{})]"#,
        xpath_literal(name),
        xpath_literal(subject)
    ))
}

/// Room listing of the admin panel
pub struct AdminRooms<'a> {
    session: &'a Session,
}

impl<'a> AdminRooms<'a> {
    pub async fn is_rooms_section_open(&self) -> E2eResult<bool> {
        self.session.is_present(&Locator::xpath(ROOMS_SECTION_XPATH)).await
    }
}
