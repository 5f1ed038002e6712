//! W3C WebDriver session
//!
//! A thin client over the WebDriver wire protocol. Every command is awaited
//! before the next one is sent; element lookups rely on the session's
//! implicit wait rather than on client-side polling.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use base64::Engine;
use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::error::{E2eError, E2eResult};

/// Key under which WebDriver serializes element references
pub const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

/// Browser to drive
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Browser {
    #[default]
    Firefox,
    Chromium,
}

impl Browser {
    pub fn as_str(&self) -> &'static str {
        match self {
            Browser::Firefox => "firefox",
            Browser::Chromium => "chrome",
        }
    }

    /// Capabilities for a new session request
    pub fn capabilities(&self, headless: bool) -> Value {
        let mut always_match = json!({ "browserName": self.as_str() });
        let args: Vec<&str> = match (self, headless) {
            (Browser::Firefox, true) => vec!["-headless"],
            (Browser::Chromium, true) => vec!["--headless=new"],
            (_, false) => vec![],
        };
        let options_key = match self {
            Browser::Firefox => "moz:firefoxOptions",
            Browser::Chromium => "goog:chromeOptions",
        };
        always_match[options_key] = json!({ "args": args });
        json!({ "capabilities": { "alwaysMatch": always_match } })
    }
}

impl std::str::FromStr for Browser {
    type Err = E2eError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "firefox" => Ok(Browser::Firefox),
            "chrome" | "chromium" => Ok(Browser::Chromium),
            other => Err(E2eError::DriverStartup(format!("unsupported browser: {}", other))),
        }
    }
}

/// How to find an element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    Id(String),
    XPath(String),
    LinkText(String),
    Css(String),
}

impl Locator {
    pub fn id(id: impl Into<String>) -> Self {
        Locator::Id(id.into())
    }

    pub fn xpath(xpath: impl Into<String>) -> Self {
        Locator::XPath(xpath.into())
    }

    pub fn link_text(text: impl Into<String>) -> Self {
        Locator::LinkText(text.into())
    }

    pub fn css(selector: impl Into<String>) -> Self {
        Locator::Css(selector.into())
    }

    /// W3C locator strategy and value
    pub fn strategy(&self) -> (&'static str, String) {
        match self {
            // WebDriver has no id strategy
            Locator::Id(id) => ("css selector", format!("[id=\"{}\"]", id.replace('"', "\\\""))),
            Locator::XPath(xpath) => ("xpath", xpath.clone()),
            Locator::LinkText(text) => ("link text", text.clone()),
            Locator::Css(selector) => ("css selector", selector.clone()),
        }
    }

    fn to_json(&self) -> Value {
        let (using, value) = self.strategy();
        json!({ "using": using, "value": value })
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Id(v) => write!(f, "id={}", v),
            Locator::XPath(v) => write!(f, "xpath={}", v),
            Locator::LinkText(v) => write!(f, "link={}", v),
            Locator::Css(v) => write!(f, "css={}", v),
        }
    }
}

/// Quote `value` as an XPath string literal
pub fn xpath_literal(value: &str) -> String {
    if !value.contains('"') {
        format!("\"{}\"", value)
    } else if !value.contains('\'') {
        format!("'{}'", value)
    } else {
        let parts: Vec<String> = value
            .split('"')
            .map(|part| format!("\"{}\"", part))
            .collect();
        format!("concat({})", parts.join(", '\"', "))
    }
}

/// Reference to an element in the current page
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Element {
    id: String,
}

impl Element {
    pub fn id(&self) -> &str {
        &self.id
    }

    fn to_json(&self) -> Value {
        json!({ ELEMENT_KEY: self.id })
    }

    fn from_json(value: &Value) -> E2eResult<Self> {
        value
            .get(ELEMENT_KEY)
            .and_then(Value::as_str)
            .map(|id| Element { id: id.to_string() })
            .ok_or_else(|| E2eError::Protocol(format!("not an element reference: {}", value)))
    }
}

/// Window size and position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowRect {
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
}

/// Configuration for a browser session
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub browser: Browser,
    pub headless: bool,
    pub implicit_wait: Duration,
    pub maximize: bool,
    /// HTTP timeout for a single command; must exceed the implicit wait
    pub command_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            browser: Browser::Firefox,
            headless: false,
            implicit_wait: Duration::from_secs(15),
            maximize: true,
            command_timeout: Duration::from_secs(60),
        }
    }
}

/// A live browser session
pub struct Session {
    client: reqwest::Client,
    server_url: String,
    session_id: String,
}

impl Session {
    /// Open a browser session on the WebDriver at `server_url`
    pub async fn start(server_url: &str, config: &SessionConfig) -> E2eResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.command_timeout)
            .build()?;
        let server_url = server_url.trim_end_matches('/').to_string();

        info!("Create a new {} session", config.browser.as_str());
        let response = client
            .post(format!("{}/session", server_url))
            .json(&config.browser.capabilities(config.headless))
            .send()
            .await?;
        let status = response.status();
        let body: Value = response.json().await?;
        let value = parse_response(status, body)?;

        let session_id = value
            .get("sessionId")
            .and_then(Value::as_str)
            .ok_or_else(|| E2eError::Protocol(format!("new session without sessionId: {}", value)))?
            .to_string();

        let session = Self {
            client,
            server_url,
            session_id,
        };

        session.set_implicit_wait(config.implicit_wait).await?;
        if config.maximize {
            session.maximize_window().await?;
        }
        let rect = session.window_rect().await?;
        info!("Window size: {}x{}", rect.width, rect.height);

        Ok(session)
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    async fn command(&self, method: Method, path: &str, body: Option<Value>) -> E2eResult<Value> {
        let url = format!("{}/session/{}{}", self.server_url, self.session_id, path);
        debug!("{} {}", method, url);

        let mut request = self.client.request(method, &url);
        if let Some(body) = body {
            request = request.json(&body);
        }
        let response = request.send().await?;
        let status = response.status();
        let body: Value = response.json().await?;
        parse_response(status, body)
    }

    pub async fn set_implicit_wait(&self, wait: Duration) -> E2eResult<()> {
        debug!("Set implicit wait to {:?}", wait);
        self.command(
            Method::POST,
            "/timeouts",
            Some(json!({ "implicit": wait.as_millis() as u64 })),
        )
        .await?;
        Ok(())
    }

    pub async fn maximize_window(&self) -> E2eResult<()> {
        self.command(Method::POST, "/window/maximize", Some(json!({}))).await?;
        Ok(())
    }

    pub async fn window_rect(&self) -> E2eResult<WindowRect> {
        let value = self.command(Method::GET, "/window/rect", None).await?;
        Ok(serde_json::from_value(value)?)
    }

    pub async fn goto(&self, url: &str) -> E2eResult<()> {
        info!("Navigate to {}", url);
        self.command(Method::POST, "/url", Some(json!({ "url": url }))).await?;
        Ok(())
    }

    pub async fn current_url(&self) -> E2eResult<String> {
        let value = self.command(Method::GET, "/url", None).await?;
        as_string(value)
    }

    /// First element matching `locator`, waiting up to the implicit wait
    pub async fn find(&self, locator: &Locator) -> E2eResult<Element> {
        let value = self
            .command(Method::POST, "/element", Some(locator.to_json()))
            .await
            .map_err(|e| not_found(e, locator))?;
        Element::from_json(&value)
    }

    /// All elements matching `locator`
    pub async fn find_all(&self, locator: &Locator) -> E2eResult<Vec<Element>> {
        let value = self
            .command(Method::POST, "/elements", Some(locator.to_json()))
            .await?;
        elements_from_json(&value)
    }

    /// First element matching `locator` below `parent`
    pub async fn find_in(&self, parent: &Element, locator: &Locator) -> E2eResult<Element> {
        let path = format!("/element/{}/element", parent.id);
        let value = self
            .command(Method::POST, &path, Some(locator.to_json()))
            .await
            .map_err(|e| not_found(e, locator))?;
        Element::from_json(&value)
    }

    /// All elements matching `locator` below `parent`
    pub async fn find_all_in(&self, parent: &Element, locator: &Locator) -> E2eResult<Vec<Element>> {
        let path = format!("/element/{}/elements", parent.id);
        let value = self.command(Method::POST, &path, Some(locator.to_json())).await?;
        elements_from_json(&value)
    }

    /// Whether `locator` matches anything; absent elements cost the full implicit wait
    pub async fn is_present(&self, locator: &Locator) -> E2eResult<bool> {
        match self.find(locator).await {
            Ok(_) => Ok(true),
            Err(E2eError::ElementNotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    pub async fn click(&self, element: &Element) -> E2eResult<()> {
        let path = format!("/element/{}/click", element.id);
        self.command(Method::POST, &path, Some(json!({}))).await?;
        Ok(())
    }

    pub async fn clear(&self, element: &Element) -> E2eResult<()> {
        let path = format!("/element/{}/clear", element.id);
        self.command(Method::POST, &path, Some(json!({}))).await?;
        Ok(())
    }

    pub async fn send_keys(&self, element: &Element, text: &str) -> E2eResult<()> {
        let path = format!("/element/{}/value", element.id);
        self.command(Method::POST, &path, Some(json!({ "text": text }))).await?;
        Ok(())
    }

    /// Rendered text of an element
    pub async fn text(&self, element: &Element) -> E2eResult<String> {
        let path = format!("/element/{}/text", element.id);
        let value = self.command(Method::GET, &path, None).await?;
        as_string(value)
    }

    /// Run a synchronous script; `arguments[i]` refers to `args[i]`
    pub async fn execute(&self, script: &str, args: &[&Element]) -> E2eResult<Value> {
        let args: Vec<Value> = args.iter().map(|e| e.to_json()).collect();
        self.command(
            Method::POST,
            "/execute/sync",
            Some(json!({ "script": script, "args": args })),
        )
        .await
    }

    pub async fn scroll_into_view(&self, element: &Element) -> E2eResult<()> {
        self.execute("arguments[0].scrollIntoView();", &[element]).await?;
        Ok(())
    }

    /// Hover the pointer over the centre of `element`
    pub async fn move_to(&self, element: &Element) -> E2eResult<()> {
        let actions = pointer_actions(vec![pointer_move(element, 0)]);
        self.perform_actions(actions).await
    }

    /// Press on `source`, move onto `target`, release
    pub async fn drag_and_drop(&self, source: &Element, target: &Element) -> E2eResult<()> {
        let actions = pointer_actions(vec![
            pointer_move(source, 0),
            json!({ "type": "pointerDown", "button": 0 }),
            pointer_move(target, 250),
            json!({ "type": "pointerUp", "button": 0 }),
        ]);
        self.perform_actions(actions).await
    }

    async fn perform_actions(&self, actions: Value) -> E2eResult<()> {
        self.command(Method::POST, "/actions", Some(actions)).await?;
        self.command(Method::DELETE, "/actions", None).await?;
        Ok(())
    }

    /// PNG screenshot of the viewport
    pub async fn screenshot(&self) -> E2eResult<Vec<u8>> {
        let value = self.command(Method::GET, "/screenshot", None).await?;
        let encoded = as_string(value)?;
        Ok(base64::engine::general_purpose::STANDARD.decode(encoded.as_bytes())?)
    }

    pub async fn save_screenshot(&self, path: &Path) -> E2eResult<()> {
        let png = self.screenshot().await?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, png)?;
        info!("Saved screenshot: {}", path.display());
        Ok(())
    }

    /// End the session and close the browser
    pub async fn quit(self) -> E2eResult<()> {
        info!("Close the {} session", self.session_id);
        let url = format!("{}/session/{}", self.server_url, self.session_id);
        let response = self.client.delete(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body: Value = response.json().await.unwrap_or(Value::Null);
            warn!("Deleting session returned {}", status);
            parse_response(status, body)?;
        }
        Ok(())
    }
}

/// Unwrap the `value` member of a WebDriver response, mapping error payloads
pub fn parse_response(status: StatusCode, body: Value) -> E2eResult<Value> {
    let value = match body {
        Value::Object(mut map) => map.remove("value").unwrap_or(Value::Null),
        other => other,
    };

    if status.is_success() {
        return Ok(value);
    }

    let error = value
        .get("error")
        .and_then(Value::as_str)
        .unwrap_or("unknown error")
        .to_string();
    let message = value
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    if error == "no such element" {
        Err(E2eError::ElementNotFound(message))
    } else if error == "timeout" || error == "script timeout" {
        Err(E2eError::Timeout(message))
    } else {
        Err(E2eError::WebDriver { error, message })
    }
}

fn not_found(err: E2eError, locator: &Locator) -> E2eError {
    match err {
        E2eError::ElementNotFound(_) => E2eError::ElementNotFound(locator.to_string()),
        other => other,
    }
}

fn elements_from_json(value: &Value) -> E2eResult<Vec<Element>> {
    value
        .as_array()
        .ok_or_else(|| E2eError::Protocol(format!("expected an element list: {}", value)))?
        .iter()
        .map(Element::from_json)
        .collect()
}

fn as_string(value: Value) -> E2eResult<String> {
    match value {
        Value::String(s) => Ok(s),
        other => Err(E2eError::Protocol(format!("expected a string: {}", other))),
    }
}

fn pointer_move(element: &Element, duration_ms: u64) -> Value {
    json!({
        "type": "pointerMove",
        "origin": element.to_json(),
        "x": 0,
        "y": 0,
        "duration": duration_ms,
    })
}

fn pointer_actions(steps: Vec<Value>) -> Value {
    json!({
        "actions": [{
            "type": "pointer",
            "id": "mouse",
            "parameters": { "pointerType": "mouse" },
            "actions": steps,
        }]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_locator_strategies() {
        assert_eq!(
            Locator::id("name").strategy(),
            ("css selector", "[id=\"name\"]".to_string())
        );
        assert_eq!(Locator::xpath("//a").strategy(), ("xpath", "//a".to_string()));
        assert_eq!(
            Locator::link_text("Admin panel").strategy(),
            ("link text", "Admin panel".to_string())
        );
    }

    #[test]
    fn test_xpath_literal() {
        assert_eq!(xpath_literal("sergio"), "\"sergio\"");
        assert_eq!(xpath_literal("say \"hi\""), "'say \"hi\"'");
        assert_eq!(
            xpath_literal("O'Neil \"Jr\""),
            "concat(\"O'Neil \", '\"', \"Jr\", '\"', \"\")"
        );
    }

    #[test]
    fn test_firefox_capabilities() {
        let caps = Browser::Firefox.capabilities(true);
        let always = &caps["capabilities"]["alwaysMatch"];
        assert_eq!(always["browserName"], "firefox");
        assert_eq!(always["moz:firefoxOptions"]["args"][0], "-headless");

        let headed = Browser::Firefox.capabilities(false);
        assert!(headed["capabilities"]["alwaysMatch"]["moz:firefoxOptions"]["args"]
            .as_array()
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_parse_success() {
        let value = parse_response(StatusCode::OK, json!({ "value": { "ready": true } })).unwrap();
        assert_eq!(value["ready"], true);
    }

    #[test]
    fn test_parse_no_such_element() {
        let body = json!({ "value": { "error": "no such element", "message": "Unable to locate element: #name" } });
        let err = parse_response(StatusCode::NOT_FOUND, body).unwrap_err();
        assert!(matches!(err, E2eError::ElementNotFound(m) if m.contains("#name")));
    }

    #[test]
    fn test_parse_other_error() {
        let body = json!({ "value": { "error": "invalid session id", "message": "gone" } });
        let err = parse_response(StatusCode::NOT_FOUND, body).unwrap_err();
        assert!(matches!(err, E2eError::WebDriver { error, .. } if error == "invalid session id"));
    }

    #[test]
    fn test_element_json() {
        let value = json!({ ELEMENT_KEY: "abc-123" });
        let element = Element::from_json(&value).unwrap();
        assert_eq!(element.id(), "abc-123");
        assert_eq!(element.to_json(), value);
        assert!(Element::from_json(&json!({ "foo": 1 })).is_err());
    }

    #[test_case("firefox" => Some(Browser::Firefox))]
    #[test_case("Firefox" => Some(Browser::Firefox))]
    #[test_case("chromium" => Some(Browser::Chromium))]
    #[test_case("lynx" => None)]
    fn test_browser_from_str(name: &str) -> Option<Browser> {
        name.parse::<Browser>().ok()
    }
}
