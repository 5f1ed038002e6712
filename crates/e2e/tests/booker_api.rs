//! Booking API client against a local mock server

use axum::http::{HeaderMap, StatusCode};
use axum::routing::get;
use axum::Router;
use chrono::NaiveDate;
use serde_json::{json, Value};

use booker_common::{StayDates, SuiteConfig};
use booker_e2e::{BookerApi, E2eError};

/// `admin:password`
const VALID_AUTH: &str = "Basic YWRtaW46cGFzc3dvcmQ=";

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(|v| v == VALID_AUTH)
        .unwrap_or(false)
}

async fn rooms(headers: HeaderMap) -> (StatusCode, String) {
    if !authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, String::new());
    }
    let body = json!({
        "rooms": [
            {"roomid": 1, "roomName": "101", "type": "single", "accessible": true,
             "image": "/images/room2.jpg", "description": "Aenean porttitor mauris sit amet lacinia molestie.",
             "features": ["TV", "WiFi", "Safe"], "roomPrice": 100},
            {"roomid": 2, "roomName": "102", "type": "double", "accessible": false,
             "features": [], "roomPrice": 150}
        ]
    });
    (StatusCode::OK, body.to_string())
}

async fn bookings(headers: HeaderMap) -> (StatusCode, String) {
    if !authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, String::new());
    }
    let body = json!({
        "bookings": [
            {"bookingid": 1, "roomid": 1, "firstname": "James", "lastname": "Dean", "depositpaid": true,
             "bookingdates": {"checkin": "2026-02-01", "checkout": "2026-02-05"}},
            {"bookingid": 2, "roomid": 1, "firstname": "Sergio", "lastname": "Freire", "depositpaid": false,
             "bookingdates": {"checkin": "2026-10-18", "checkout": "2026-10-20"}}
        ]
    });
    (StatusCode::OK, body.to_string())
}

async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn mock_api() -> String {
    spawn(Router::new().route("/room", get(rooms)).route("/booking", get(bookings))).await
}

#[tokio::test]
async fn test_get_rooms() {
    let api = BookerApi::new(&mock_api().await, "admin", "password");
    let rooms = api.get_rooms().await.unwrap();
    assert_eq!(rooms.len(), 2);
    assert_eq!(rooms[0].room_price, 100);
    assert_eq!(rooms[0].room_name, "101");
    assert_eq!(rooms[1].room_type, "double");
    assert!(rooms[1].image.is_none());
}

#[tokio::test]
async fn test_last_booking_matches_stay() {
    let api = BookerApi::new(&mock_api().await, "admin", "password");
    assert_eq!(api.get_bookings().await.unwrap().len(), 2);

    let last = api.last_booking().await.unwrap();
    assert_eq!(last.booking_id, 2);
    let stay = StayDates::starting(NaiveDate::from_ymd_opt(2026, 10, 18).unwrap(), 2).unwrap();
    assert!(last.matches("Sergio", "Freire", &stay));
}

#[tokio::test]
async fn test_config_credentials_are_sent() {
    let mut config = SuiteConfig::default();
    config.app.base_url = format!("{}/", mock_api().await);
    let api = BookerApi::from_config(&config);
    assert!(!api.base_url().ends_with('/'));
    assert!(api.get_rooms().await.is_ok());
}

#[tokio::test]
async fn test_wrong_credentials_is_http_error() {
    let api = BookerApi::new(&mock_api().await, "admin", "wrong");
    let err = api.get_rooms().await.unwrap_err();
    match err {
        E2eError::Http(e) => assert_eq!(e.status(), Some(reqwest::StatusCode::UNAUTHORIZED)),
        other => panic!("expected an HTTP error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_malformed_body_is_error() {
    let app = Router::new()
        .route("/room", get(|| async { "<html>maintenance</html>" }))
        .route("/booking", get(|| async { json!({ "items": [] }).to_string() }));
    let api = BookerApi::new(&spawn(app).await, "admin", "password");

    assert!(matches!(api.get_rooms().await, Err(E2eError::Json(_))));
    assert!(matches!(api.get_bookings().await, Err(E2eError::Json(_))));
}

#[tokio::test]
async fn test_no_bookings() {
    let app = Router::new().route("/booking", get(|| async { json!({ "bookings": Value::Array(vec![]) }).to_string() }));
    let api = BookerApi::new(&spawn(app).await, "admin", "password");

    assert!(matches!(api.last_booking().await, Err(E2eError::EmptyApiResponse("bookings"))));
}
