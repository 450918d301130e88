// HTTP-CGI adapter against a wiremock camera.

mod common;

use common::{app_settings, camera_at, closed_port};
use rptz::adapters::{HttpCgiAdapter, PtzAdapter};
use rptz::camera_config::Protocol;
use rptz::ptz::{normalize, DiscreteAction, MotionIntent, Outcome, PtzCommand};
use std::time::{Duration, Instant};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn zoom_in_issues_one_get_and_reports_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cgi-bin/api.cgi"))
        .and(query_param("action", "ptzControl"))
        .and(query_param("zoomIn", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("OK"))
        .expect(1)
        .mount(&server)
        .await;

    let adapter = HttpCgiAdapter::new(&app_settings(2000)).unwrap();
    let config = camera_at(*server.address(), Protocol::Http);
    let result = adapter
        .execute(&PtzCommand::Discrete(DiscreteAction::ZoomIn), &config)
        .await;

    assert_eq!(result.outcome, Outcome::Sent);
    assert_eq!(result.protocol_used, Protocol::Http);
    assert_eq!(result.detail.as_deref(), Some("HTTP 200"));
}

#[tokio::test]
async fn continuous_motion_sends_scaled_values() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cgi-bin/api.cgi"))
        .and(query_param("action", "ptzControl"))
        .and(query_param("pan", "30"))
        .and(query_param("tilt", "-20"))
        .and(query_param("zoom", "0"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let adapter = HttpCgiAdapter::new(&app_settings(2000)).unwrap();
    let config = camera_at(*server.address(), Protocol::Http);
    let cmd = normalize(&MotionIntent::velocity(0.3, -0.2, 0.0)).unwrap();
    let result = adapter.execute(&cmd, &config).await;
    assert!(result.is_sent(), "{:?}", result);
}

#[tokio::test]
async fn vendor_error_status_still_counts_as_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cgi-bin/api.cgi"))
        .respond_with(ResponseTemplate::new(500).set_body_string("busy"))
        .mount(&server)
        .await;

    let adapter = HttpCgiAdapter::new(&app_settings(2000)).unwrap();
    let config = camera_at(*server.address(), Protocol::Http);
    let result = adapter
        .execute(&PtzCommand::Discrete(DiscreteAction::PanLeft), &config)
        .await;
    assert_eq!(result.outcome, Outcome::Sent);
    assert_eq!(result.detail.as_deref(), Some("HTTP 500"));
}

#[tokio::test]
async fn credentials_travel_as_basic_auth() {
    let server = MockServer::start().await;
    // base64("admin:secret")
    Mock::given(method("GET"))
        .and(path("/cgi-bin/api.cgi"))
        .and(header("authorization", "Basic YWRtaW46c2VjcmV0"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let adapter = HttpCgiAdapter::new(&app_settings(2000)).unwrap();
    let mut config = camera_at(*server.address(), Protocol::Http);
    config.username = Some("admin".to_string());
    config.password = Some("secret".to_string());
    let result = adapter
        .execute(&PtzCommand::Discrete(DiscreteAction::Home), &config)
        .await;
    assert!(result.is_sent(), "{:?}", result);
}

#[tokio::test]
async fn slow_camera_times_out_within_the_bound() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let adapter = HttpCgiAdapter::new(&app_settings(300)).unwrap();
    let config = camera_at(*server.address(), Protocol::Http);
    let start = Instant::now();
    let result = adapter
        .execute(&PtzCommand::Discrete(DiscreteAction::TiltUp), &config)
        .await;

    assert_eq!(result.outcome, Outcome::Error);
    assert!(result.detail.unwrap().starts_with("TransportTimeout"));
    assert!(start.elapsed() < Duration::from_secs(3));
}

#[tokio::test]
async fn refused_connection_is_a_transport_error() {
    let adapter = HttpCgiAdapter::new(&app_settings(2000)).unwrap();
    let addr = format!("127.0.0.1:{}", closed_port()).parse().unwrap();
    let config = camera_at(addr, Protocol::Http);
    let result = adapter
        .execute(&PtzCommand::Discrete(DiscreteAction::PanRight), &config)
        .await;
    assert_eq!(result.outcome, Outcome::Error);
    assert!(result.detail.unwrap().starts_with("TransportError"));
}
