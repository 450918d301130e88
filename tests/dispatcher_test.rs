// End-to-end dispatch: normalization, protocol selection and configuration snapshots.

mod common;

use common::{app_settings, camera_at, dispatcher_for};
use rptz::camera_config::{CameraConfigUpdate, Protocol};
use rptz::errors::AppError;
use rptz::ptz::{MotionIntent, Outcome};
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::net::TcpListener;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn still_vector_short_circuits_to_idle() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dispatcher = dispatcher_for(&app_settings(2000), camera_at(*server.address(), Protocol::Http));
    let result = dispatcher
        .dispatch(&MotionIntent::velocity(0.0, 0.0, 0.0))
        .await
        .unwrap();
    assert_eq!(result.outcome, Outcome::Idle);
    assert_eq!(result.protocol_used, Protocol::Http);
}

#[tokio::test]
async fn unknown_action_is_rejected_before_any_io() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dispatcher = dispatcher_for(&app_settings(2000), camera_at(*server.address(), Protocol::Http));
    let err = dispatcher.dispatch(&MotionIntent::discrete("dance")).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidCommand(_)));
}

#[tokio::test]
async fn active_protocol_follows_configuration_updates() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cgi-bin/api.cgi"))
        .and(query_param("panLeft", "1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/onvif/ptz_service"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let dispatcher = dispatcher_for(&app_settings(2000), camera_at(*server.address(), Protocol::Http));
    let first = dispatcher.dispatch(&MotionIntent::discrete("left")).await.unwrap();
    assert_eq!(first.protocol_used, Protocol::Http);
    assert!(first.is_sent());

    dispatcher
        .store()
        .update(&CameraConfigUpdate {
            protocol: Some("onvif".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();

    let second = dispatcher.dispatch(&MotionIntent::discrete("left")).await.unwrap();
    assert_eq!(second.protocol_used, Protocol::Onvif);
    assert!(second.is_sent());
}

#[tokio::test]
async fn in_flight_dispatch_keeps_its_snapshot() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cgi-bin/api.cgi"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(300)))
        .expect(1)
        .mount(&server)
        .await;

    let dispatcher = dispatcher_for(&app_settings(2000), camera_at(*server.address(), Protocol::Http));
    let in_flight = {
        let dispatcher = dispatcher.clone();
        tokio::spawn(async move { dispatcher.dispatch(&MotionIntent::discrete("home")).await })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;

    // Switch protocol and point the camera elsewhere while the GET is outstanding.
    dispatcher
        .store()
        .update(&CameraConfigUpdate {
            host: Some("192.0.2.1".to_string()),
            protocol: Some("visca".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();

    let result = in_flight.await.unwrap().unwrap();
    assert_eq!(result.protocol_used, Protocol::Http);
    assert!(result.is_sent(), "{:?}", result);
    assert_eq!(dispatcher.store().get().await.protocol, Protocol::Visca);
}

#[tokio::test]
async fn bad_protocol_update_leaves_dispatching_untouched() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let dispatcher = dispatcher_for(&app_settings(2000), camera_at(*server.address(), Protocol::Http));
    let err = dispatcher
        .store()
        .update(&CameraConfigUpdate {
            protocol: Some("pelco".to_string()),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::UnknownProtocol(_)));

    let result = dispatcher.dispatch(&MotionIntent::discrete("zoomin")).await.unwrap();
    assert_eq!(result.protocol_used, Protocol::Http);
    assert!(result.is_sent());
}

#[tokio::test]
async fn home_over_visca_reaches_the_camera() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let camera = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut received = Vec::new();
        tokio::time::timeout(Duration::from_secs(3), socket.read_to_end(&mut received))
            .await
            .expect("dispatcher never closed the socket")
            .unwrap();
        received
    });

    let dispatcher = dispatcher_for(&app_settings(2000), camera_at(addr, Protocol::Visca));
    let result = dispatcher.dispatch(&MotionIntent::discrete("home")).await.unwrap();

    assert_eq!(result.outcome, Outcome::Sent, "{:?}", result);
    assert_eq!(result.protocol_used, Protocol::Visca);
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["status"], "sent");
    assert_eq!(json["protocol"], "visca");
    assert_eq!(camera.await.unwrap(), vec![0x81, 0x01, 0x06, 0x04, 0xFF]);
}
