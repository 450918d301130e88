// VISCA adapter against a local TCP listener standing in for the camera.

mod common;

use common::{app_settings, camera_at, closed_port};
use rptz::adapters::{ViscaAdapter, ViscaState};
use rptz::camera_config::Protocol;
use rptz::ptz::{DiscreteAction, Outcome, PtzCommand};
use std::time::{Duration, Instant};
use tokio::io::AsyncReadExt;
use tokio::net::TcpListener;

#[tokio::test]
async fn home_packet_is_written_then_socket_closed() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let camera = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut received = Vec::new();
        // Returns only once the adapter has closed its side.
        tokio::time::timeout(Duration::from_secs(3), socket.read_to_end(&mut received))
            .await
            .expect("adapter never closed the socket")
            .unwrap();
        received
    });

    let adapter = ViscaAdapter::new(&app_settings(2000));
    let config = camera_at(addr, Protocol::Visca);
    let (result, trace) = adapter
        .execute_traced(&PtzCommand::Discrete(DiscreteAction::Home), &config)
        .await;

    assert_eq!(result.outcome, Outcome::Sent, "{:?}", result);
    assert_eq!(result.protocol_used, Protocol::Visca);
    assert_eq!(
        trace,
        vec![
            ViscaState::Closed,
            ViscaState::Connecting,
            ViscaState::Connected,
            ViscaState::Sending,
            ViscaState::Lingering,
            ViscaState::Closed,
        ]
    );
    assert_eq!(camera.await.unwrap(), vec![0x81, 0x01, 0x06, 0x04, 0xFF]);
}

#[tokio::test]
async fn refused_connection_fails_with_trace() {
    let adapter = ViscaAdapter::new(&app_settings(2000));
    let addr = format!("127.0.0.1:{}", closed_port()).parse().unwrap();
    let config = camera_at(addr, Protocol::Visca);
    let (result, trace) = adapter
        .execute_traced(&PtzCommand::Discrete(DiscreteAction::PanLeft), &config)
        .await;

    assert_eq!(result.outcome, Outcome::Error);
    assert!(result.detail.unwrap().starts_with("TransportError"));
    assert_eq!(
        trace,
        vec![ViscaState::Closed, ViscaState::Connecting, ViscaState::Failed]
    );
}

#[tokio::test]
async fn unroutable_camera_times_out_within_the_bound() {
    let adapter = ViscaAdapter::new(&app_settings(300));
    // TEST-NET-1 is never routed, so the connect stalls until the timeout fires.
    let config = camera_at("192.0.2.1:52381".parse().unwrap(), Protocol::Visca);
    let start = Instant::now();
    let (result, trace) = adapter
        .execute_traced(&PtzCommand::Discrete(DiscreteAction::ZoomIn), &config)
        .await;

    assert_eq!(result.outcome, Outcome::Error);
    assert!(start.elapsed() < Duration::from_secs(3));
    assert_eq!(trace.last(), Some(&ViscaState::Failed));
}
