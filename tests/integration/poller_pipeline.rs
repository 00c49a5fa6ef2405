//! Integration tests for the live metrics pipeline
//!
//! Poller → event stream → bounded sample window, the path the dashboard's
//! metrics tab takes.

use std::time::Duration;

use instance_deck::actors::messages::PollerEvent;
use instance_deck::actors::poller::PollerHandle;
use instance_deck::sampler::{LivePoint, SampleWindow};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::helpers::*;

const TICK: Duration = Duration::from_millis(50);

async fn next_event(
    events: &mut tokio::sync::mpsc::UnboundedReceiver<PollerEvent>,
) -> PollerEvent {
    tokio::time::timeout(Duration::from_secs(2), events.recv())
        .await
        .expect("poller went quiet")
        .expect("poller stopped")
}

#[tokio::test]
async fn test_ticks_flow_into_window() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/instances/i-1/metrics"))
        .and(header("Authorization", bearer().as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(live_metrics_json(25.0, 0, 0)))
        .mount(&mock_server)
        .await;

    let (handle, mut events) = PollerHandle::spawn(authed_client(&mock_server), "i-1", TICK);
    let mut window: SampleWindow<LivePoint> = SampleWindow::new(3);

    for _ in 0..5 {
        if let PollerEvent::Sample(point) = next_event(&mut events).await {
            window.push(point);
        }
    }

    assert_eq!(window.len(), 3);
    assert!(window.iter().all(|p| p.cpu_percent == 25.0));
    assert!(window.iter().all(|p| p.net_rx_rate == 0.0));

    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_first_sample_has_zero_rates() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/instances/i-1/metrics"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(live_metrics_json(10.0, 50_000, 80_000)),
        )
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/instances/i-1/metrics"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(live_metrics_json(10.0, 150_000, 180_000)),
        )
        .mount(&mock_server)
        .await;

    let (handle, mut events) = PollerHandle::spawn(authed_client(&mock_server), "i-1", TICK);

    let PollerEvent::Sample(first) = next_event(&mut events).await else {
        panic!("expected a sample");
    };
    assert_eq!(first.disk_read_rate, 0.0);
    assert_eq!(first.net_rx_rate, 0.0);

    let PollerEvent::Sample(second) = next_event(&mut events).await else {
        panic!("expected a sample");
    };
    assert!(second.disk_read_rate > 0.0);
    assert!(second.net_rx_rate > 0.0);
    assert!(second.at > first.at);

    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_failure_is_reported_then_polling_continues() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/instances/i-1/metrics"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/instances/i-1/metrics"))
        .respond_with(ResponseTemplate::new(200).set_body_json(live_metrics_json(3.0, 0, 0)))
        .mount(&mock_server)
        .await;

    let (handle, mut events) = PollerHandle::spawn(authed_client(&mock_server), "i-1", TICK);

    assert!(matches!(
        next_event(&mut events).await,
        PollerEvent::Failed(_)
    ));
    assert!(matches!(
        next_event(&mut events).await,
        PollerEvent::Sample(p) if p.cpu_percent == 3.0
    ));

    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_dropping_events_stops_poller() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/instances/i-1/metrics"))
        .respond_with(ResponseTemplate::new(200).set_body_json(live_metrics_json(1.0, 0, 0)))
        .mount(&mock_server)
        .await;

    let (handle, events) = PollerHandle::spawn(authed_client(&mock_server), "i-1", TICK);
    drop(events);

    // Let the next tick notice the closed stream
    tokio::time::sleep(TICK * 4).await;

    assert!(handle.poll_now().await.is_err());
}
