//! Integration tests for the hand-off to a local Marid relay.

use anyhow::Result;
use tracing::Level;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use zabbix2opsgenie::delivery::{send_to_relay, Destination, ReqwestTransport};
use zabbix2opsgenie::{AlertRecord, Config, DeliveryError, Forwarder};

#[path = "../helpers/mod.rs"]
mod helpers;

use helpers::log_capture::LogCapture;

fn relay_config(port: u16) -> Config {
    Config {
        use_relay: true,
        http_enabled: true,
        http_host: "127.0.0.1".to_string(),
        http_port: port.to_string(),
        ..Default::default()
    }
}

fn sample_record() -> AlertRecord {
    AlertRecord {
        api_key: "relay-key".to_string(),
        trigger_name: "Disk full".to_string(),
        host_name: "web-02".to_string(),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_posts_form_once_to_groovy_script() -> Result<()> {
    // Arrange
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/script/marid2opsgenie.groovy"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string_contains("async=true"))
        .and(body_string_contains("apiKey=relay-key"))
        .and(body_string_contains("triggerName=Disk+full"))
        .and(body_string_contains("hostName=web-02"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    // Act
    let config = relay_config(server.address().port());
    let logs = LogCapture::new();
    let captured = logs.clone();
    let report = tokio::task::spawn_blocking(move || {
        captured.run(|| Forwarder::new(&config, ReqwestTransport::new()).deliver(&sample_record()))
    })
    .await??;

    // Assert
    assert_eq!(report.destination, Destination::Relay);
    assert!(report.is_delivered());
    assert_eq!(
        report.url,
        format!(
            "http://127.0.0.1:{}/script/marid2opsgenie.groovy",
            server.address().port()
        )
    );
    assert_eq!(logs.count(Level::INFO, "Successfully sent data to Marid"), 1);
    Ok(())
}

#[tokio::test]
async fn test_error_status_still_counts_as_delivered() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/script/marid2opsgenie.groovy"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let config = relay_config(server.address().port());
    let report = tokio::task::spawn_blocking(move || {
        send_to_relay(&ReqwestTransport::new(), &sample_record(), &config)
    })
    .await??;

    assert!(report.is_delivered());
    assert_eq!(report.attempts.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_connection_failure_is_fatal() -> Result<()> {
    let config = relay_config(helpers::closed_port());

    let logs = LogCapture::new();
    let captured = logs.clone();
    let result = tokio::task::spawn_blocking(move || {
        captured.run(|| Forwarder::new(&config, ReqwestTransport::new()).deliver(&sample_record()))
    })
    .await?;

    let err = result.expect_err("relay connection failure must be an error");
    assert!(matches!(err, DeliveryError::RelayTransport { .. }));
    assert_eq!(logs.count(Level::ERROR, "Error occurred while sending data to Marid"), 1);
    assert_eq!(logs.count(Level::WARN, ""), 0);
    Ok(())
}

#[tokio::test]
async fn test_no_enabled_listener_makes_no_request() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let config = Config {
        use_relay: true,
        api_url: server.uri(),
        ..Default::default()
    };
    let result = tokio::task::spawn_blocking(move || {
        Forwarder::new(&config, ReqwestTransport::new()).deliver(&sample_record())
    })
    .await?;

    assert!(matches!(result, Err(DeliveryError::RelayNotEnabled)));
    Ok(())
}
