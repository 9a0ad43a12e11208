use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;
use zabbix2opsgenie::config::{Config, ConfigError};
use zabbix2opsgenie::delivery::Route;

#[test]
fn test_load_full_valid_config() {
    let content = r#"
# OpsGenie integration settings
apiKey=0f9e8d7c-aaaa-bbbb-cccc-123456789abc
opsgenie.api.url=https://api.eu.opsgenie.com
logger=debug
timeout=72

useMarid=true
http.server.enabled=false
http.server.host=localhost
http.server.port=8080
https.server.enabled=true
https.server.host=marid.internal
https.server.port=8443
zabbix2opsgenie.logFile=/var/log/opsgenie/zabbix2opsgenie.log
"#;

    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", content).unwrap();

    let config = Config::load(file.path()).unwrap();

    assert_eq!(config.api_key, "0f9e8d7c-aaaa-bbbb-cccc-123456789abc");
    assert_eq!(config.api_url, "https://api.eu.opsgenie.com");
    assert_eq!(config.logger, "debug");
    assert_eq!(config.timeout, 72);
    assert!(config.use_relay);
    assert!(!config.http_enabled);
    assert_eq!(config.http_host, "localhost");
    assert_eq!(config.http_port, "8080");
    assert!(config.https_enabled);
    assert_eq!(config.https_host, "marid.internal");
    assert_eq!(config.https_port, "8443");
    assert_eq!(
        config.log_file,
        Some(PathBuf::from("/var/log/opsgenie/zabbix2opsgenie.log"))
    );

    assert_eq!(
        Route::from_config(&config).unwrap(),
        Route::Relay {
            url: "https://marid.internal:8443/script/marid2opsgenie.groovy".to_string()
        }
    );
}

#[test]
fn test_missing_file_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::load(&dir.path().join("opsgenie-integration.conf")).unwrap();

    assert_eq!(config, Config::default());
    assert_eq!(
        Route::from_config(&config).unwrap(),
        Route::Cloud {
            base_url: "https://api.opsgenie.com".to_string()
        }
    );
}

#[test]
fn test_empty_file_uses_defaults() {
    let file = NamedTempFile::new().unwrap();
    let config = Config::load(file.path()).unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_malformed_line_is_reported() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "apiKey=abc\n\nthis line has no separator\n").unwrap();

    let err = Config::load(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::MalformedLine { line_number: 3, .. }));
    assert!(err.to_string().contains("this line has no separator"));
}

#[test]
fn test_invalid_timeout_is_reported() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "timeout=-5\n").unwrap();

    let err = Config::load(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidTimeout(_)));
}

#[test]
fn test_directory_path_is_a_read_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = Config::load(dir.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Read { .. }));
}
