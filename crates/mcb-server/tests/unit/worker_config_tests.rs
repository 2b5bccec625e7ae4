use std::time::Duration;

use mcb_server::WorkerConfig;

#[test]
fn default_matches_documented_tunables() {
    let config = WorkerConfig::default();
    assert_eq!(config.parse_concurrency, 4);
    assert_eq!(config.shutdown_grace, Duration::from_secs(30));
    assert_eq!(config.idle_poll_backoff, Duration::from_millis(250));
}

#[test]
fn concurrency_is_independently_overridable() {
    let config = WorkerConfig { parse_concurrency: 16, ..WorkerConfig::default() };
    assert_eq!(config.parse_concurrency, 16);
    assert_eq!(config.shutdown_grace, WorkerConfig::default().shutdown_grace);
}
