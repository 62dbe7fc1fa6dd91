use super::*;

#[test]
fn default_config_matches_device_firmware() {
    let config = ClientConfig::default();
    assert_eq!(config.endpoint, "ws://localhost/ws");
    assert_eq!(config.initial_reconnect_delay, Duration::from_millis(2000));
    assert_eq!(config.max_reconnect_attempts, 5);
    assert_eq!(config.settle_delay, Duration::from_millis(500));
    assert_eq!(config.max_vessels, 10);
}

#[test]
fn endpoint_for_origin_picks_scheme_from_protocol() {
    assert_eq!(endpoint_for_origin("http:", "192.168.4.1"), "ws://192.168.4.1/ws");
    assert_eq!(endpoint_for_origin("https:", "scale.local:8443"), "wss://scale.local:8443/ws");
}

#[test]
fn endpoint_for_host_accepts_bare_hosts() {
    assert_eq!(endpoint_for_host("192.168.4.1"), "ws://192.168.4.1/ws");
    assert_eq!(endpoint_for_host("  scale.local:8080 "), "ws://scale.local:8080/ws");
}

#[test]
fn endpoint_for_host_strips_schemes_and_trailing_paths() {
    assert_eq!(endpoint_for_host("http://192.168.4.1/"), "ws://192.168.4.1/ws");
    assert_eq!(endpoint_for_host("https://scale.example"), "wss://scale.example/ws");
    assert_eq!(endpoint_for_host("ws://10.0.0.7/ws"), "ws://10.0.0.7/ws");
    assert_eq!(endpoint_for_host("wss://10.0.0.7/ws/"), "wss://10.0.0.7/ws");
}

#[test]
fn for_origin_keeps_default_budget() {
    let config = ClientConfig::for_origin("https:", "scale.local");
    assert_eq!(config.endpoint, "wss://scale.local/ws");
    assert_eq!(config.max_reconnect_attempts, DEFAULT_MAX_RECONNECT_ATTEMPTS);
}
