use mimic::config::{ClientConfig, DEFAULT_BOUNDARY, DEFAULT_USER_AGENT};
use mimic::{HttpVersion, TransportKind};
use serial_test::serial;

const VARS: &[&str] = &[
    "MIMIC_USER_AGENT",
    "MIMIC_BOUNDARY",
    "MIMIC_TIMEOUT",
    "MIMIC_MAX_REDIRECTS",
    "MIMIC_FOLLOW_REDIRECTS",
    "MIMIC_TRANSPORT",
    "MIMIC_HTTP_VERSION",
];

fn clear_env() {
    for var in VARS {
        unsafe {
            std::env::remove_var(var);
        }
    }
}

#[test]
#[serial]
fn test_config_defaults_without_env() {
    clear_env();
    let cfg = ClientConfig::load();
    assert_eq!(cfg, ClientConfig::default());
    assert_eq!(cfg.user_agent, DEFAULT_USER_AGENT);
    assert_eq!(cfg.boundary, DEFAULT_BOUNDARY);
    assert_eq!(cfg.timeout_secs, 10);
    assert_eq!(cfg.max_redirects, 3);
    assert!(!cfg.follow_redirects);
    assert_eq!(cfg.transport, TransportKind::Raw);
}

#[test]
#[serial]
fn test_config_overrides_from_env() {
    clear_env();
    unsafe {
        std::env::set_var("MIMIC_USER_AGENT", "agent/2");
        std::env::set_var("MIMIC_TIMEOUT", "30");
        std::env::set_var("MIMIC_FOLLOW_REDIRECTS", "true");
        std::env::set_var("MIMIC_TRANSPORT", "Native");
        std::env::set_var("MIMIC_HTTP_VERSION", "1.0");
    }
    let cfg = ClientConfig::load();
    clear_env();

    assert_eq!(cfg.user_agent, "agent/2");
    assert_eq!(cfg.timeout_secs, 30);
    assert!(cfg.follow_redirects);
    assert_eq!(cfg.transport, TransportKind::Native);
    assert_eq!(cfg.http_version, HttpVersion::Http10);
}

#[test]
#[serial]
fn test_config_ignores_invalid_env_values() {
    clear_env();
    unsafe {
        std::env::set_var("MIMIC_TIMEOUT", "0");
        std::env::set_var("MIMIC_MAX_REDIRECTS", "0");
        std::env::set_var("MIMIC_TRANSPORT", "carrier-pigeon");
        std::env::set_var("MIMIC_BOUNDARY", "   ");
    }
    let cfg = ClientConfig::load();
    clear_env();

    assert_eq!(cfg.timeout_secs, 10);
    assert_eq!(cfg.max_redirects, 1);
    assert_eq!(cfg.transport, TransportKind::Raw);
    assert_eq!(cfg.boundary, DEFAULT_BOUNDARY);
}

#[test]
fn test_config_from_yaml_fills_missing_fields() {
    let cfg = ClientConfig::from_yaml_str(
        "user_agent: yaml-agent\nhttp_version: \"1.0\"\ntransport: native\nmax_redirects: 7\n",
    )
    .unwrap();

    assert_eq!(cfg.user_agent, "yaml-agent");
    assert_eq!(cfg.http_version, HttpVersion::Http10);
    assert_eq!(cfg.transport, TransportKind::Native);
    assert_eq!(cfg.max_redirects, 7);
    assert_eq!(cfg.boundary, DEFAULT_BOUNDARY);
}

#[test]
fn test_config_from_yaml_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mimic.yaml");
    std::fs::write(&path, "timeout_secs: 3\nfollow_redirects: true\n").unwrap();

    let cfg = ClientConfig::from_yaml_file(&path).unwrap();
    assert_eq!(cfg.timeout_secs, 3);
    assert!(cfg.follow_redirects);
}

#[test]
fn test_config_rejects_bad_yaml() {
    assert!(ClientConfig::from_yaml_str("timeout_secs: soon").is_err());
    assert!(ClientConfig::from_yaml_file("/nonexistent/mimic.yaml").is_err());
}
