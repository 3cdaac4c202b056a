use mimic::EngineError;
use mimic::http::location::{resolve, resolve_redirect};

#[test]
fn test_resolve_default_ports() {
    let http = resolve("http://host.com/a?x=1").unwrap();
    assert_eq!(http.port, 80);
    assert!(!http.tls);
    assert_eq!(http.request_path(), "/a?x=1");
    assert_eq!(http.host_header(), "host.com");

    let https = resolve("https://host.com").unwrap();
    assert_eq!(https.port, 443);
    assert!(https.tls);
    assert_eq!(https.request_path(), "/");
}

#[test]
fn test_explicit_port_in_host_header() {
    let url = resolve("http://localhost:8080/x").unwrap();
    assert_eq!(url.port, 8080);
    assert_eq!(url.host_header(), "localhost:8080");
    assert_eq!(url.authority(), "localhost:8080");
}

#[test]
fn test_resolve_rejects_hostless_urls() {
    assert!(matches!(
        resolve("mailto:someone@example.com"),
        Err(EngineError::MalformedUrl(_))
    ));
    assert!(matches!(resolve("not a url"), Err(EngineError::MalformedUrl(_))));
}

#[test]
fn test_redirect_root_relative() {
    assert_eq!(
        resolve_redirect("/new", "http://host.com/a/b?x=1").unwrap(),
        "http://host.com/new"
    );
}

#[test]
fn test_redirect_document_relative() {
    assert_eq!(
        resolve_redirect("c", "http://host.com/a/b").unwrap(),
        "http://host.com/a/c"
    );
}

#[test]
fn test_redirect_absolute_is_unchanged() {
    assert_eq!(
        resolve_redirect("https://other.org/x?y#z", "http://host.com/a").unwrap(),
        "https://other.org/x?y#z"
    );
}

#[test]
fn test_redirect_query_and_fragment_replace_current_suffix() {
    assert_eq!(
        resolve_redirect("?page=2", "http://host.com/list?page=1").unwrap(),
        "http://host.com/list?page=2"
    );
    assert_eq!(
        resolve_redirect("#top", "http://host.com/doc#bottom").unwrap(),
        "http://host.com/doc#top"
    );
}

#[test]
fn test_redirect_dot_segments_are_folded() {
    assert_eq!(
        resolve_redirect("../d/./e", "http://host.com/a/b/c").unwrap(),
        "http://host.com/a/d/e"
    );
    assert_eq!(
        resolve_redirect("../../x", "http://host.com/a/b/c").unwrap(),
        "http://host.com/x"
    );
}

#[test]
fn test_redirect_keeps_explicit_port() {
    assert_eq!(
        resolve_redirect("/next", "http://127.0.0.1:9000/start").unwrap(),
        "http://127.0.0.1:9000/next"
    );
}

#[test]
fn test_redirect_empty_location_is_malformed() {
    assert!(matches!(
        resolve_redirect("  ", "http://host.com/"),
        Err(EngineError::MalformedUrl(_))
    ));
}
