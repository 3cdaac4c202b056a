use mimic::http::location::resolve;
use mimic::http::writer::{
    build_body, build_header_block, effective_target, inject_multipart_content_type, prepare,
};
use mimic::{ClientConfig, HttpVersion, RequestSpec};

fn spec() -> RequestSpec {
    RequestSpec::from_config(&ClientConfig::default())
}

#[test]
fn test_get_params_become_query_string() {
    let mut req = spec();
    req.set_target("http://host.com/search")
        .set_param("q", "rust lang")
        .set_param("page", "2");
    assert_eq!(effective_target(&req), "http://host.com/search?q=rust+lang&page=2");

    req.set_target("http://host.com/search?lang=en");
    assert_eq!(
        effective_target(&req),
        "http://host.com/search?lang=en&q=rust+lang&page=2"
    );
}

#[test]
fn test_get_params_go_before_fragment() {
    let mut req = spec();
    req.set_target("http://host.com/page#section").set_param("q", "1");
    assert_eq!(effective_target(&req), "http://host.com/page?q=1#section");

    req.set_target("http://host.com/page?a=b#section");
    assert_eq!(effective_target(&req), "http://host.com/page?a=b&q=1#section");

    let outbound = prepare(&req).unwrap();
    assert_eq!(outbound.url.request_path(), "/page?a=b&q=1");
}

#[test]
fn test_post_params_do_not_touch_target() {
    let mut req = spec();
    req.set_target("http://host.com/form").set_method("POST").set_param("a", "1");
    assert_eq!(effective_target(&req), "http://host.com/form");
}

#[test]
fn test_urlencoded_body_uses_raw_encoding_for_values() {
    let mut req = spec();
    req.set_param("user name", "a b&c").set_param("x", "~y");
    assert_eq!(build_body(&req), b"user+name=a%20b%26c&x=~y".to_vec());
}

#[test]
fn test_raw_body_without_params_is_sent_verbatim() {
    let mut req = spec();
    req.set_raw_body(b"{\"k\":1}".to_vec());
    assert_eq!(build_body(&req), b"{\"k\":1}".to_vec());
}

#[test]
fn test_raw_body_precedes_urlencoded_params() {
    let mut req = spec();
    req.set_target("http://host.com/api")
        .set_method("POST")
        .set_param("user", "alice")
        .set_param("note", "a b")
        .set_raw_body("RAW");

    assert_eq!(build_body(&req), b"RAW\r\nuser=alice&note=a%20b".to_vec());

    let outbound = prepare(&req).unwrap();
    assert_eq!(outbound.body, b"RAW\r\nuser=alice&note=a%20b");
    assert!(outbound
        .headers
        .contains(&("Content-Length".to_string(), "26".to_string())));
}

#[test]
fn test_caller_content_type_is_not_duplicated() {
    let mut req = spec();
    req.set_target("http://host.com/api")
        .set_method("post")
        .set_raw_body(r#"{"k":"v"}"#)
        .set_header("Content-Type", "application/json");

    let outbound = prepare(&req).unwrap();
    assert_eq!(outbound.method, "POST");
    assert_eq!(outbound.body, br#"{"k":"v"}"#);

    let content_types: Vec<_> = outbound
        .headers
        .iter()
        .filter(|(k, _)| k.eq_ignore_ascii_case("content-type"))
        .collect();
    assert_eq!(content_types.len(), 1);
    assert_eq!(content_types[0].1, "application/json");
}

#[test]
fn test_get_never_carries_a_body() {
    let mut req = spec();
    req.set_target("http://host.com/")
        .set_http_version(HttpVersion::Http10)
        .set_param("q", "1")
        .set_raw_body("ignored");

    let outbound = prepare(&req).unwrap();
    let block = String::from_utf8(outbound.header_block()).unwrap();
    assert!(block.starts_with("GET /?q=1 HTTP/1.0\r\n"));
    assert!(!block.contains("Content-Length"));
    assert!(outbound.body.is_empty());
}

#[test]
fn test_multipart_fields_and_terminator() {
    let mut req = spec();
    req.submit_multipart("form-data")
        .set_boundary("XyZ")
        .set_param("title", "hello");
    let body = String::from_utf8(build_body(&req)).unwrap();
    assert_eq!(
        body,
        "--XyZ\r\nContent-Disposition: form-data; name=\"title\"\r\n\r\nhello\r\n--XyZ--\r\n"
    );
}

#[test]
fn test_multipart_raw_part_comes_first_and_missing_file_is_omitted() {
    let mut req = spec();
    req.submit_multipart("form-data")
        .set_boundary("b0")
        .set_raw_body("preamble")
        .set_param("a", "1")
        .set_param("missing", "@/nonexistent/path");

    let body = String::from_utf8(build_body(&req)).unwrap();
    assert_eq!(
        body,
        "--b0\r\npreamble\r\n\
         --b0\r\nContent-Disposition: form-data; name=\"a\"\r\n\r\n1\r\n\
         --b0--\r\n"
    );
}

#[test]
fn test_multipart_file_mime_is_sniffed() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pixel.png");
    std::fs::write(&path, [0x89, b'P', b'N', b'G']).unwrap();

    let mut req = spec();
    req.submit_multipart("form-data")
        .set_param("img", &format!("@{}", path.display()));

    let body = build_body(&req);
    let text = String::from_utf8_lossy(&body);
    assert!(text.contains("filename=\"pixel.png\"\r\nContent-Type: image/png\r\n"));
    assert!(body.windows(4).any(|w| w == [0x89, b'P', b'N', b'G']));
}

#[test]
fn test_multipart_injection_is_not_duplicated() {
    let mut req = spec();
    req.set_target("http://host.com/up")
        .submit_multipart("form-data")
        .set_boundary("B");
    inject_multipart_content_type(&mut req);
    assert_eq!(
        req.headers.get("content-type"),
        Some("multipart/form-data; boundary=B")
    );

    let outbound = prepare(&req).unwrap();
    let count = outbound
        .headers
        .iter()
        .filter(|(k, _)| k.eq_ignore_ascii_case("content-type"))
        .count();
    assert_eq!(count, 1);
}

#[test]
fn test_post_header_block_layout() {
    let mut req = spec();
    req.set_target("http://host.com:8080/p?q=1")
        .set_method("POST")
        .set_user_agent("test-agent")
        .set_header("X-Trace", "abc")
        .set_auth("user", "pass")
        .set_cookie("sid", "42");
    let url = resolve(req.target()).unwrap();
    let block = String::from_utf8(build_header_block(&req, &url, 5)).unwrap();

    assert_eq!(
        block,
        "POST /p?q=1 HTTP/1.1\r\n\
         Host: host.com:8080\r\n\
         User-Agent: test-agent\r\n\
         X-Trace: abc\r\n\
         Content-Type: application/x-www-form-urlencoded\r\n\
         Authorization: Basic dXNlcjpwYXNz\r\n\
         Cookie: sid=42;\r\n\
         Content-Length: 5\r\n\
         Connection: close\r\n\r\n"
    );
}

#[test]
fn test_cookie_header_joins_jar_entries() {
    let mut req = spec();
    req.set_target("https://example.com/")
        .set_cookie("a", "1")
        .add_cookie_str("b=2; Path=/");

    let outbound = prepare(&req).unwrap();
    assert!(outbound.url.tls);
    assert!(outbound
        .headers
        .contains(&("Cookie".to_string(), "a=1; b=2;".to_string())));
}

#[test]
fn test_prepare_rejects_malformed_target() {
    let mut req = spec();
    req.set_target("://nope");
    assert!(prepare(&req).is_err());
}
