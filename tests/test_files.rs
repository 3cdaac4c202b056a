use std::io::Write;
use std::path::Path;

use mimic::files::sniff;

#[test]
fn test_sniff_by_extension() {
    let mut file = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
    file.write_all(b"\x89PNG").unwrap();

    let (bytes, mime) = sniff(file.path()).unwrap();
    assert_eq!(bytes, b"\x89PNG");
    assert_eq!(mime, "image/png");
}

#[test]
fn test_unknown_extension_falls_back_to_octet_stream() {
    let mut file = tempfile::Builder::new().suffix(".zzqq").tempfile().unwrap();
    file.write_all(b"data").unwrap();

    let (_, mime) = sniff(file.path()).unwrap();
    assert_eq!(mime, "application/octet-stream");
}

#[test]
fn test_missing_file_is_none() {
    assert!(sniff(Path::new("/nonexistent/path")).is_none());
}
