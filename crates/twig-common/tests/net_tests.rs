//! Tests for document retrieval that do not need a network.

use twig_common::{DataUrl, FetchError, decode_text, fetch_bytes, fetch_bytes_blocking, fetch_text};

#[test]
fn test_base64_data_url() {
    // "<p>hi</p>"
    let url = DataUrl::new("data:text/html;base64,PHA+aGk8L3A+".to_string());
    assert_eq!(url.decode().unwrap(), b"<p>hi</p>");
}

#[test]
fn test_plain_data_url() {
    let url = DataUrl::new("data:text/html,<b>bold</b>".to_string());
    assert_eq!(url.decode().unwrap(), b"<b>bold</b>");
}

#[test]
fn test_data_url_without_comma() {
    let url = DataUrl::new("data:text/html;base64".to_string());
    assert!(matches!(url.decode(), Err(FetchError::DataUrl(_))));
}

#[test]
fn test_bad_base64() {
    let url = DataUrl::new("data:;base64,@@@".to_string());
    assert!(matches!(url.decode(), Err(FetchError::DataUrl(_))));
}

#[test]
fn test_async_fetch_of_data_url() {
    let text = smol::block_on(fetch_text("data:text/html,<ul><li>a</li></ul>")).unwrap();
    assert_eq!(text, "<ul><li>a</li></ul>");

    let bytes = smol::block_on(fetch_bytes("data:;base64,PHA+aGk8L3A+")).unwrap();
    assert_eq!(bytes, b"<p>hi</p>");
}

#[test]
fn test_invalid_utf8_is_a_decode_error() {
    // 0xFF 0xFE is not UTF-8.
    let result = smol::block_on(fetch_text("data:;base64,//4="));
    assert!(matches!(result, Err(FetchError::Decode(_))));
    assert!(decode_text(vec![0xC3, 0xA9]).is_ok());
}

#[test]
fn test_malformed_url_is_a_request_error() {
    let result = fetch_bytes_blocking("not a url");
    assert!(matches!(result, Err(FetchError::Request { .. })), "{result:?}");
}
