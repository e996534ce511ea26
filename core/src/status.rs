//! Recovers an HTTP status code from a host verb's error text.
//!
//! The host reports failures as opaque messages. When the failure was an
//! HTTP error status, the convention of the host's URL loader is to embed
//! `HTTP response code: NNN for URL: <url>` in the text. That is a string
//! coupling to a format nobody guarantees, so the extraction lives here as
//! one function with one documented fallback.

use lazy_static::lazy_static;
use regex::Regex;

/// Status reported when no code can be recovered from the message.
pub const FALLBACK_STATUS: u16 = 466;

lazy_static! {
    static ref RESPONSE_CODE: Regex =
        Regex::new(r"HTTP response code: ([0-9]{3}) for URL: (https?://.*)").unwrap();
}

/// Extract the status code embedded in a host error message, or
/// [`FALLBACK_STATUS`] when the message does not carry one.
pub fn status_from_message(message: &str) -> u16 {
    RESPONSE_CODE
        .captures(message)
        .and_then(|caps| caps.get(1))
        .and_then(|code| code.as_str().parse().ok())
        .unwrap_or(FALLBACK_STATUS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_code_from_loader_message() {
        let msg = "HTTP response code: 404 for URL: http://example.com/missing";
        assert_eq!(status_from_message(msg), 404);
    }

    #[test]
    fn extracts_code_from_wrapped_exception_text() {
        let msg = "java.io.IOException: Server returned HTTP response code: 500 \
                   for URL: https://api.example.com/v1/messages";
        assert_eq!(status_from_message(msg), 500);
    }

    #[test]
    fn matches_https_urls() {
        let msg = "HTTP response code: 503 for URL: https://example.com/";
        assert_eq!(status_from_message(msg), 503);
    }

    #[test]
    fn requires_a_url_after_the_code() {
        assert_eq!(status_from_message("HTTP response code: 404"), FALLBACK_STATUS);
    }

    #[test]
    fn requires_exactly_three_digits() {
        let short = "HTTP response code: 40 for URL: http://example.com/";
        let long = "HTTP response code: 4040 for URL: http://example.com/";
        assert_eq!(status_from_message(short), FALLBACK_STATUS);
        assert_eq!(status_from_message(long), FALLBACK_STATUS);
    }

    #[test]
    fn falls_back_for_transport_errors() {
        assert_eq!(status_from_message("connect timed out"), FALLBACK_STATUS);
        assert_eq!(status_from_message(""), FALLBACK_STATUS);
    }
}
