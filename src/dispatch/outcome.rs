//! Single HTTP attempt and its classified outcome.

use std::time::Duration;

use reqwest::header::HeaderMap;
use reqwest::StatusCode;

use crate::config::RETRY_AFTER_HEADER;

/// What one GET produced, discriminated by how it should be retried.
#[derive(Debug)]
pub(crate) enum Outcome {
    /// Any response other than 429, with its full body.
    Response { status: StatusCode, body: Vec<u8> },
    /// The server rejected the request with 429.
    RateLimited {
        status: u16,
        retry_after: Option<Duration>,
    },
    /// Connection-level failure: nothing usable came back.
    Transport(reqwest::Error),
}

/// Parses the server's advised wait from the `Retry-After` header.
///
/// Accepts integer seconds and HTTP dates. Missing or malformed values yield
/// `None` so the caller can fall back to its own estimate.
pub(crate) fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    let value = headers.get(RETRY_AFTER_HEADER)?.to_str().ok()?.trim();

    if let Ok(secs) = value.parse::<u64>() {
        return Some(Duration::from_secs(secs));
    }

    let date = chrono::DateTime::parse_from_rfc2822(value).ok()?;
    let wait = date.signed_duration_since(chrono::Utc::now());
    Some(wait.to_std().unwrap_or(Duration::ZERO))
}

/// Issues one GET and classifies the result.
///
/// Errors while sending or while reading the body are transport failures;
/// everything the server actually answered is a response or a 429.
pub(crate) async fn issue_request(client: &reqwest::Client, url: &str) -> Outcome {
    let response = match client.get(url).send().await {
        Ok(response) => response,
        Err(e) => return Outcome::Transport(e),
    };

    let status = response.status();
    log::debug!("Response status: {} for {}", status.as_u16(), url);

    if status == StatusCode::TOO_MANY_REQUESTS {
        return Outcome::RateLimited {
            status: status.as_u16(),
            retry_after: parse_retry_after(response.headers()),
        };
    }

    match response.bytes().await {
        Ok(body) => Outcome::Response {
            status,
            body: body.to_vec(),
        },
        Err(e) => Outcome::Transport(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httptest::{matchers::*, responders::*, Expectation, Server};
    use reqwest::header::HeaderValue;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            RETRY_AFTER_HEADER,
            HeaderValue::from_str(value)
                .unwrap_or_else(|_| panic!("Invalid header value in test: {}", value)),
        );
        headers
    }

    #[test]
    fn test_parse_retry_after_seconds() {
        assert_eq!(
            parse_retry_after(&headers_with("42")),
            Some(Duration::from_secs(42))
        );
        assert_eq!(
            parse_retry_after(&headers_with(" 7 ")),
            Some(Duration::from_secs(7))
        );
    }

    #[test]
    fn test_parse_retry_after_missing_or_malformed() {
        assert_eq!(parse_retry_after(&HeaderMap::new()), None);
        assert_eq!(parse_retry_after(&headers_with("soon")), None);
        assert_eq!(parse_retry_after(&headers_with("-3")), None);
    }

    #[test]
    fn test_parse_retry_after_http_date_in_past() {
        let wait = parse_retry_after(&headers_with("Wed, 21 Oct 2015 07:28:00 GMT"));
        assert_eq!(wait, Some(Duration::ZERO));
    }

    #[test]
    fn test_parse_retry_after_http_date_in_future() {
        let future = chrono::Utc::now() + chrono::Duration::seconds(120);
        let header = future.format("%a, %d %b %Y %H:%M:%S GMT").to_string();
        let wait = parse_retry_after(&headers_with(&header)).expect("date should parse");
        assert!(wait > Duration::from_secs(100) && wait <= Duration::from_secs(120));
    }

    #[tokio::test]
    async fn test_issue_request_ok() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/status"))
                .respond_with(status_code(200).body(r#"{"ok": true}"#)),
        );
        let client = reqwest::Client::new();
        let url = server.url("/status").to_string();

        match issue_request(&client, &url).await {
            Outcome::Response { status, body } => {
                assert_eq!(status, StatusCode::OK);
                assert_eq!(&body[..], br#"{"ok": true}"#);
            }
            other => panic!("expected response, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_issue_request_rate_limited_with_hint() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/status")).respond_with(
                status_code(429)
                    .append_header("Retry-After", "12")
                    .body(r#"{"message": "Rate limit exceeded. Try again later."}"#),
            ),
        );
        let client = reqwest::Client::new();
        let url = server.url("/status").to_string();

        match issue_request(&client, &url).await {
            Outcome::RateLimited {
                status,
                retry_after,
            } => {
                assert_eq!(status, 429);
                assert_eq!(retry_after, Some(Duration::from_secs(12)));
            }
            other => panic!("expected rate limited, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_issue_request_server_error_is_a_response() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/status"))
                .respond_with(status_code(503).body("{}")),
        );
        let client = reqwest::Client::new();
        let url = server.url("/status").to_string();

        match issue_request(&client, &url).await {
            Outcome::Response { status, .. } => assert_eq!(status.as_u16(), 503),
            other => panic!("expected response, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_issue_request_connection_refused_is_transport() {
        // Bind then drop to get a port nothing listens on
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
            listener.local_addr().expect("addr").port()
        };
        let client = reqwest::Client::new();
        let url = format!("http://127.0.0.1:{}/status", port);

        assert!(matches!(
            issue_request(&client, &url).await,
            Outcome::Transport(_)
        ));
    }
}
