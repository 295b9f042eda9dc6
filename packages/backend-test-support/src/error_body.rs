//! Error body test helpers
//!
//! Assertions over the backend's `{success: false, message, code, trace_id}`
//! error contract that do not depend on backend types.

use actix_web::body::MessageBody;
use actix_web::dev::ServiceResponse;
use actix_web::http::header::HeaderMap;
use actix_web::http::StatusCode;
use serde::{Deserialize, Serialize};

/// Local mirror of the backend error body
#[derive(Debug, Deserialize, Serialize)]
pub struct ErrorBodyLike {
    pub success: bool,
    pub message: String,
    pub code: String,
    pub trace_id: String,
}

/// Assert that raw response parts conform to the error contract.
///
/// Checks the status, that `success` is false, that the body `trace_id`
/// matches the `x-trace-id` header, the error code and (optionally) a
/// message substring. Returns the parsed body for further checks.
pub fn assert_error_parts(
    status: StatusCode,
    headers: &HeaderMap,
    body_bytes: &[u8],
    expected_status: StatusCode,
    expected_code: &str,
    expected_message_contains: Option<&str>,
) -> ErrorBodyLike {
    assert_eq!(status, expected_status);

    let body: ErrorBodyLike =
        serde_json::from_slice(body_bytes).expect("response body should be error JSON");

    assert!(!body.success, "error bodies must carry success=false");

    let trace_id_header = headers
        .get("x-trace-id")
        .expect("x-trace-id header should be present")
        .to_str()
        .expect("x-trace-id header should be valid UTF-8");
    assert_eq!(
        body.trace_id, trace_id_header,
        "trace_id in body should match x-trace-id header"
    );

    assert_eq!(body.code, expected_code);

    if let Some(expected) = expected_message_contains {
        assert!(
            body.message.contains(expected),
            "Expected message to contain '{}', but got '{}'",
            expected,
            body.message
        );
    }

    body
}

/// Assert that a `ServiceResponse` conforms to the error contract.
pub async fn assert_error_response<B>(
    resp: ServiceResponse<B>,
    expected_status: StatusCode,
    expected_code: &str,
    expected_message_contains: Option<&str>,
) -> ErrorBodyLike
where
    B: MessageBody,
{
    let status = resp.status();
    let headers = resp.headers().clone();
    let body = actix_web::test::read_body(resp).await;

    assert_error_parts(
        status,
        &headers,
        &body,
        expected_status,
        expected_code,
        expected_message_contains,
    )
}
