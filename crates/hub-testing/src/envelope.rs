//! Assertions over the `{ code, message, data?, timestamp }` envelope.

use axum::response::Response;
use serde_json::Value;

use hub_core::error::ErrorCode;

pub async fn read_json(resp: Response) -> Value {
    let bytes: bytes::Bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Assert the envelope carries `code` and that the HTTP status matches it.
pub fn assert_envelope(status: u16, body: &Value, code: ErrorCode) {
    assert_eq!(body["code"], code.as_i32(), "unexpected envelope: {body}");
    assert_eq!(status, code.http_status().as_u16(), "status/code mismatch: {body}");
    assert!(body["timestamp"].is_string(), "missing timestamp: {body}");
    if code != ErrorCode::Ok {
        assert!(body.get("data").is_none(), "failure carried data: {body}");
    }
}
