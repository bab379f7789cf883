//! Response helpers shared by handlers.
//!
//! Bodies are newline-terminated, like a streaming JSON encoder would write
//! them, and every handler picks its content type explicitly.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;

pub const CONTENT_TYPE_JSON: &str = "application/json; charset=utf-8";
pub const CONTENT_TYPE_HTML: &str = "text/html; charset=utf-8";
pub const CONTENT_TYPE_TEXT: &str = "text/plain; charset=utf-8";

/// Serialize `value` as one JSON document followed by a newline.
pub fn encode_json<T: Serialize + ?Sized>(value: &T) -> Result<String, serde_json::Error> {
    let mut body = serde_json::to_string(value)?;
    body.push('\n');
    Ok(body)
}

/// A 200 response with a JSON body and the given content type.
pub fn json_with_content_type<T: Serialize + ?Sized>(
    value: &T,
    content_type: &'static str,
) -> Response {
    match encode_json(value) {
        Ok(body) => ([(header::CONTENT_TYPE, content_type)], body).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode response body");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// A 200 `application/json` response.
pub fn json<T: Serialize + ?Sized>(value: &T) -> Response {
    json_with_content_type(value, CONTENT_TYPE_JSON)
}

/// A plain-text error response: body plus newline, sniffing disabled.
pub fn text_error(status: StatusCode, message: &str) -> Response {
    (
        status,
        [
            (header::CONTENT_TYPE, CONTENT_TYPE_TEXT),
            (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
        ],
        format!("{message}\n"),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoded_json_ends_with_newline() {
        assert_eq!(encode_json("abc").unwrap(), "\"abc\"\n");
        assert_eq!(encode_json(&[1, 2]).unwrap(), "[1,2]\n");
    }

    #[test]
    fn json_sets_content_type() {
        let response = json(&serde_json::json!({ "ok": true }));
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            CONTENT_TYPE_JSON
        );
    }

    #[test]
    fn text_error_headers() {
        let response = text_error(StatusCode::GONE, "Gone");
        assert_eq!(response.status(), StatusCode::GONE);
        assert_eq!(response.headers()[header::CONTENT_TYPE], CONTENT_TYPE_TEXT);
        assert_eq!(response.headers()[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
    }
}
