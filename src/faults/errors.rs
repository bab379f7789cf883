//! Random error injection.

use axum::{http::StatusCode, response::Response};
use rand::Rng;

use crate::http::response::text_error;

/// Width of the uniform draw. Equal to the table size, so every draw maps.
pub const THROW_RANGE: usize = 8;

/// A simulated client-facing failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulatedError {
    pub status: StatusCode,
    pub body: &'static str,
}

const SIMULATED_ERRORS: [SimulatedError; 8] = [
    SimulatedError {
        status: StatusCode::METHOD_NOT_ALLOWED,
        body: "{ \"status\" : 405,  \"userMessage\" : \"You can't do that!\", \"errorUrl\" : \"https://httpstatusdogs.com/img/405.jpg\" }",
    },
    SimulatedError {
        status: StatusCode::FORBIDDEN,
        body: "{ \"status\" : 403, \"userMessage\" : \"Forbidden!\", \"errorUrl\" : \"https://httpstatusdogs.com/img/403.jpg\" }",
    },
    SimulatedError {
        status: StatusCode::URI_TOO_LONG,
        body: "{ \"status\" : 414, \"userMessage\" : \"Whoa Big Fella!\", \"errorUrl\" : \"https://httpstatusdogs.com/img/414.jpg\" }",
    },
    SimulatedError {
        status: StatusCode::PAYMENT_REQUIRED,
        body: "Payment Required",
    },
    SimulatedError {
        status: StatusCode::GONE,
        body: "Gone",
    },
    SimulatedError {
        status: StatusCode::LENGTH_REQUIRED,
        body: "Length Required",
    },
    SimulatedError {
        status: StatusCode::LOCKED,
        body: "Locked",
    },
    SimulatedError {
        status: StatusCode::IM_A_TEAPOT,
        body: "You Can't Do That!",
    },
];

/// Map a drawn value to its error. Values past the table have no error.
pub fn simulated_error(draw: usize) -> Option<SimulatedError> {
    SIMULATED_ERRORS.get(draw).copied()
}

/// Build the response for a drawn value.
///
/// An unmapped draw writes nothing at all, which leaves the default empty 200.
pub fn error_response(draw: usize) -> Response {
    match simulated_error(draw) {
        Some(err) => text_error(err.status, err.body),
        None => Response::default(),
    }
}

/// `GET /throw`
pub async fn throw_error() -> Response {
    let draw = rand::thread_rng().gen_range(0..THROW_RANGE);
    error_response(draw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header;
    use std::collections::HashMap;

    #[test]
    fn table_is_fixed() {
        let statuses: Vec<u16> = (0..THROW_RANGE)
            .map(|n| simulated_error(n).unwrap().status.as_u16())
            .collect();
        assert_eq!(statuses, vec![405, 403, 414, 402, 410, 411, 423, 418]);
    }

    #[test]
    fn json_bodies_for_first_three() {
        for n in 0..3 {
            let err = simulated_error(n).unwrap();
            let parsed: serde_json::Value = serde_json::from_str(err.body).unwrap();
            assert_eq!(parsed["status"], err.status.as_u16());
            assert!(parsed["errorUrl"]
                .as_str()
                .unwrap()
                .ends_with(&format!("{}.jpg", err.status.as_u16())));
        }
        assert_eq!(simulated_error(7).unwrap().body, "You Can't Do That!");
    }

    #[test]
    fn unmapped_draw_writes_nothing() {
        assert!(simulated_error(THROW_RANGE).is_none());
        let response = error_response(THROW_RANGE + 3);
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get(header::CONTENT_TYPE).is_none());
    }

    #[tokio::test]
    async fn body_is_text_with_newline() {
        let response = error_response(4);
        assert_eq!(response.status(), StatusCode::GONE);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"Gone\n");
    }

    #[tokio::test]
    async fn never_succeeds_and_covers_table() {
        let mut seen: HashMap<u16, usize> = HashMap::new();
        let trials = 8000;
        for _ in 0..trials {
            let status = throw_error().await.status();
            assert!(!status.is_success());
            *seen.entry(status.as_u16()).or_default() += 1;
        }

        assert_eq!(seen.len(), THROW_RANGE);
        // Uniform draw: each code expects 1000 hits. Allow a wide band.
        for (status, count) in seen {
            assert!(
                (700..=1300).contains(&count),
                "status {status} seen {count} times"
            );
        }
    }
}
