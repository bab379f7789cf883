//! Artificially slow, CPU-bound responses.

use axum::{extract::Path, http::StatusCode, response::IntoResponse, response::Response};
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::http::response::{json_with_content_type, CONTENT_TYPE_HTML};

/// Characters the generated payload is drawn from.
pub const ALPHABET: &[u8; 37] = b" abcdefghijklmnopqrstuvwxyz0123456789";

/// Work units used when `{num}` does not parse.
pub const DEFAULT_UNITS: i64 = 10;

/// Upper bound on work units per request.
pub const MAX_UNITS: i64 = 1000;

/// Characters produced per unit.
pub const UNIT_SIZE: usize = 1024;

/// Turn the raw path segment into a unit count.
///
/// Unparsable input falls back to [`DEFAULT_UNITS`]; negative input does no work.
pub fn parse_units(raw: &str) -> usize {
    let units = raw.parse::<i64>().unwrap_or(DEFAULT_UNITS).min(MAX_UNITS);
    units.max(0) as usize
}

/// Build `UNIT_SIZE * units` random characters, one append at a time.
pub fn generate_payload(units: usize) -> String {
    let mut rng = StdRng::from_entropy();
    let len = UNIT_SIZE * units;
    let mut payload = String::with_capacity(len);
    for _ in 0..len {
        let idx = rng.gen_range(0..ALPHABET.len());
        payload.push(ALPHABET[idx] as char);
    }
    payload
}

/// `GET /slowproc/{num}`
pub async fn slow_process(Path(num): Path<String>) -> Response {
    let units = parse_units(&num);
    tracing::debug!(units, "Generating slow payload");

    match tokio::task::spawn_blocking(move || generate_payload(units)).await {
        Ok(payload) => json_with_content_type(&payload, CONTENT_TYPE_HTML),
        Err(e) => {
            tracing::error!(error = %e, "Payload generation failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_defaults_and_clamps() {
        assert_eq!(parse_units("5"), 5);
        assert_eq!(parse_units("+5"), 5);
        assert_eq!(parse_units("1000"), 1000);
        assert_eq!(parse_units("5000"), 1000);
        assert_eq!(parse_units("abc"), 10);
        assert_eq!(parse_units(""), 10);
        assert_eq!(parse_units("99999999999999999999999"), 10);
        assert_eq!(parse_units("-3"), 0);
    }

    #[test]
    fn payload_length_and_alphabet() {
        for units in [0, 1, 3] {
            let payload = generate_payload(units);
            assert_eq!(payload.len(), UNIT_SIZE * units);
            assert!(payload.bytes().all(|b| ALPHABET.contains(&b)));
        }
    }

    #[test]
    fn payload_is_random() {
        assert_ne!(generate_payload(2), generate_payload(2));
    }

    #[tokio::test]
    async fn unparsable_matches_ten_units() {
        let response = slow_process(Path("not-a-number".to_string())).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[axum::http::header::CONTENT_TYPE],
            CONTENT_TYPE_HTML
        );

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(body.last(), Some(&b'\n'));
        let decoded: String = serde_json::from_slice(&body).unwrap();
        assert_eq!(decoded.len(), UNIT_SIZE * 10);
    }
}
