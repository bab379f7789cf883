//! CRUD handlers for `/people`.
//!
//! Body decode failures are swallowed: a bad POST body stores a record
//! carrying nothing but the path id.

use axum::{
    body::Bytes,
    extract::{Path, State},
    response::Response,
};

use crate::http::response::json;
use crate::http::server::AppState;
use crate::people::Person;

/// `GET /people`
pub async fn list_people(State(state): State<AppState>) -> Response {
    json(&state.people.list().await)
}

/// `GET /people/{id}`. Unknown ids get an empty record, not an error.
pub async fn get_person(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let person = state.people.get(&id).await.unwrap_or_default();
    json(&person)
}

/// `POST /people/{id}`
pub async fn create_person(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Response {
    let mut person: Person = serde_json::from_slice(&body).unwrap_or_else(|e| {
        tracing::debug!(error = %e, "Ignoring undecodable person body");
        Person::default()
    });
    person.id = id;
    json(&state.people.insert(person).await)
}

/// `DELETE /people/{id}`
pub async fn delete_person(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    json(&state.people.remove(&id).await)
}
