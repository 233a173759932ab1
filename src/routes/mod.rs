pub mod contact;

use axum::routing::{get, post};
use axum::Router;

use crate::state::SharedState;

/// Handlers the contact page talks to: the submit action and the per-field
/// check run when a control loses focus.
pub fn contact_routes() -> Router<SharedState> {
    Router::new()
        .route("/contact", post(contact::submit))
        .route("/api/v1/contact/fields", get(contact::list_fields))
        .route("/api/v1/contact/validate", post(contact::validate_field))
}
