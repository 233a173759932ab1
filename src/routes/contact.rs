use std::net::SocketAddr;

use axum::body::Bytes;
use axum::extract::{ConnectInfo, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::alerts::{self, Alert, AlertSlot};
use crate::contact::pipeline::{self, PipelineResult};
use crate::contact::{fields, metadata, parser, refill, Submission};
use crate::error::AppError;
use crate::state::SharedState;
use crate::views::pages;

pub async fn submit(
    State(state): State<SharedState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());

    let client = metadata::extract(&headers, Some(addr.ip()), &state.config.trusted_proxies);
    tracing::debug!(
        ip = %client.ip,
        user_agent = %client.user_agent,
        "Contact form submitted"
    );

    let parsed = if content_type.is_some_and(|ct| ct.contains("multipart/form-data")) {
        parser::parse_multipart(&headers, body).await
    } else {
        parser::parse_body(content_type, &body)
    };

    let (outcome, submitted) = match parsed {
        Ok(data) => (pipeline::run(&state, client.ip, &data).await, Some(data)),
        Err(e) => (Err(AppError::BadRequest(e)), None),
    };

    if wants_html(&headers) {
        html_response(&state, outcome, submitted.as_ref()).await
    } else {
        json_response(outcome)
    }
}

/// Native form posts get the contact page back; scripts asking for JSON get JSON.
fn wants_html(headers: &HeaderMap) -> bool {
    let accept = headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    if accept.contains("application/json") {
        return false;
    }

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    content_type.contains("form") || accept.contains("text/html")
}

/// The contact page with the outcome banner. A rejected submission is
/// written back into the form; a sent one leaves the form blank.
async fn html_response(
    state: &SharedState,
    outcome: Result<PipelineResult, AppError>,
    submitted: Option<&Submission>,
) -> Response {
    let (status, alert, mailto) = match &outcome {
        Ok(result) => (StatusCode::OK, Alert::success(), result.delivery.mailto_uri()),
        Err(e) => (e.status(), Alert::error(e.public_message()), None),
    };

    let mut slot = AlertSlot::new();
    slot.show(alert);
    let dismiss_after = state.config.contact.alert_dismiss;

    let rendered = match pages::render(state, &state.config.contact_page).await {
        Ok(page) => {
            let page = match (&outcome, submitted) {
                (Err(_), Some(data)) => refill::refill_form(&page, alerts::FORM_ID, data),
                _ => page,
            };
            alerts::present(&page, &slot, dismiss_after, mailto)
        }
        Err(e) => {
            tracing::warn!("Contact page unavailable, answering with the banner only: {e}");
            match slot.current() {
                Some(alert) => alerts::render_alert(alert, dismiss_after, mailto),
                None => Ok(String::new()),
            }
        }
    };

    match rendered {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => AppError::Internal(format!("Failed to render alert: {e}")).into_response(),
    }
}

fn json_response(outcome: Result<PipelineResult, AppError>) -> Response {
    match outcome {
        Ok(result) => (
            StatusCode::OK,
            Json(json!({
                "status": "sent",
                "submission_id": result.submission_id,
                "subject": result.payload.subject,
                "delivery": result.delivery,
                "mailto": result.delivery.mailto_uri(),
                "alert": Alert::success(),
            })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn list_fields() -> Json<serde_json::Value> {
    Json(json!({ "fields": fields::FIELDS }))
}

#[derive(Deserialize)]
pub struct ValidateFieldRequest {
    pub field: String,
    #[serde(default)]
    pub value: String,
}

pub async fn validate_field(
    Json(req): Json<ValidateFieldRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let spec = fields::find(&req.field)
        .ok_or_else(|| AppError::NotFound(format!("Unknown field: {}", req.field)))?;

    let mark = fields::validate_field(spec, &req.value);

    Ok(Json(json!({
        "field": spec.name,
        "state": mark,
        "class": mark.css_class(),
    })))
}
