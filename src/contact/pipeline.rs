use std::net::IpAddr;

use chrono::Utc;
use uuid::Uuid;

use crate::dispatch::Delivery;
use crate::error::AppError;
use crate::state::SharedState;

use super::compose::{self, EmailPayload};
use super::fields::{self, REQUIRED_FIELDS_MESSAGE};
use super::Submission;

/// Shown when the dispatcher reports a failure.
pub const DISPATCH_FAILED_MESSAGE: &str = "No pudimos enviar tu solicitud. Intenta nuevamente.";

pub struct PipelineResult {
    pub submission_id: Uuid,
    pub payload: EmailPayload,
    pub delivery: Delivery,
}

/// Validate, compose and dispatch one submission.
///
/// The client stays marked in flight until this returns, on every path.
pub async fn run(
    state: &SharedState,
    client_ip: IpAddr,
    data: &Submission,
) -> Result<PipelineResult, AppError> {
    let config = &state.config;

    if let Err(retry_after) =
        state
            .submission_limiter
            .check(client_ip, config.rate_limit, config.rate_window_secs)
    {
        return Err(AppError::RateLimited(format!(
            "Demasiadas solicitudes. Intenta de nuevo en {retry_after} segundos."
        )));
    }

    let _sending = state.in_flight.acquire(client_ip).ok_or_else(|| {
        AppError::Conflict("Tu solicitud anterior todavía se está enviando.".to_string())
    })?;

    if !fields::validate_form(data) {
        tracing::debug!(%client_ip, "Rejected submission: required fields missing or invalid");
        return Err(AppError::Unprocessable(REQUIRED_FIELDS_MESSAGE.to_string()));
    }

    let payload = compose::prepare_email_data(data, &config.contact, Utc::now())
        .map_err(|e| AppError::Internal(format!("Failed to render email body: {e}")))?;

    let submission_id = Uuid::now_v7();
    tracing::info!(
        %submission_id,
        dispatcher = state.dispatcher.id(),
        "Dispatching quote request"
    );

    let delivery = state.dispatcher.dispatch(&payload).await.map_err(|e| {
        tracing::error!(%submission_id, "Dispatch failed: {e}");
        AppError::BadGateway(DISPATCH_FAILED_MESSAGE.to_string())
    })?;

    Ok(PipelineResult {
        submission_id,
        payload,
        delivery,
    })
}
