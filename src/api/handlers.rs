//! HTTP request handlers for the RTI engine API.
//!
//! This module contains the handler functions for all API endpoints.

use std::time::Instant;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use super::request::{PeriodAdjustmentRequest, PeriodicPaymentRequest};
use super::response::{ApiError, ApiErrorResponse, FilingCreated};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/filings/periodic-payment", post(create_periodic_payment_handler))
        .route("/filings/period-adjustment", post(create_period_adjustment_handler))
        .route("/submissions/pending", get(pending_submissions_handler))
        .route("/submissions/submitted", get(submitted_submissions_handler))
        .route("/submissions/:id", get(get_submission_handler))
        .route("/submissions/:id/validate", post(validate_submission_handler))
        .route("/submissions/:id/submit", post(submit_handler))
        .route("/submissions/:id/report", get(report_handler))
        .with_state(state)
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
        .into_response()
}

fn error_response(error: ApiErrorResponse) -> Response {
    json_response(error.status, error.error)
}

/// Maps a JSON body rejection to the API error reported to the caller.
fn json_rejection_error(rejection: JsonRejection, correlation_id: Uuid) -> ApiError {
    match rejection {
        JsonRejection::JsonDataError(err) => {
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            if body_text.contains("missing field") {
                ApiError::validation_error(body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    }
}

/// Extracts the submission id from the path, or the 400 response to send.
fn submission_id(
    path: Result<Path<Uuid>, PathRejection>,
    correlation_id: Uuid,
) -> Result<Uuid, Response> {
    path.map(|Path(id)| id).map_err(|rejection| {
        warn!(
            correlation_id = %correlation_id,
            error = %rejection.body_text(),
            "Invalid submission id"
        );
        json_response(
            StatusCode::BAD_REQUEST,
            ApiError::validation_error(format!(
                "Submission id must be a UUID: {}",
                rejection.body_text()
            )),
        )
    })
}

/// Handler for POST /filings/periodic-payment.
///
/// Records the payroll run's filing document and creates its draft
/// submission.
async fn create_periodic_payment_handler(
    State(state): State<AppState>,
    payload: Result<Json<PeriodicPaymentRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing periodic payment filing");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
            return json_response(
                StatusCode::BAD_REQUEST,
                json_rejection_error(rejection, correlation_id),
            );
        }
    };
    if let Err(message) = request.check() {
        warn!(correlation_id = %correlation_id, error = %message, "Invalid filing request");
        return json_response(StatusCode::BAD_REQUEST, ApiError::validation_error(message));
    }

    let start_time = Instant::now();
    let workers = request.worker_records.len();
    match state
        .manager()
        .finalize_payroll_run(
            &request.payroll_run_id,
            request.worker_records,
            request.payment_date,
        )
        .await
    {
        Ok((filing, submission)) => {
            info!(
                correlation_id = %correlation_id,
                submission_id = %submission.id,
                payroll_run_id = %submission.payroll_run_id,
                workers,
                total_payment = %filing.total_payment,
                duration_us = start_time.elapsed().as_micros() as u64,
                "Periodic payment filing recorded"
            );
            json_response(
                StatusCode::CREATED,
                FilingCreated {
                    filing: filing.into(),
                    submission,
                },
            )
        }
        Err(err) => {
            warn!(correlation_id = %correlation_id, error = %err, "Filing failed");
            error_response(err.into())
        }
    }
}

/// Handler for POST /filings/period-adjustment.
async fn create_period_adjustment_handler(
    State(state): State<AppState>,
    payload: Result<Json<PeriodAdjustmentRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing period adjustment filing");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
            return json_response(
                StatusCode::BAD_REQUEST,
                json_rejection_error(rejection, correlation_id),
            );
        }
    };
    if let Err(message) = request.check() {
        warn!(correlation_id = %correlation_id, error = %message, "Invalid filing request");
        return json_response(StatusCode::BAD_REQUEST, ApiError::validation_error(message));
    }

    match state
        .manager()
        .file_period_adjustment(
            &request.payroll_run_id,
            &request.tax_year,
            request.tax_month,
            request.adjustment,
        )
        .await
    {
        Ok((filing, submission)) => {
            info!(
                correlation_id = %correlation_id,
                submission_id = %submission.id,
                total_reclaimed = %filing.total_reclaimed,
                "Period adjustment filing recorded"
            );
            json_response(
                StatusCode::CREATED,
                FilingCreated {
                    filing: filing.into(),
                    submission,
                },
            )
        }
        Err(err) => {
            warn!(correlation_id = %correlation_id, error = %err, "Filing failed");
            error_response(err.into())
        }
    }
}

/// Handler for GET /submissions/pending.
async fn pending_submissions_handler(State(state): State<AppState>) -> Response {
    match state.manager().pending_submissions().await {
        Ok(submissions) => json_response(StatusCode::OK, submissions),
        Err(err) => error_response(err.into()),
    }
}

/// Handler for GET /submissions/submitted.
async fn submitted_submissions_handler(State(state): State<AppState>) -> Response {
    match state.manager().submitted_submissions().await {
        Ok(submissions) => json_response(StatusCode::OK, submissions),
        Err(err) => error_response(err.into()),
    }
}

/// Handler for GET /submissions/:id.
async fn get_submission_handler(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let id = match submission_id(path, correlation_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match state.manager().get_submission(id).await {
        Ok(Some(submission)) => json_response(StatusCode::OK, submission),
        Ok(None) => json_response(StatusCode::NOT_FOUND, ApiError::submission_not_found(id)),
        Err(err) => error_response(err.into()),
    }
}

/// Handler for POST /submissions/:id/validate.
async fn validate_submission_handler(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let id = match submission_id(path, correlation_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match state.manager().get_submission(id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return json_response(StatusCode::NOT_FOUND, ApiError::submission_not_found(id));
        }
        Err(err) => return error_response(err.into()),
    }

    let result = state.manager().validate(id).await;
    info!(
        correlation_id = %correlation_id,
        submission_id = %id,
        errors = result.errors.len(),
        warnings = result.warnings.len(),
        "Submission validated"
    );
    json_response(StatusCode::OK, result)
}

/// Handler for POST /submissions/:id/submit.
///
/// Returns the submit outcome: 200 when the gateway took the submission,
/// 422 when it was refused.
async fn submit_handler(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let id = match submission_id(path, correlation_id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    info!(correlation_id = %correlation_id, submission_id = %id, "Processing submit request");

    let outcome = state.manager().submit(id).await;
    let status = if outcome.success {
        StatusCode::OK
    } else if outcome
        .errors
        .iter()
        .any(|issue| issue.code == "SUBMISSION_NOT_FOUND")
    {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::UNPROCESSABLE_ENTITY
    };

    if outcome.success {
        info!(
            correlation_id = %correlation_id,
            submission_id = %id,
            gateway_reference = outcome.gateway_reference.as_deref().unwrap_or_default(),
            "Submit completed"
        );
    } else {
        warn!(
            correlation_id = %correlation_id,
            submission_id = %id,
            errors = outcome.errors.len(),
            "Submit refused"
        );
    }
    json_response(status, outcome)
}

/// Handler for GET /submissions/:id/report.
async fn report_handler(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let id = match submission_id(path, correlation_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match state.manager().render_report(id).await {
        Ok(Some(report)) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            report,
        )
            .into_response(),
        Ok(None) => json_response(StatusCode::NOT_FOUND, ApiError::submission_not_found(id)),
        Err(err) => error_response(err.into()),
    }
}
